//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for projects, share links, and shared images.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool, run migrations, and seed the
/// default project when the store is empty.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    // The project collection is never empty
    seed_default_project(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL DEFAULT 1,
            active_project_id TEXT
        );

        INSERT OR IGNORE INTO meta (id, schema_version, active_project_id)
        VALUES (1, 1, NULL);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            position INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pinshots (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id),
            name TEXT NOT NULL,
            image TEXT,
            position INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pins (
            id TEXT PRIMARY KEY,
            pinshot_id TEXT NOT NULL REFERENCES pinshots(id),
            x REAL NOT NULL,
            y REAL NOT NULL,
            comment TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            color TEXT NOT NULL DEFAULT '#FF4D4F',
            position INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS share_links (
            id TEXT PRIMARY KEY,
            short_id TEXT NOT NULL UNIQUE,
            project_id TEXT NOT NULL REFERENCES projects(id),
            url TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Expiration for migrated legacy links, keyed by link id rather than by
    // payload matching
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS legacy_links (
            link_id TEXT PRIMARY KEY,
            expires_at TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shared_images (
            id TEXT PRIMARY KEY,
            short_id TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            image_url TEXT NOT NULL,
            storage_path TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS image_comments (
            id TEXT PRIMARY KEY,
            image_id TEXT NOT NULL REFERENCES shared_images(id),
            content TEXT NOT NULL,
            author_name TEXT NOT NULL DEFAULT 'Anonymous',
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_pinshots_project ON pinshots(project_id, position);
        CREATE INDEX IF NOT EXISTS idx_pins_pinshot ON pins(pinshot_id, position);
        CREATE INDEX IF NOT EXISTS idx_share_links_project ON share_links(project_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_image_comments_image ON image_comments(image_id, created_at);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seed one default project with an empty pinshot and mark it active.
async fn seed_default_project(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
        .fetch_one(pool)
        .await?;
    if row.0 > 0 {
        return Ok(());
    }

    let now = chrono::Utc::now().to_rfc3339();
    let project_id = uuid::Uuid::new_v4().to_string();
    let pinshot_id = uuid::Uuid::new_v4().to_string();

    let mut tx = pool.begin().await?;
    sqlx::query("INSERT INTO projects (id, name, position, created_at) VALUES (?, ?, 0, ?)")
        .bind(&project_id)
        .bind("My Project")
        .bind(&now)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "INSERT INTO pinshots (id, project_id, name, image, position, created_at) VALUES (?, ?, ?, NULL, 0, ?)",
    )
    .bind(&pinshot_id)
    .bind(&project_id)
    .bind("Screenshot")
    .bind(&now)
    .execute(&mut *tx)
    .await?;
    sqlx::query("UPDATE meta SET active_project_id = ? WHERE id = 1")
        .bind(&project_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(())
}
