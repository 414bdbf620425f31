//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    ImageComment, ImageWithComments, Pin, PinColor, PinStatus, Pinshot, Project, ShareLink,
    SharedImage,
};
use crate::share;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== PROJECT OPERATIONS ====================

    /// Get the active project id.
    ///
    /// The seed guarantees a non-empty collection, so a missing marker is
    /// repaired by falling back to the first project.
    pub async fn active_project_id(&self) -> Result<String, AppError> {
        let row = sqlx::query("SELECT active_project_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        let active: Option<String> = row.get("active_project_id");

        if let Some(id) = active {
            let exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE id = ?")
                .bind(&id)
                .fetch_one(&self.pool)
                .await?;
            if exists.0 > 0 {
                return Ok(id);
            }
        }

        // Repair: first project by position becomes active
        let first = sqlx::query("SELECT id FROM projects ORDER BY position LIMIT 1")
            .fetch_one(&self.pool)
            .await?;
        let id: String = first.get("id");
        sqlx::query("UPDATE meta SET active_project_id = ? WHERE id = 1")
            .bind(&id)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    /// Mark a project as active.
    pub async fn set_active_project(&self, id: &str) -> Result<(), AppError> {
        let exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if exists.0 == 0 {
            return Err(AppError::NotFound(format!("Project {} not found", id)));
        }

        sqlx::query("UPDATE meta SET active_project_id = ? WHERE id = 1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// List all projects with their pinshots and pins, in insertion order.
    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let rows = sqlx::query("SELECT id, name FROM projects ORDER BY position")
            .fetch_all(&self.pool)
            .await?;

        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id");
            let name: String = row.get("name");
            let pinshots = self.pinshots_for_project(&id).await?;
            projects.push(Project { id, name, pinshots });
        }
        Ok(projects)
    }

    /// Get a full project snapshot by ID.
    pub async fn get_project(&self, id: &str) -> Result<Option<Project>, AppError> {
        let row = sqlx::query("SELECT id, name FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: String = row.get("id");
        let name: String = row.get("name");
        let pinshots = self.pinshots_for_project(&id).await?;
        Ok(Some(Project { id, name, pinshots }))
    }

    /// Create a new project and make it active.
    pub async fn create_project(&self, name: &str) -> Result<Project, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;
        let max: (Option<i64>,) = sqlx::query_as("SELECT MAX(position) FROM projects")
            .fetch_one(&mut *tx)
            .await?;
        let position = max.0.map(|p| p + 1).unwrap_or(0);

        sqlx::query("INSERT INTO projects (id, name, position, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(position)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE meta SET active_project_id = ? WHERE id = 1")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Project {
            id,
            name: name.to_string(),
            pinshots: Vec::new(),
        })
    }

    /// Delete a project.
    ///
    /// Deleting the last remaining project is rejected; deleting the active
    /// project activates the first remaining one.
    pub async fn delete_project(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if exists.0 == 0 {
            return Err(AppError::NotFound(format!("Project {} not found", id)));
        }

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(&mut *tx)
            .await?;
        if count.0 <= 1 {
            return Err(AppError::Validation(
                "Cannot delete the last project".to_string(),
            ));
        }

        sqlx::query(
            "DELETE FROM pins WHERE pinshot_id IN (SELECT id FROM pinshots WHERE project_id = ?)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM pinshots WHERE project_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM share_links WHERE project_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // Repair the active marker if it pointed at the deleted project
        let active: Option<String> =
            sqlx::query("SELECT active_project_id FROM meta WHERE id = 1")
                .fetch_one(&mut *tx)
                .await?
                .get("active_project_id");
        if active.as_deref() == Some(id) {
            let first = sqlx::query("SELECT id FROM projects ORDER BY position LIMIT 1")
                .fetch_one(&mut *tx)
                .await?;
            let first_id: String = first.get("id");
            sqlx::query("UPDATE meta SET active_project_id = ? WHERE id = 1")
                .bind(&first_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // ==================== PINSHOT AND PIN OPERATIONS ====================

    /// Append a pinshot to a project.
    pub async fn add_pinshot(
        &self,
        project_id: &str,
        name: &str,
        image: Option<&str>,
    ) -> Result<Pinshot, AppError> {
        let exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE id = ?")
            .bind(project_id)
            .fetch_one(&self.pool)
            .await?;
        if exists.0 == 0 {
            return Err(AppError::NotFound(format!(
                "Project {} not found",
                project_id
            )));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let max: (Option<i64>,) =
            sqlx::query_as("SELECT MAX(position) FROM pinshots WHERE project_id = ?")
                .bind(project_id)
                .fetch_one(&self.pool)
                .await?;
        let position = max.0.map(|p| p + 1).unwrap_or(0);

        sqlx::query(
            "INSERT INTO pinshots (id, project_id, name, image, position, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(project_id)
        .bind(name)
        .bind(image)
        .bind(position)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Pinshot {
            id,
            name: name.to_string(),
            image: image.map(|s| s.to_string()),
            pins: Vec::new(),
        })
    }

    /// Append a confirmed pin to a pinshot.
    pub async fn add_pin(
        &self,
        project_id: &str,
        pinshot_id: &str,
        pin: &Pin,
    ) -> Result<(), AppError> {
        self.require_pinshot(project_id, pinshot_id).await?;

        let now = Utc::now().to_rfc3339();
        let max: (Option<i64>,) =
            sqlx::query_as("SELECT MAX(position) FROM pins WHERE pinshot_id = ?")
                .bind(pinshot_id)
                .fetch_one(&self.pool)
                .await?;
        let position = max.0.map(|p| p + 1).unwrap_or(0);

        sqlx::query(
            "INSERT INTO pins (id, pinshot_id, x, y, comment, status, color, position, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&pin.id)
        .bind(pinshot_id)
        .bind(pin.x)
        .bind(pin.y)
        .bind(&pin.comment)
        .bind(pin.status.as_str())
        .bind(pin.color.as_str())
        .bind(position)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Change a pin's status. No other pin field is ever updated.
    pub async fn update_pin_status(
        &self,
        project_id: &str,
        pinshot_id: &str,
        pin_id: &str,
        status: PinStatus,
    ) -> Result<Pin, AppError> {
        self.require_pinshot(project_id, pinshot_id).await?;

        let result = sqlx::query("UPDATE pins SET status = ? WHERE id = ? AND pinshot_id = ?")
            .bind(status.as_str())
            .bind(pin_id)
            .bind(pinshot_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Pin {} not found", pin_id)));
        }

        let row = sqlx::query("SELECT id, x, y, comment, status, color FROM pins WHERE id = ?")
            .bind(pin_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(pin_from_row(&row))
    }

    // ==================== SHARE LINK OPERATIONS ====================

    /// Create a share link for a project.
    ///
    /// Short ids are minted from random material; an unlikely collision is
    /// retried a few times before giving up.
    pub async fn create_share_link(
        &self,
        project_id: &str,
        expiration_days: Option<i64>,
        public_origin: &str,
    ) -> Result<ShareLink, AppError> {
        let exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE id = ?")
            .bind(project_id)
            .fetch_one(&self.pool)
            .await?;
        if exists.0 == 0 {
            return Err(AppError::NotFound(format!(
                "Project {} not found",
                project_id
            )));
        }

        let now = Utc::now();
        let created_at = now.to_rfc3339();
        let expires_at = share::expiration_from_days(now, expiration_days)?;

        for _ in 0..5 {
            let short_id = share::mint_short_id();
            let id = uuid::Uuid::new_v4().to_string();
            let url = share::share_url(public_origin, &short_id);

            let inserted = sqlx::query(
                "INSERT OR IGNORE INTO share_links (id, short_id, project_id, url, created_at, expires_at) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(&short_id)
            .bind(project_id)
            .bind(&url)
            .bind(&created_at)
            .bind(&expires_at)
            .execute(&self.pool)
            .await?;

            if inserted.rows_affected() == 1 {
                return Ok(ShareLink {
                    id,
                    short_id,
                    project_id: project_id.to_string(),
                    url,
                    created_at,
                    expires_at,
                });
            }
        }

        Err(AppError::Internal(
            "Could not mint a unique share token".to_string(),
        ))
    }

    /// List share links for a project, newest first.
    pub async fn list_share_links(&self, project_id: &str) -> Result<Vec<ShareLink>, AppError> {
        let rows = sqlx::query(
            "SELECT id, short_id, project_id, url, created_at, expires_at FROM share_links WHERE project_id = ? ORDER BY created_at DESC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(share_link_from_row).collect())
    }

    /// Resolve a short id to its project snapshot.
    ///
    /// Returns None for unknown or expired links; the caller maps both to the
    /// same not-found presentation.
    pub async fn resolve_share_link(
        &self,
        short_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Project>, AppError> {
        let row = sqlx::query(
            "SELECT id, short_id, project_id, url, created_at, expires_at FROM share_links WHERE short_id = ?",
        )
        .bind(short_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let link = share_link_from_row(&row);
        if !link.is_valid_at(now) {
            return Ok(None);
        }

        self.get_project(&link.project_id).await
    }

    /// Register the expiration of a migrated legacy link.
    pub async fn register_legacy_link(
        &self,
        link_id: &str,
        expires_at: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO legacy_links (link_id, expires_at) VALUES (?, ?) ON CONFLICT(link_id) DO UPDATE SET expires_at = excluded.expires_at",
        )
        .bind(link_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Whether a registered legacy link is expired. Unregistered links carry
    /// no expiration and never expire.
    pub async fn legacy_link_expired(
        &self,
        link_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT expires_at FROM legacy_links WHERE link_id = ?")
            .bind(link_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(false);
        };
        let expires_at: Option<String> = row.get("expires_at");
        match expires_at {
            None => Ok(false),
            Some(raw) => match DateTime::parse_from_rfc3339(&raw) {
                Ok(expires) => Ok(expires <= now),
                Err(_) => Ok(true),
            },
        }
    }

    // ==================== SHARED IMAGE OPERATIONS ====================

    /// Register an uploaded image for sharing.
    pub async fn create_shared_image(
        &self,
        title: &str,
        description: &str,
        image_url: &str,
        storage_path: &str,
    ) -> Result<SharedImage, AppError> {
        let created_at = Utc::now().to_rfc3339();

        for _ in 0..5 {
            let short_id = share::mint_short_id();
            let id = uuid::Uuid::new_v4().to_string();

            let inserted = sqlx::query(
                "INSERT OR IGNORE INTO shared_images (id, short_id, title, description, image_url, storage_path, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(&short_id)
            .bind(title)
            .bind(description)
            .bind(image_url)
            .bind(storage_path)
            .bind(&created_at)
            .execute(&self.pool)
            .await?;

            if inserted.rows_affected() == 1 {
                return Ok(SharedImage {
                    id,
                    short_id,
                    title: title.to_string(),
                    description: description.to_string(),
                    image_url: image_url.to_string(),
                    storage_path: storage_path.to_string(),
                    created_at,
                });
            }
        }

        Err(AppError::Internal(
            "Could not mint a unique share token".to_string(),
        ))
    }

    /// Fetch a shared image and its comments in one call.
    pub async fn get_image_with_comments(
        &self,
        short_id: &str,
    ) -> Result<Option<ImageWithComments>, AppError> {
        let row = sqlx::query(
            "SELECT id, short_id, title, description, image_url, created_at FROM shared_images WHERE short_id = ?",
        )
        .bind(short_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let image_id: String = row.get("id");

        let comment_rows = sqlx::query(
            "SELECT id, content, author_name, created_at FROM image_comments WHERE image_id = ? ORDER BY created_at",
        )
        .bind(&image_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ImageWithComments {
            id: image_id,
            short_id: row.get("short_id"),
            title: row.get("title"),
            description: row.get("description"),
            image_url: row.get("image_url"),
            created_at: row.get("created_at"),
            comments: comment_rows
                .iter()
                .map(|r| ImageComment {
                    id: r.get("id"),
                    content: r.get("content"),
                    author_name: r.get("author_name"),
                    created_at: r.get("created_at"),
                })
                .collect(),
        }))
    }

    /// Append a comment to a shared image.
    pub async fn add_image_comment(
        &self,
        short_id: &str,
        content: &str,
        author_name: Option<&str>,
    ) -> Result<ImageComment, AppError> {
        let row = sqlx::query("SELECT id FROM shared_images WHERE short_id = ?")
            .bind(short_id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Err(AppError::NotFound(format!("Image {} not found", short_id)));
        };
        let image_id: String = row.get("id");

        let id = uuid::Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();
        let author = match author_name {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => "Anonymous".to_string(),
        };

        sqlx::query(
            "INSERT INTO image_comments (id, image_id, content, author_name, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&image_id)
        .bind(content)
        .bind(&author)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        Ok(ImageComment {
            id,
            content: content.to_string(),
            author_name: author,
            created_at,
        })
    }

    // ==================== HELPERS ====================

    async fn pinshots_for_project(&self, project_id: &str) -> Result<Vec<Pinshot>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, image FROM pinshots WHERE project_id = ? ORDER BY position",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        let mut pinshots = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id");
            let pin_rows = sqlx::query(
                "SELECT id, x, y, comment, status, color FROM pins WHERE pinshot_id = ? ORDER BY position",
            )
            .bind(&id)
            .fetch_all(&self.pool)
            .await?;

            pinshots.push(Pinshot {
                id,
                name: row.get("name"),
                image: row.get("image"),
                pins: pin_rows.iter().map(pin_from_row).collect(),
            });
        }
        Ok(pinshots)
    }

    async fn require_pinshot(&self, project_id: &str, pinshot_id: &str) -> Result<(), AppError> {
        let exists: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM pinshots WHERE id = ? AND project_id = ?")
                .bind(pinshot_id)
                .bind(project_id)
                .fetch_one(&self.pool)
                .await?;
        if exists.0 == 0 {
            return Err(AppError::NotFound(format!(
                "Pinshot {} not found in project {}",
                pinshot_id, project_id
            )));
        }
        Ok(())
    }
}

// Helper functions for row conversion

fn pin_from_row(row: &sqlx::sqlite::SqliteRow) -> Pin {
    let status: String = row.get("status");
    let color: String = row.get("color");
    Pin {
        id: row.get("id"),
        x: row.get("x"),
        y: row.get("y"),
        comment: row.get("comment"),
        // Unknown stored values fall back to the defaults
        status: PinStatus::from_str(&status).unwrap_or_default(),
        color: PinColor::from_str(&color).unwrap_or_default(),
    }
}

fn share_link_from_row(row: &sqlx::sqlite::SqliteRow) -> ShareLink {
    ShareLink {
        id: row.get("id"),
        short_id: row.get("short_id"),
        project_id: row.get("project_id"),
        url: row.get("url"),
        created_at: row.get("created_at"),
        expires_at: row.get("expires_at"),
    }
}
