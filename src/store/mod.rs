//! Filesystem-backed object storage for uploaded images.
//!
//! Files land under a generated unique path and are served publicly through
//! the `/files` route.

use std::path::PathBuf;

use chrono::Utc;

use crate::errors::AppError;

/// Object store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Ensure the storage root exists.
    pub async fn init(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(self.root.join("uploads")).await?;
        Ok(())
    }

    /// Store file bytes under a generated unique path and return that path.
    ///
    /// The path combines a random token, the upload timestamp, and the
    /// original file extension: `uploads/<token>_<millis>.<ext>`.
    pub async fn upload(&self, original_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        let token = &uuid::Uuid::new_v4().simple().to_string()[..13];
        let ext = sanitized_extension(original_name);
        let path = format!("uploads/{}_{}.{}", token, Utc::now().timestamp_millis(), ext);

        tokio::fs::write(self.root.join(&path), bytes).await?;
        Ok(path)
    }

    /// Compose the public URL for a stored object.
    pub fn public_url(&self, public_origin: &str, path: &str) -> String {
        format!("{}/files/{}", public_origin.trim_end_matches('/'), path)
    }
}

/// Extract the extension from the original filename, keeping only characters
/// safe to embed in a storage path.
fn sanitized_extension(original_name: &str) -> String {
    let Some((stem, ext)) = original_name.rsplit_once('.') else {
        return "bin".to_string();
    };
    if stem.is_empty() {
        return "bin".to_string();
    }

    let ext: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect();

    if ext.is_empty() {
        "bin".to_string()
    } else {
        ext.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitized_extension() {
        assert_eq!(sanitized_extension("screenshot.PNG"), "png");
        assert_eq!(sanitized_extension("archive.tar.gz"), "gz");
        assert_eq!(sanitized_extension("no-extension"), "bin");
        assert_eq!(sanitized_extension("a-long-dotless-filename"), "bin");
        assert_eq!(sanitized_extension(".hidden"), "bin");
        assert_eq!(sanitized_extension("trailing-dot."), "bin");
        assert_eq!(sanitized_extension("weird.p/n?g"), "png");
        assert_eq!(sanitized_extension(""), "bin");
    }

    #[tokio::test]
    async fn test_upload_writes_unique_paths() {
        let dir = TempDir::new().unwrap();
        let store = ObjectStore::new(dir.path().to_path_buf());
        store.init().await.unwrap();

        let a = store.upload("shot.png", b"first").await.unwrap();
        let b = store.upload("shot.png", b"second").await.unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("uploads/"));
        assert!(a.ends_with(".png"));

        let stored = tokio::fs::read(dir.path().join(&a)).await.unwrap();
        assert_eq!(stored, b"first");
    }

    #[tokio::test]
    async fn test_public_url_composition() {
        let store = ObjectStore::new(PathBuf::from("/tmp/store"));
        assert_eq!(
            store.public_url("http://localhost:8080/", "uploads/x_1.png"),
            "http://localhost:8080/files/uploads/x_1.png"
        );
    }
}
