//! Artifact storage for collection files and execution logs.
//!
//! Artifacts live beneath one configured directory; the database records
//! paths relative to it.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Handle on the artifacts directory.
#[derive(Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create the store, ensuring the directory layout exists.
    pub async fn new(root: PathBuf) -> AppResult<Self> {
        tokio::fs::create_dir_all(root.join("collections")).await?;
        tokio::fs::create_dir_all(root.join("logs")).await?;
        Ok(ArtifactStore { root })
    }

    /// Resolve a stored relative path, rejecting traversal outside the root.
    pub fn resolve(&self, relative: &str) -> AppResult<PathBuf> {
        let path = Path::new(relative);
        if path.is_absolute()
            || path
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(AppError::Storage(format!(
                "Invalid artifact path: {}",
                relative
            )));
        }
        Ok(self.root.join(path))
    }

    /// The artifacts root, for serving files over HTTP.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an uploaded collection file; returns its relative path.
    pub async fn save_collection(&self, content: &[u8]) -> AppResult<String> {
        let relative = format!("collections/{}.json", Uuid::now_v7());
        tokio::fs::write(self.root.join(&relative), content).await?;
        Ok(relative)
    }

    /// Store an execution log; returns its relative path.
    pub async fn save_log(&self, run_id: Uuid, name: &str, content: &str) -> AppResult<String> {
        let dir = format!("logs/{}", run_id);
        tokio::fs::create_dir_all(self.root.join(&dir)).await?;
        let relative = format!("{}/{}", dir, name);
        tokio::fs::write(self.root.join(&relative), content).await?;
        Ok(relative)
    }

    /// Read an artifact back as text.
    pub async fn read_to_string(&self, relative: &str) -> AppResult<String> {
        let path = self.resolve(relative)?;
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().to_path_buf()).await.unwrap();

        let relative = store.save_collection(b"{\"item\": []}").await.unwrap();
        assert!(relative.starts_with("collections/"));

        let content = store.read_to_string(&relative).await.unwrap();
        assert_eq!(content, "{\"item\": []}");
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().to_path_buf()).await.unwrap();

        assert!(store.resolve("../outside.json").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
        assert!(store.resolve("logs/run/execution.json").is_ok());
    }
}
