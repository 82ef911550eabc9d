use super::BlobStorage;
use crate::error::{AppError, Result};
use axum::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Component, Path, PathBuf};

/// Filesystem-backed store rooted at `STORAGE_ROOT`.
#[derive(Clone)]
pub struct LocalBlobStorage {
    root: PathBuf,
    public_url: String,
}

impl LocalBlobStorage {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, folder: &str, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains('/') || name.contains('\\') || name == ".." || name == "." {
            return Err(AppError::BadRequest(format!("Invalid file name {}", name)));
        }
        let folder_path = Path::new(folder);
        let safe_folder = folder_path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe_folder {
            return Err(AppError::BadRequest(format!("Invalid folder {}", folder)));
        }
        Ok(self.root.join(folder_path).join(name))
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn upload(&self, folder: &str, name: &str, base64_content: &str) -> Result<()> {
        let path = self.resolve(folder, name)?;
        let bytes = STANDARD
            .decode(base64_content.trim())
            .map_err(|_| AppError::BadRequest("File content must be base64".to_string()))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("write {}: {}", path.display(), e)))?;

        tracing::debug!(folder, name, "Stored file");
        Ok(())
    }

    async fn download(&self, folder: &str, name: &str) -> Result<String> {
        let path = self.resolve(folder, name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(STANDARD.encode(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("File {} does not exist", name)))
            }
            Err(e) => Err(AppError::Storage(format!("read {}: {}", path.display(), e))),
        }
    }

    async fn delete(&self, folder: &str, name: &str) -> Result<()> {
        let path = self.resolve(folder, name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // already gone
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("delete {}: {}", path.display(), e))),
        }
    }

    fn public_url(&self, folder: &str, name: &str) -> String {
        format!("{}/{}/{}", self.public_url, folder, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(label: &str) -> (LocalBlobStorage, PathBuf) {
        let root = std::env::temp_dir().join(format!("hr-erp-storage-{}-{}", label, std::process::id()));
        (LocalBlobStorage::new(root.clone(), "/files/"), root)
    }

    #[tokio::test]
    async fn test_upload_download_delete() {
        let (storage, root) = storage("cycle");
        let content = STANDARD.encode(b"%PDF-1.4 contract");

        storage.upload("contracts/1", "1700000000000_a.pdf", &content).await.unwrap();
        let downloaded = storage.download("contracts/1", "1700000000000_a.pdf").await.unwrap();
        assert_eq!(downloaded, content);

        storage.delete("contracts/1", "1700000000000_a.pdf").await.unwrap();
        let missing = storage.download("contracts/1", "1700000000000_a.pdf").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let _ = tokio::fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let (storage, _) = storage("traversal");
        let by_name = storage.upload("contracts/1", "../secret", "AA==").await;
        let by_folder = storage.upload("../etc", "passwd", "AA==").await;

        assert!(matches!(by_name, Err(AppError::BadRequest(_))));
        assert!(matches!(by_folder, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_deleting_missing_file_is_ok() {
        let (storage, _) = storage("missing");
        assert!(storage.delete("previews", "nothing.pdf").await.is_ok());
    }

    #[test]
    fn test_public_url_trims_trailing_slash() {
        let (storage, _) = storage("url");
        assert_eq!(storage.public_url("previews", "a.pdf"), "/files/previews/a.pdf");
    }
}
