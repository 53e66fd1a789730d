//! Object storage for uploaded files.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;

use super::StoreError;

/// Binary object storage addressed by slash-separated paths.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload `bytes` to `path`, replacing anything already there, and return
    /// the download URL.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str)
    -> Result<Url, StoreError>;

    async fn delete(&self, path: &str) -> Result<(), StoreError>;
}

/// In-memory object storage. Download URLs are `base_url` joined with the path.
#[derive(Debug)]
pub struct MemoryBlobStore {
    base_url: Url,
    objects: RwLock<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Content type and bytes stored at `path`.
    pub async fn object(&self, path: &str) -> Option<(String, Vec<u8>)> {
        self.objects.read().await.get(path).cloned()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Url, StoreError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| StoreError::InvalidDocument(format!("bad object path {path}: {e}")))?;
        tracing::debug!(path, size = bytes.len(), "Stored object");
        self.objects
            .write()
            .await
            .insert(path.to_owned(), (content_type.to_owned(), bytes));
        Ok(url)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.objects.write().await.remove(path);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_returns_download_url() {
        let blobs = MemoryBlobStore::new(Url::parse("https://files.example.com/bucket/").unwrap());
        let url = blobs
            .upload("profilePictures/u1/profile.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://files.example.com/bucket/profilePictures/u1/profile.jpg"
        );
        let (content_type, bytes) = blobs.object("profilePictures/u1/profile.jpg").await.unwrap();
        assert_eq!(content_type, "image/jpeg");
        assert_eq!(bytes, [1, 2, 3]);

        blobs.delete("profilePictures/u1/profile.jpg").await.unwrap();
        assert!(blobs.object("profilePictures/u1/profile.jpg").await.is_none());
    }
}
