use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{AppError, AppResult};

use super::{join_url, StorageBackend};

/// Keeps objects in a map. Used by tests and when no cloud bucket is configured.
pub struct MemoryBackend {
    bucket_name: String,
    public_base_url: Option<String>,
    objects: RwLock<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryBackend {
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            public_base_url: None,
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_public_base_url(mut self, base: impl Into<String>) -> Self {
        self.public_base_url = Some(base.into());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .read()
            .map(|objects| objects.contains_key(key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Storage("memory bucket lock poisoned".to_string())
}

#[tonic::async_trait]
impl StorageBackend for MemoryBackend {
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<String> {
        self.objects
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), (content_type.to_string(), data.to_vec()));

        tracing::debug!("memory upload: bucket={}, key={}, size={}", self.bucket_name, key, data.len());
        Ok(format!("memory://{}/{}", self.bucket_name, key))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.objects.write().map_err(poisoned)?.remove(key);
        tracing::debug!("memory delete: bucket={}, key={}", self.bucket_name, key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => join_url(base, key),
            None => format!("memory://{}/{}", self.bucket_name, key),
        }
    }

    fn bucket(&self) -> &str {
        &self.bucket_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_delete() {
        let backend = MemoryBackend::new("item-images");
        let uri = backend.upload("u/a.png", b"png", "image/png").await.unwrap();
        assert_eq!(uri, "memory://item-images/u/a.png");
        assert!(backend.contains("u/a.png"));

        backend.delete("u/a.png").await.unwrap();
        assert!(backend.is_empty());
        assert!(!backend.contains("u/a.png"));
    }

    #[test]
    fn test_public_url() {
        let backend = MemoryBackend::new("box-qrcodes").with_public_base_url("http://cdn/qr");
        assert_eq!(backend.public_url("u/b.png"), "http://cdn/qr/u/b.png");
    }
}
