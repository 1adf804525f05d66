use std::sync::Arc;

use mg_core::{Error, ObjectStorage, Result};
use serde::Serialize;

pub mod backends;

pub use backends::*;

/// Which object store to publish to and how to reach it.
#[derive(Clone, Default)]
pub struct StorageConfig {
    /// Directory for `local`, upload endpoint override for `gcs`.
    pub url: Option<String>,
    pub bucket: Option<String>,
    pub token: Option<String>,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("url", &self.url)
            .field("bucket", &self.bucket)
            .field("token", &self.token.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

pub async fn create_storage(kind: &str, config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>> {
    let storage: Arc<dyn ObjectStorage> = match kind {
        "memory" => Arc::new(MemoryStorage::new()),
        "local" => {
            let root = config.url.clone().unwrap_or_else(|| "./magazines".to_string());
            tokio::fs::create_dir_all(&root).await?;
            Arc::new(LocalStorage::new(root))
        }
        #[cfg(feature = "gcs")]
        "gcs" => Arc::new(GcsStorage::new(
            config.bucket.clone().unwrap_or_default(),
            config.token.clone().unwrap_or_default(),
            config.url.clone(),
        )?),
        other => return Err(Error::Config(format!("Unsupported storage backend: {}", other))),
    };
    tracing::info!("💾 Storage ready ({})", storage.name());
    Ok(storage)
}

/// Serializes `value` as JSON and uploads it under `key`.
pub async fn upload_json<T: Serialize>(storage: &dyn ObjectStorage, value: &T, key: &str) -> Result<String> {
    let bytes = serde_json::to_vec(value)?;
    storage.upload(bytes, "application/json", key).await
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, upload_json, StorageConfig};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_upload_json_through_factory() {
        let storage = create_storage("memory", &StorageConfig::default()).await.unwrap();
        let url = upload_json(storage.as_ref(), &json!({"topic": "space"}), "u/base_files/report.json")
            .await
            .unwrap();
        assert_eq!(url, "memory://u/base_files/report.json");
    }

    #[tokio::test]
    async fn test_unknown_backend() {
        let err = create_storage("s3", &StorageConfig::default()).await.err().unwrap();
        assert_eq!(err.kind(), "ConfigError");
    }

    #[tokio::test]
    async fn test_local_backend_uses_configured_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = StorageConfig {
            url: Some(dir.path().join("out").display().to_string()),
            ..StorageConfig::default()
        };
        let storage = create_storage("local", &config).await.unwrap();
        assert_eq!(storage.name(), "local");
        assert!(dir.path().join("out").is_dir());
    }
}
