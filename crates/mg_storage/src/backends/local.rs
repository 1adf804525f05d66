use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use mg_core::{Error, ObjectStorage, Result};
use url::Url;

/// Writes uploads under a directory and hands back `file://` URLs.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if key.is_empty() || !plain {
            return Err(Error::Storage(format!("Invalid object key: {:?}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    fn name(&self) -> &str {
        "local"
    }

    async fn upload(&self, bytes: Vec<u8>, _content_type: &str, key: &str) -> Result<String> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        let absolute = tokio::fs::canonicalize(&path).await?;
        let url = Url::from_file_path(&absolute)
            .map_err(|_| Error::Storage(format!("Cannot build file URL for {}", absolute.display())))?;
        tracing::debug!("💾 Wrote {}", absolute.display());
        Ok(url.to_string())
    }
}
