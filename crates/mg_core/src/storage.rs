use async_trait::async_trait;

use crate::Result;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    fn name(&self) -> &str;

    /// Store `bytes` under `key` and return the public URL of the object.
    async fn upload(&self, bytes: Vec<u8>, content_type: &str, key: &str) -> Result<String>;
}
