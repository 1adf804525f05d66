use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mg_core::{ObjectStorage, Result};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Keeps uploads in process. Used offline and by tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn upload(&self, bytes: Vec<u8>, content_type: &str, key: &str) -> Result<String> {
        let object = StoredObject {
            content_type: content_type.to_string(),
            bytes,
        };
        self.objects.write().await.insert(key.to_string(), object);
        Ok(format!("memory://{}", key))
    }
}
