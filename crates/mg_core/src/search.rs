use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub category: String,
    pub num_results: u32,
    pub start_published: DateTime<Utc>,
    pub end_published: DateTime<Utc>,
    /// Candidate image links requested per result.
    pub image_links: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub text: String,
    pub image: Option<String>,
    pub image_links: Vec<String>,
}

#[async_trait]
pub trait SearchBackend: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>>;
}

#[async_trait]
pub trait ImageFetcher: Send + Sync + fmt::Debug {
    /// Downloads the raw bytes behind an image URL.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}
