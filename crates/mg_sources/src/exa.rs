use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use mg_core::{Error, Result, SearchBackend, SearchQuery, SearchResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::SearchConfig;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaSearchRequest<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    search_type: &'a str,
    category: &'a str,
    num_results: u32,
    start_published_date: String,
    end_published_date: String,
    contents: ExaContents,
}

#[derive(Serialize)]
struct ExaContents {
    text: bool,
    extras: ExaExtrasRequest,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaExtrasRequest {
    image_links: u32,
}

#[derive(Deserialize)]
struct ExaSearchResponse {
    results: Vec<ExaResult>,
}

#[derive(Deserialize)]
struct ExaResult {
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    extras: Option<ExaExtras>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExaExtras {
    #[serde(default)]
    image_links: Vec<String>,
}

impl From<ExaResult> for SearchResult {
    fn from(result: ExaResult) -> Self {
        Self {
            title: result.title.unwrap_or_default(),
            url: result.url,
            text: result.text.unwrap_or_default(),
            image: result.image.filter(|image| !image.is_empty()),
            image_links: result.extras.map(|e| e.image_links).unwrap_or_default(),
        }
    }
}

/// Client for the Exa neural search API.
pub struct ExaSearch {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ExaSearch {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.exa.ai";

    pub fn new(config: &SearchConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("Exa API key is required".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
        })
    }

    fn request_body<'a>(query: &'a SearchQuery) -> ExaSearchRequest<'a> {
        ExaSearchRequest {
            query: &query.query,
            search_type: "auto",
            category: &query.category,
            num_results: query.num_results,
            start_published_date: query.start_published.to_rfc3339(),
            end_published_date: query.end_published.to_rfc3339(),
            contents: ExaContents {
                text: true,
                extras: ExaExtrasRequest {
                    image_links: query.image_links,
                },
            },
        }
    }
}

impl fmt::Debug for ExaSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExaSearch")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl SearchBackend for ExaSearch {
    fn name(&self) -> &str {
        "Exa"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let body = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&Self::request_body(query))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: ExaSearchResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Fetch(format!("Malformed search payload: {}", e)))?;
        Ok(response.results.into_iter().map(SearchResult::from).collect())
    }
}
