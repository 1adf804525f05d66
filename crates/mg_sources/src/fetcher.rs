use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use mg_core::{Error, Logger, Result, SearchBackend, SearchQuery, SearchResult, SourceArticle};
use url::Url;

use crate::images::ImageSelector;

pub const NEWS_CATEGORY: &str = "news";
pub const IMAGE_LINKS_PER_RESULT: u32 = 3;

/// Host of `url` without a leading `www.`.
pub fn source_domain(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::Fetch(format!("Invalid article URL {:?}: {}", url, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::Fetch(format!("Article URL has no host: {}", url)))?;
    Ok(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Start of a window reaching `lookback_days` back from `end`.
pub fn window_start(end: DateTime<Utc>, lookback_days: u32) -> Result<DateTime<Utc>> {
    TimeDelta::try_days(i64::from(lookback_days))
        .and_then(|span| end.checked_sub_signed(span))
        .ok_or_else(|| Error::Fetch(format!("lookback window out of range: {} days", lookback_days)))
}

/// Turns search results into normalized source articles.
pub struct SourceArticleFetcher {
    backend: Arc<dyn SearchBackend>,
    selector: ImageSelector,
    image_links: u32,
    logger: Logger,
}

impl fmt::Debug for SourceArticleFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceArticleFetcher")
            .field("backend", &self.backend.name())
            .field("image_links", &self.image_links)
            .finish()
    }
}

impl SourceArticleFetcher {
    pub fn new(backend: Arc<dyn SearchBackend>, selector: ImageSelector) -> Self {
        Self {
            backend,
            selector,
            image_links: IMAGE_LINKS_PER_RESULT,
            logger: Logger::new().with_new_prefixes("[sources]"),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.selector = self.selector.with_logger(logger.clone());
        self.logger = logger;
        self
    }

    pub fn with_image_links(mut self, image_links: u32) -> Self {
        self.image_links = image_links;
        self
    }

    pub async fn fetch(&self, topic: &str, count: u32, lookback_days: u32) -> Result<Vec<SourceArticle>> {
        let end_published = Utc::now();
        let query = SearchQuery {
            query: topic.to_string(),
            category: NEWS_CATEGORY.to_string(),
            num_results: count,
            start_published: window_start(end_published, lookback_days)?,
            end_published,
            image_links: self.image_links,
        };

        self.logger.info(&format!(
            "🔍 Searching {} for {} articles about {:?} from the last {} day(s)",
            self.backend.name(),
            count,
            topic,
            lookback_days
        ));
        let results = self.backend.search(&query).await.map_err(|e| match e {
            Error::Fetch(_) => e,
            other => Error::Fetch(other.to_string()),
        })?;
        self.logger.info(&format!("✨ Search returned {} results", results.len()));

        let mut articles = Vec::with_capacity(results.len());
        for result in results {
            articles.push(self.normalize(result).await?);
        }
        Ok(articles)
    }

    async fn normalize(&self, result: SearchResult) -> Result<SourceArticle> {
        let source_domain = source_domain(&result.url)?;
        let image = if result.image_links.len() > 1 {
            self.selector
                .pick_best_image(&result.image_links, result.image.as_deref())
                .await
        } else {
            result.image.or_else(|| result.image_links.into_iter().next())
        };

        Ok(SourceArticle {
            title: result.title,
            url: result.url,
            text: result.text,
            source_domain,
            image,
        })
    }
}
