use std::fmt;
use std::sync::Arc;

use mg_core::parser::parse_cover_content;
use mg_core::{ComposeParams, CoverContent, Error, InferenceModel, Logger, Result, RewrittenArticle};

use crate::payload::write_rewritten_records;

/// Writes the cover copy for a set of rewritten articles.
pub struct CoverComposer {
    model: Arc<dyn InferenceModel>,
    logger: Logger,
}

impl fmt::Debug for CoverComposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverComposer")
            .field("model", &self.model.name())
            .finish()
    }
}

impl CoverComposer {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self {
            model,
            logger: Logger::new().with_new_prefixes("[compose]"),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Indices in the result are not checked against `articles`.
    pub async fn compose(&self, articles: &[RewrittenArticle], topic: &str, language: &str) -> Result<CoverContent> {
        let payload = write_rewritten_records(articles);
        let params = ComposeParams {
            topic: topic.to_string(),
            language: language.to_string(),
            article_count: articles.len(),
        };

        self.logger.info(&format!("🎨 Composing cover for {} articles", articles.len()));
        let reply = self
            .model
            .compose_cover(&payload, &params)
            .await
            .map_err(|e| Error::Compose(e.to_string()))?;

        let cover = parse_cover_content(&reply)?;
        self.logger.debug(&format!("Cover content: {:?}", cover));
        Ok(cover)
    }
}
