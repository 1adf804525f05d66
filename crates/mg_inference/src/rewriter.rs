use std::fmt;
use std::sync::Arc;

use mg_core::parser::parse_rewritten_articles;
use mg_core::{Error, InferenceModel, Logger, Result, RewriteParams, RewrittenArticle, SourceArticle};

use crate::payload::write_source_records;

/// Rewrites a batch of source articles with a single model call.
pub struct ArticleRewriter {
    model: Arc<dyn InferenceModel>,
    logger: Logger,
}

impl fmt::Debug for ArticleRewriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleRewriter")
            .field("model", &self.model.name())
            .finish()
    }
}

impl ArticleRewriter {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self {
            model,
            logger: Logger::new().with_new_prefixes("[rewrite]"),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub async fn rewrite(
        &self,
        articles: &[SourceArticle],
        topic: &str,
        language: &str,
        requested_count: u32,
    ) -> Result<Vec<RewrittenArticle>> {
        let payload = write_source_records(articles);
        let params = RewriteParams {
            topic: topic.to_string(),
            language: language.to_string(),
            requested_count,
        };

        self.logger.info(&format!(
            "🤖 Rewriting {} articles in {} with {}",
            articles.len(),
            language,
            self.model.name()
        ));
        let reply = self
            .model
            .rewrite_articles(&payload, &params)
            .await
            .map_err(|e| Error::Rewrite(e.to_string()))?;

        let rewritten = parse_rewritten_articles(&reply);
        if rewritten.is_empty() {
            self.logger.warn("Model reply contained no parseable article");
        } else {
            self.logger.info(&format!("✨ Parsed {} rewritten articles", rewritten.len()));
        }
        Ok(rewritten)
    }
}
