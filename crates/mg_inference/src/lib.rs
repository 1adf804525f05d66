pub mod composer;
pub mod cover_image;
pub mod models;
pub mod payload;
pub mod prompts;
pub mod rewriter;

#[cfg(test)]
pub(crate) mod testing;

pub use composer::CoverComposer;
pub use cover_image::CoverImageGenerator;
pub use models::create_model;
pub use rewriter::ArticleRewriter;

/// Model selection and credentials.
#[derive(Clone)]
pub struct Config {
    pub model_name: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("model_name", &self.model_name)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_name: "gemini".to_string(),
            api_key: None,
            base_url: None,
            text_model: None,
            image_model: None,
            timeout_secs: 60,
        }
    }
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::{ArticleRewriter, Config, CoverComposer, CoverImageGenerator};
    pub use mg_core::{Error, InferenceModel, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;
    use mg_core::{RewrittenArticle, SourceArticle};
    use std::sync::Arc;

    fn source(title: &str) -> SourceArticle {
        SourceArticle {
            title: title.to_string(),
            url: format!("https://wire.example/{}", title),
            text: format!("{} body.", title),
            source_domain: "wire.example".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = Config {
            api_key: Some("secret".to_string()),
            ..Config::default()
        };
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[tokio::test]
    async fn test_rewriter_sends_one_combined_payload() {
        let reply = "NEW_TITLE: One\nNEW_CONTENT: First.\nORIGINAL_SOURCE: wire.example - A\n\
                     ---ARTICLE DIVIDER---\n\
                     NEW_CONTENT: orphan without title\n\
                     ---ARTICLE DIVIDER---\n\
                     NEW_TITLE: Two\nNEW_CONTENT: Second.";
        let model = Arc::new(ScriptedModel::default().with_rewrite(reply));
        let rewriter = ArticleRewriter::new(model.clone());

        let rewritten = rewriter
            .rewrite(&[source("A"), source("B"), source("C")], "ocean", "fr", 2)
            .await
            .unwrap();

        assert_eq!(rewritten.len(), 2);
        assert_eq!(rewritten[0].title, "One");
        assert_eq!(rewritten[1].content, "Second.");
        let calls = model.rewrite_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.contains("INDEX:2\nTITLE:C"));
        assert_eq!(calls[0].1.requested_count, 2);
        assert_eq!(calls[0].1.language, "fr");
    }

    #[tokio::test]
    async fn test_rewriter_maps_model_failure() {
        let model = Arc::new(ScriptedModel::default().failing());
        let err = ArticleRewriter::new(model)
            .rewrite(&[source("A")], "ocean", "en", 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "RewriteError");
    }

    #[tokio::test]
    async fn test_composer_parses_reply() {
        let model = Arc::new(
            ScriptedModel::default().with_compose("MAIN_HEADLINE: X\nMAIN_ARTICLE_INDEX: 2\nSUMMARY1: Y"),
        );
        let articles = vec![RewrittenArticle::default(); 3];
        let cover = CoverComposer::new(model.clone())
            .compose(&articles, "ocean", "en")
            .await
            .unwrap();

        assert_eq!(cover.main_headline.as_deref(), Some("X"));
        assert_eq!(cover.main_article_index, Some(2));
        assert_eq!(cover.summary1.as_deref(), Some("Y"));
        assert_eq!(cover.subheading, None);
        assert_eq!(model.compose_calls.lock().unwrap()[0].1.article_count, 3);
    }

    #[tokio::test]
    async fn test_composer_rejects_non_numeric_index() {
        let model = Arc::new(ScriptedModel::default().with_compose("MAIN_ARTICLE_INDEX: first"));
        let err = CoverComposer::new(model)
            .compose(&[RewrittenArticle::default()], "ocean", "en")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "MalformedCoverContent");

        let model = Arc::new(ScriptedModel::default().failing());
        let err = CoverComposer::new(model)
            .compose(&[RewrittenArticle::default()], "ocean", "en")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ComposeError");
    }
}
