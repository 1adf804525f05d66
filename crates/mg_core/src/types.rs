use std::fmt;

use serde::{Deserialize, Serialize};

/// Literal token separating records in a combined generative reply.
pub const ARTICLE_DIVIDER: &str = "---ARTICLE DIVIDER---";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceArticle {
    pub title: String,
    pub url: String,
    pub text: String,
    pub source_domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewrittenArticle {
    pub title: String,
    pub content: String,
    pub source_attribution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_article_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary1_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary2_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary2: Option<String>,
}

impl CoverContent {
    /// The rewritten article the cover headlines, if the model's index points at one.
    pub fn main_article<'a>(&self, articles: &'a [RewrittenArticle]) -> Option<&'a RewrittenArticle> {
        lookup(articles, self.main_article_index)
    }

    /// Indices reported by the model that fall outside `0..article_count`.
    pub fn out_of_range_indices(&self, article_count: usize) -> Vec<(&'static str, i64)> {
        [
            ("mainArticleIndex", self.main_article_index),
            ("summary1Index", self.summary1_index),
            ("summary2Index", self.summary2_index),
        ]
        .into_iter()
        .filter_map(|(name, index)| index.map(|i| (name, i)))
        .filter(|(_, i)| usize::try_from(*i).map_or(true, |i| i >= article_count))
        .collect()
    }
}

fn lookup(articles: &[RewrittenArticle], index: Option<i64>) -> Option<&RewrittenArticle> {
    let index = usize::try_from(index?).ok()?;
    articles.get(index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Initialized,
    ArticlesFetched,
    ArticlesRewritten,
    CoverCreated,
    ImageGenerated,
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Initialized => "initialized",
            Status::ArticlesFetched => "articles_fetched",
            Status::ArticlesRewritten => "articles_rewritten",
            Status::CoverCreated => "cover_created",
            Status::ImageGenerated => "image_generated",
            Status::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of the generation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    Fetch,
    Rewrite,
    Compose,
    Image,
    Finalize,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Init,
        Stage::Fetch,
        Stage::Rewrite,
        Stage::Compose,
        Stage::Image,
        Stage::Finalize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Fetch => "fetch",
            Stage::Rewrite => "rewrite",
            Stage::Compose => "compose",
            Stage::Image => "image",
            Stage::Finalize => "finalize",
        }
    }

    /// ProcessData fields that must be present before the stage runs, in check order.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Stage::Init => &["topic", "language", "quota"],
            Stage::Fetch => &["topic", "articleCount", "lookbackDays"],
            Stage::Rewrite => &["sourceArticles", "topic", "articleCount", "language"],
            Stage::Compose => &["rewrittenArticles", "topic", "language"],
            Stage::Image => &["topic"],
            Stage::Finalize => &[
                "language",
                "topic",
                "lookbackDays",
                "rewrittenArticles",
                "coverContent",
                "coverImage",
            ],
        }
    }

    /// Status written once the stage succeeds.
    pub fn produces(&self) -> Status {
        match self {
            Stage::Init => Status::Initialized,
            Stage::Fetch => Status::ArticlesFetched,
            Stage::Rewrite => Status::ArticlesRewritten,
            Stage::Compose => Status::CoverCreated,
            Stage::Image => Status::ImageGenerated,
            Stage::Finalize => Status::Completed,
        }
    }

    /// The stage to run after a job reached `status`; `None` once completed.
    pub fn after(status: Option<Status>) -> Option<Stage> {
        match status {
            None => Some(Stage::Init),
            Some(Status::Initialized) => Some(Stage::Fetch),
            Some(Status::ArticlesFetched) => Some(Stage::Rewrite),
            Some(Status::ArticlesRewritten) => Some(Stage::Compose),
            Some(Status::CoverCreated) => Some(Stage::Image),
            Some(Status::ImageGenerated) => Some(Stage::Finalize),
            Some(Status::Completed) => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final artifact handed to object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagazinePackage {
    pub language: String,
    pub topic: String,
    pub period: u32,
    pub articles: Vec<RewrittenArticle>,
    pub cover_content: CoverContent,
    pub cover_image: String,
}

/// Caller-held state of one generation job.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookback_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_articles: Option<Vec<SourceArticle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewritten_articles: Option<Vec<RewrittenArticle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_content: Option<CoverContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magazine: Option<MagazinePackage>,
}

impl ProcessData {
    pub fn new(topic: impl Into<String>, language: impl Into<String>, quota: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            language: Some(language.into()),
            quota: Some(quota.into()),
            ..Self::default()
        }
    }

    /// Whether the named field is present. Unknown names are never present.
    pub fn has_field(&self, field: &str) -> bool {
        match field {
            "topic" => self.topic.is_some(),
            "language" => self.language.is_some(),
            "quota" => self.quota.is_some(),
            "articleCount" => self.article_count.is_some(),
            "lookbackDays" => self.lookback_days.is_some(),
            "status" => self.status.is_some(),
            "sourceArticles" => self.source_articles.is_some(),
            "rewrittenArticles" => self.rewritten_articles.is_some(),
            "coverContent" => self.cover_content.is_some(),
            "coverImage" => self.cover_image.is_some(),
            "magazine" => self.magazine.is_some(),
            _ => false,
        }
    }

    /// First required field of `stage` that is absent, in table order.
    pub fn missing_field(&self, stage: Stage) -> Option<&'static str> {
        stage
            .required_fields()
            .iter()
            .copied()
            .find(|field| !self.has_field(field))
    }

    pub fn next_stage(&self) -> Option<Stage> {
        Stage::after(self.status)
    }
}
