//! The magazine job as a resumable state machine.
//!
//! Every stage takes the caller's [`ProcessData`] by reference, checks the
//! fields it needs, calls at most one collaborator and returns an updated copy.
//! Nothing is retained between calls, so any stage can be re-invoked with the
//! same input.

use std::fmt;
use std::sync::Arc;

use mg_core::quota;
use mg_core::{Error, InferenceModel, Logger, MagazinePackage, ProcessData, Result, Stage};
use mg_inference::prompts::cover_image_prompt;
use mg_inference::{ArticleRewriter, CoverComposer, CoverImageGenerator};
use mg_sources::SourceArticleFetcher;

use crate::StageError;

fn field<'a, T>(value: &'a Option<T>, stage: Stage, name: &'static str) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or(Error::MissingProcessField { stage, field: name })
}

pub struct PipelineOrchestrator {
    fetcher: SourceArticleFetcher,
    rewriter: ArticleRewriter,
    composer: CoverComposer,
    images: CoverImageGenerator,
    logger: Logger,
}

impl fmt::Debug for PipelineOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOrchestrator")
            .field("fetcher", &self.fetcher)
            .field("rewriter", &self.rewriter)
            .field("composer", &self.composer)
            .field("images", &self.images)
            .finish()
    }
}

impl PipelineOrchestrator {
    pub fn new(fetcher: SourceArticleFetcher, model: Arc<dyn InferenceModel>) -> Self {
        Self {
            fetcher,
            rewriter: ArticleRewriter::new(model.clone()),
            composer: CoverComposer::new(model.clone()),
            images: CoverImageGenerator::new(model),
            logger: Logger::new(),
        }
        .with_logger(Logger::new().with_new_prefixes("[magazine]"))
    }

    /// Scopes every component's logger under `logger`.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.fetcher = self.fetcher.with_logger(logger.with_prefix("[fetch]"));
        self.rewriter = self.rewriter.with_logger(logger.with_prefix("[rewrite]"));
        self.composer = self.composer.with_logger(logger.with_prefix("[compose]"));
        self.images = self.images.with_logger(logger.with_prefix("[image]"));
        self.logger = logger;
        self
    }

    fn require(&self, stage: Stage, data: &ProcessData) -> Result<()> {
        match data.missing_field(stage) {
            Some(field) => {
                self.logger
                    .error(&format!("❌ Stage {} is missing `{}`", stage, field));
                Err(Error::MissingProcessField { stage, field })
            }
            None => Ok(()),
        }
    }

    fn advance(&self, stage: Stage, mut next: ProcessData) -> ProcessData {
        next.status = Some(stage.produces());
        self.logger
            .info(&format!("✅ Stage {} done, status {}", stage, stage.produces()));
        next
    }

    pub fn init(&self, data: &ProcessData) -> Result<ProcessData> {
        let stage = Stage::Init;
        self.require(stage, data)?;
        let plan = quota::resolve(field(&data.quota, stage, "quota")?)?;

        let mut next = data.clone();
        next.article_count = Some(plan.article_count);
        next.lookback_days = Some(plan.lookback_days);
        Ok(self.advance(stage, next))
    }

    pub async fn fetch(&self, data: &ProcessData) -> Result<ProcessData> {
        let stage = Stage::Fetch;
        self.require(stage, data)?;
        let articles = self
            .fetcher
            .fetch(
                field(&data.topic, stage, "topic")?,
                *field(&data.article_count, stage, "articleCount")?,
                *field(&data.lookback_days, stage, "lookbackDays")?,
            )
            .await?;

        let mut next = data.clone();
        next.source_articles = Some(articles);
        Ok(self.advance(stage, next))
    }

    pub async fn rewrite(&self, data: &ProcessData) -> Result<ProcessData> {
        let stage = Stage::Rewrite;
        self.require(stage, data)?;
        let rewritten = self
            .rewriter
            .rewrite(
                field(&data.source_articles, stage, "sourceArticles")?,
                field(&data.topic, stage, "topic")?,
                field(&data.language, stage, "language")?,
                *field(&data.article_count, stage, "articleCount")?,
            )
            .await?;

        let mut next = data.clone();
        next.rewritten_articles = Some(rewritten);
        Ok(self.advance(stage, next))
    }

    pub async fn compose(&self, data: &ProcessData) -> Result<ProcessData> {
        let stage = Stage::Compose;
        self.require(stage, data)?;
        let cover = self
            .composer
            .compose(
                field(&data.rewritten_articles, stage, "rewrittenArticles")?,
                field(&data.topic, stage, "topic")?,
                field(&data.language, stage, "language")?,
            )
            .await?;

        let mut next = data.clone();
        next.cover_content = Some(cover);
        Ok(self.advance(stage, next))
    }

    pub async fn image(&self, data: &ProcessData) -> Result<ProcessData> {
        let stage = Stage::Image;
        self.require(stage, data)?;
        let prompt = cover_image_prompt(
            field(&data.topic, stage, "topic")?,
            data.cover_content.as_ref(),
            data.rewritten_articles.as_deref().unwrap_or_default(),
        );
        let encoded = self.images.generate(&prompt).await?;

        let mut next = data.clone();
        next.cover_image = Some(encoded);
        Ok(self.advance(stage, next))
    }

    pub fn finalize(&self, data: &ProcessData) -> Result<ProcessData> {
        let stage = Stage::Finalize;
        self.require(stage, data)?;
        let articles = field(&data.rewritten_articles, stage, "rewrittenArticles")?;
        let cover = field(&data.cover_content, stage, "coverContent")?;
        for (name, index) in cover.out_of_range_indices(articles.len()) {
            self.logger.warn(&format!(
                "⚠️ {} = {} does not point at one of the {} articles",
                name,
                index,
                articles.len()
            ));
        }

        let package = MagazinePackage {
            language: field(&data.language, stage, "language")?.clone(),
            topic: field(&data.topic, stage, "topic")?.clone(),
            period: *field(&data.lookback_days, stage, "lookbackDays")?,
            articles: articles.clone(),
            cover_content: cover.clone(),
            cover_image: field(&data.cover_image, stage, "coverImage")?.clone(),
        };

        let mut next = data.clone();
        next.magazine = Some(package);
        Ok(self.advance(stage, next))
    }

    pub async fn run_stage(&self, stage: Stage, data: &ProcessData) -> Result<ProcessData> {
        match stage {
            Stage::Init => self.init(data),
            Stage::Fetch => self.fetch(data).await,
            Stage::Rewrite => self.rewrite(data).await,
            Stage::Compose => self.compose(data).await,
            Stage::Image => self.image(data).await,
            Stage::Finalize => self.finalize(data),
        }
    }

    /// Runs every remaining stage in order, starting from the job's status.
    pub async fn run_all(&self, data: ProcessData) -> std::result::Result<ProcessData, StageError> {
        let mut data = data;
        while let Some(stage) = data.next_stage() {
            data = self
                .run_stage(stage, &data)
                .await
                .map_err(|source| StageError::new(stage.as_str(), source))?;
        }
        Ok(data)
    }
}
