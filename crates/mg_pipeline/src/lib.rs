use std::sync::Arc;

use mg_core::{Error, Logger, Result};
use mg_sources::SearchConfig;

pub mod orchestrator;
pub mod run;

pub use orchestrator::PipelineOrchestrator;
pub use run::{report_key, MagazineRun, RunOutcome, RunRequest};

/// A failure tagged with the step that raised it.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    pub stage: &'static str,
    #[source]
    pub source: Error,
}

impl StageError {
    pub fn new(stage: &'static str, source: Error) -> Self {
        Self { stage, source }
    }
}

/// Builds an orchestrator from the search and model configuration.
pub async fn create_orchestrator(
    search: &SearchConfig,
    inference: mg_inference::Config,
    logger: Logger,
) -> Result<Arc<PipelineOrchestrator>> {
    let fetcher = mg_sources::create_fetcher(search)?;
    let model = mg_inference::create_model(Some(inference)).await?;
    Ok(Arc::new(PipelineOrchestrator::new(fetcher, model).with_logger(logger)))
}

pub mod prelude {
    pub use super::{create_orchestrator, MagazineRun, PipelineOrchestrator, RunRequest, StageError};
    pub use mg_core::{ProcessData, Stage, Status};
}
