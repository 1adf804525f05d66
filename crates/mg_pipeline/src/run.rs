use std::sync::Arc;

use serde::{Deserialize, Serialize};

use mg_core::{Error, Logger, ObjectStorage, ProcessData};
use mg_storage::upload_json;

use crate::{PipelineOrchestrator, StageError};

/// Where a user's finished magazine is published.
pub fn report_key(user_id: &str) -> String {
    format!("{}/base_files/report.json", user_id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub user_id: String,
    pub topic: String,
    pub language: String,
    pub quota: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub location: String,
    pub data: ProcessData,
}

/// Runs a whole job through the stage operations and publishes the package.
#[derive(Clone)]
pub struct MagazineRun {
    orchestrator: Arc<PipelineOrchestrator>,
    storage: Arc<dyn ObjectStorage>,
    logger: Logger,
}

impl MagazineRun {
    pub fn new(orchestrator: Arc<PipelineOrchestrator>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            orchestrator,
            storage,
            logger: Logger::new().with_new_prefixes("[run]"),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub async fn run(&self, request: &RunRequest) -> Result<RunOutcome, StageError> {
        if request.user_id.trim().is_empty() {
            return Err(StageError::new(
                "run",
                Error::InvalidRequest("user id must not be empty".to_string()),
            ));
        }
        self.logger.info(&format!(
            "🚀 Magazine for {} about {:?} in {} (quota {})",
            request.user_id, request.topic, request.language, request.quota
        ));

        let data = ProcessData::new(&request.topic, &request.language, &request.quota);
        let data = self.orchestrator.run_all(data).await?;
        let location = self.publish(&request.user_id, &data).await?;
        Ok(RunOutcome { location, data })
    }

    async fn publish(&self, user_id: &str, data: &ProcessData) -> Result<String, StageError> {
        let package = data.magazine.as_ref().ok_or_else(|| {
            StageError::new(
                "publish",
                Error::MissingProcessField {
                    stage: mg_core::Stage::Finalize,
                    field: "magazine",
                },
            )
        })?;
        let key = report_key(user_id);
        let location = upload_json(self.storage.as_ref(), package, &key)
            .await
            .map_err(|e| StageError::new("publish", e))?;
        self.logger
            .info(&format!("📦 Published to {} ({})", location, self.storage.name()));
        Ok(location)
    }
}
