use std::sync::Arc;

use mg_core::ObjectStorage;
use mg_pipeline::{MagazineRun, PipelineOrchestrator};

pub struct AppState {
    pub orchestrator: Arc<PipelineOrchestrator>,
    pub runner: MagazineRun,
}

impl AppState {
    pub fn new(orchestrator: Arc<PipelineOrchestrator>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            runner: MagazineRun::new(orchestrator.clone(), storage),
            orchestrator,
        }
    }
}
