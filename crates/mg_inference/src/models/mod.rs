use std::sync::Arc;

use mg_core::{Error, InferenceModel, Result};

use crate::Config;

pub mod deepseek;
pub mod dummy;
pub mod gemini;

/// Builds the model named in the config, `gemini` when none is given.
pub async fn create_model(config: Option<Config>) -> Result<Arc<dyn InferenceModel>> {
    let config = config.unwrap_or_default();
    let model: Arc<dyn InferenceModel> = match config.model_name.to_lowercase().as_str() {
        "gemini" => Arc::new(gemini::GeminiModel::new(&config)?),
        "deepseek" => Arc::new(deepseek::DeepSeekModel::new(&config)?),
        "dummy" => Arc::new(dummy::DummyModel::new(Some(config)).await?),
        other => return Err(Error::Config(format!("Unknown model: {}", other))),
    };
    tracing::info!("🧠 Using {} model", model.name());
    Ok(model)
}
