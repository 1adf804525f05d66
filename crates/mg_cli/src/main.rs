use std::sync::Arc;

use clap::Parser;
use mg_core::{init_logging, quota, Result};
use mg_pipeline::{create_orchestrator, MagazineRun, PipelineOrchestrator, RunRequest};
use mg_sources::SearchConfig;
use mg_storage::StorageConfig;
use mg_web::AppState;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Builds news magazines from a topic", long_about = None)]
pub struct Cli {
    #[arg(long, env = "MG_MODEL", default_value = "gemini", help = "Model to use: gemini (default), deepseek, dummy")]
    model: String,
    #[arg(long, env = "MODEL_API_KEY", hide_env_values = true)]
    model_api_key: Option<String>,
    #[arg(long, env = "MODEL_BASE_URL")]
    model_base_url: Option<String>,
    #[arg(long, env = "MG_TEXT_MODEL")]
    text_model: Option<String>,
    #[arg(long, env = "MG_IMAGE_MODEL")]
    image_model: Option<String>,
    #[arg(long, env = "EXA_API_KEY", hide_env_values = true)]
    exa_api_key: Option<String>,
    #[arg(long, env = "EXA_BASE_URL")]
    exa_base_url: Option<String>,
    #[arg(long, env = "MG_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,
    #[arg(long, env = "MG_STORAGE", default_value = "memory", help = "Where packages go: memory, local or gcs")]
    storage: String,
    #[arg(long, env = "MG_STORAGE_URL")]
    storage_url: Option<String>,
    #[arg(long, env = "MG_STORAGE_BUCKET")]
    bucket: Option<String>,
    #[arg(long, env = "MG_STORAGE_TOKEN", hide_env_values = true)]
    storage_token: Option<String>,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the stage and run endpoints over HTTP
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Build one magazine and publish it
    Run {
        topic: String,
        #[arg(long, default_value = "en")]
        language: String,
        #[arg(long, default_value = "1")]
        quota: String,
        #[arg(long, default_value = "local-user")]
        user: String,
    },
    /// Show what a quota token resolves to
    Quota { token: String },
}

impl Cli {
    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            api_key: self.exa_api_key.clone(),
            base_url: self.exa_base_url.clone(),
            timeout_secs: self.timeout_secs,
            ..SearchConfig::default()
        }
    }

    fn inference_config(&self) -> mg_inference::Config {
        mg_inference::Config {
            model_name: self.model.clone(),
            api_key: self.model_api_key.clone(),
            base_url: self.model_base_url.clone(),
            text_model: self.text_model.clone(),
            image_model: self.image_model.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            url: self.storage_url.clone(),
            bucket: self.bucket.clone(),
            token: self.storage_token.clone(),
        }
    }
}

async fn runner(cli: &Cli) -> Result<(Arc<PipelineOrchestrator>, MagazineRun)> {
    let logger = mg_core::Logger::new().with_new_prefixes("[magazine]");
    let orchestrator = create_orchestrator(&cli.search_config(), cli.inference_config(), logger).await?;
    let storage = mg_storage::create_storage(&cli.storage, &cli.storage_config()).await?;
    let run = MagazineRun::new(orchestrator.clone(), storage);
    Ok((orchestrator, run))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Quota { token } => {
            let plan = quota::resolve(token)?;
            println!(
                "quota {}: {} articles from the last {} day(s)",
                token, plan.article_count, plan.lookback_days
            );
        }
        Commands::Serve { port } => {
            let (orchestrator, run) = runner(&cli).await?;
            info!("🚀 Starting server on port {}", port);
            let state = AppState {
                orchestrator,
                runner: run,
            };
            mg_web::serve(state, *port).await?;
        }
        Commands::Run {
            topic,
            language,
            quota,
            user,
        } => {
            let (_, run) = runner(&cli).await?;
            let request = RunRequest {
                user_id: user.clone(),
                topic: topic.clone(),
                language: language.clone(),
                quota: quota.clone(),
            };
            let outcome = run.run(&request).await.map_err(|e| {
                tracing::error!("❌ {}", e);
                e.source
            })?;
            info!("✨ Magazine ready");
            println!("{}", outcome.location);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_arguments() {
        let cli = Cli::try_parse_from([
            "mg", "--model", "dummy", "run", "deep sea", "--language", "pt", "--quota", "3", "--user", "u1",
        ])
        .unwrap();
        assert_eq!(cli.inference_config().model_name, "dummy");
        match cli.command {
            Commands::Run {
                topic,
                language,
                quota,
                user,
            } => {
                assert_eq!(topic, "deep sea");
                assert_eq!((language.as_str(), quota.as_str(), user.as_str()), ("pt", "3", "u1"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_serve_port() {
        let cli = Cli::try_parse_from(["mg", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: 9000 }));
    }
}
