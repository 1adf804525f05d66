use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/process/init", post(handlers::init))
        .route("/api/process/fetch-articles", post(handlers::fetch_articles))
        .route("/api/process/rewrite-articles", post(handlers::rewrite_articles))
        .route("/api/process/create-cover", post(handlers::create_cover))
        .route("/api/process/generate-image", post(handlers::generate_image))
        .route("/api/process/finalize", post(handlers::finalize))
        .route("/api/run", post(handlers::run))
        .route("/run/:user_id/:language/:topic/:quota", get(handlers::run_legacy))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Binds `port` on all interfaces and serves until the process stops.
pub async fn serve(state: AppState, port: u16) -> mg_core::Result<()> {
    let app = create_app(state).await;
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, ApiError, AppState};
    pub use mg_core::{Error, ProcessData, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use mg_core::{Error, ImageFetcher, ProcessData, SearchBackend, SearchQuery, SearchResult, Status};
    use mg_inference::models::dummy::DummyModel;
    use mg_pipeline::PipelineOrchestrator;
    use mg_sources::{ImageSelector, SourceArticleFetcher};
    use mg_storage::MemoryStorage;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    #[derive(Debug)]
    struct WireSearch;

    #[async_trait]
    impl SearchBackend for WireSearch {
        fn name(&self) -> &str {
            "Wire"
        }

        async fn search(&self, query: &SearchQuery) -> mg_core::Result<Vec<SearchResult>> {
            Ok((0..query.num_results)
                .map(|i| SearchResult {
                    title: format!("Wire story {}", i),
                    url: format!("https://wire.example/{}", i),
                    text: format!("Something happened {}. Details later.", i),
                    ..SearchResult::default()
                })
                .collect())
        }
    }

    #[derive(Debug)]
    struct NoImages;

    #[async_trait]
    impl ImageFetcher for NoImages {
        async fn fetch_image(&self, url: &str) -> mg_core::Result<Vec<u8>> {
            Err(Error::Fetch(url.to_string()))
        }
    }

    async fn app(storage: Arc<MemoryStorage>) -> Router {
        let fetcher = SourceArticleFetcher::new(Arc::new(WireSearch), ImageSelector::new(Arc::new(NoImages)));
        let model = Arc::new(DummyModel::new(None).await.unwrap());
        let orchestrator = Arc::new(PipelineOrchestrator::new(fetcher, model));
        create_app(AppState::new(orchestrator, storage)).await
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(Arc::new(MemoryStorage::new())).await;
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_init_endpoint_resolves_quota() {
        let app = app(Arc::new(MemoryStorage::new())).await;
        let (status, body) = post_json(
            app,
            "/api/process/init",
            json!({"topic": "space", "language": "en", "quota": "7"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["articleCount"], 20);
        assert_eq!(body["lookbackDays"], 30);
        assert_eq!(body["status"], "initialized");
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let app = app(Arc::new(MemoryStorage::new())).await;
        let (status, body) = post_json(
            app,
            "/api/process/fetch-articles",
            json!({"topic": "space", "articleCount": 6}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["stage"], "fetch");
        assert_eq!(body["error"], "MissingProcessField");
        assert!(body["message"].as_str().unwrap().contains("lookbackDays"));
    }

    #[tokio::test]
    async fn test_stage_endpoints_chain() {
        let storage = Arc::new(MemoryStorage::new());
        let mut data = json!({"topic": "space", "language": "en", "quota": "1"});
        for uri in [
            "/api/process/init",
            "/api/process/fetch-articles",
            "/api/process/rewrite-articles",
            "/api/process/create-cover",
            "/api/process/generate-image",
            "/api/process/finalize",
        ] {
            let (status, body) = post_json(app(storage.clone()).await, uri, data).await;
            assert_eq!(status, StatusCode::OK, "{} failed: {}", uri, body);
            data = body;
        }
        let data: ProcessData = serde_json::from_value(data).unwrap();
        assert_eq!(data.status, Some(Status::Completed));
        assert_eq!(data.magazine.unwrap().articles.len(), 6);
    }

    #[tokio::test]
    async fn test_legacy_run_publishes() {
        let storage = Arc::new(MemoryStorage::new());
        let app = app(storage.clone()).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/run/u7/en/space/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(storage.get("u7/base_files/report.json").await.is_some());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_tagged_bad_request() {
        let cases = [
            ("/api/process/init", json!({"topic": 5, "language": "en", "quota": "1"}), "init"),
            ("/api/process/fetch-articles", json!({"topic": "space", "status": "halfway"}), "fetch"),
            ("/api/process/rewrite-articles", json!({"topic": "space", "articleCount": -1}), "rewrite"),
            ("/api/run", json!({"topic": "space"}), "run"),
        ];
        for (uri, body, stage) in cases {
            let app = app(Arc::new(MemoryStorage::new())).await;
            let (status, body) = post_json(app, uri, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["stage"], stage);
            assert_eq!(body["error"], "InvalidRequest");
            assert!(body["message"].as_str().unwrap().starts_with("Invalid request:"));
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_tagged_bad_request() {
        let app = app(Arc::new(MemoryStorage::new())).await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/process/finalize")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["stage"], "finalize");
        assert_eq!(body["error"], "InvalidRequest");
    }

    #[tokio::test]
    async fn test_run_with_empty_user_is_bad_request() {
        let storage = Arc::new(MemoryStorage::new());
        let app = app(storage.clone()).await;
        let (status, body) = post_json(
            app,
            "/api/run",
            json!({"userId": " ", "topic": "space", "language": "en", "quota": "1"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["stage"], "run");
        assert_eq!(body["error"], "InvalidRequest");
        assert!(storage.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_run_with_bad_quota() {
        let app = app(Arc::new(MemoryStorage::new())).await;
        let (status, body) = post_json(
            app,
            "/api/run",
            json!({"userId": "u7", "topic": "space", "language": "en", "quota": "2"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["stage"], "init");
        assert_eq!(body["error"], "InvalidQuota");
    }
}
