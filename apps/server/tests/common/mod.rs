#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use cointrail_market_data::{MarketDataError, MarketDataProvider, MarketTicker};
use cointrail_server::{api::app_router, build_state_with_provider, config::Config, AppState};
use tower::ServiceExt;

/// Provider that replays queued responses, then returns empty snapshots.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<Vec<Result<Vec<MarketTicker>, MarketDataError>>>,
}

impl ScriptedProvider {
    pub fn push(&self, response: Result<Vec<MarketTicker>, MarketDataError>) {
        self.responses.lock().unwrap().push(response);
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedProvider {
    fn id(&self) -> &'static str {
        "SCRIPTED"
    }

    async fn get_market_snapshot(
        &self,
        _asset_ids: &[String],
    ) -> Result<Vec<MarketTicker>, MarketDataError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(Vec::new())
        } else {
            responses.remove(0)
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub provider: Arc<ScriptedProvider>,
}

pub fn test_config(data_file: &Path) -> Config {
    let data_file = data_file.to_string_lossy().to_string();
    Config::from_lookup(|key| match key {
        "CT_DATA_FILE" => Some(data_file.clone()),
        "CT_POLL_ENABLED" => Some("false".to_string()),
        _ => None,
    })
    .unwrap()
}

pub fn test_app(data_file: &Path) -> TestApp {
    let config = test_config(data_file);
    let provider = Arc::new(ScriptedProvider::default());
    let state = build_state_with_provider(&config, provider.clone()).unwrap();
    let router = app_router(state.clone(), &config);
    TestApp {
        router,
        state,
        provider,
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
