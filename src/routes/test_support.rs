use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    config::Config,
    db::{memory::MemoryStore, PlanStore},
    services::{
        advice::{testing::ScriptedGenerator, AdviceService, TextGenerator},
        plans::PlanService,
    },
    AppState,
};

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

/// Router over an in-memory store and a generator that always answers `reply`.
pub fn app_with_reply(reply: Option<&str>) -> TestApp {
    let store = Arc::new(MemoryStore::default());
    let advice = reply.map(|r| ScriptedGenerator::answering(r) as Arc<dyn TextGenerator>);
    let state = AppState {
        config: Arc::new(Config::from_lookup(|_| None).expect("default config")),
        plans: Arc::new(PlanService::new(Some(store.clone() as Arc<dyn PlanStore>))),
        advice: Arc::new(AdviceService::new(advice)),
    };
    TestApp {
        router: crate::router(state),
        store,
    }
}

/// Router with no store and no advice backend.
pub fn disconnected_app() -> Router {
    let state = AppState {
        config: Arc::new(Config::from_lookup(|_| None).expect("default config")),
        plans: Arc::new(PlanService::new(None)),
        advice: Arc::new(AdviceService::new(None)),
    };
    crate::router(state)
}

pub async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}
