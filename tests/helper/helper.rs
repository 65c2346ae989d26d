use axum::{body::Body, http::Request, response::Response};
use serde::de::DeserializeOwned;
use std::{net::SocketAddr, sync::Arc, time::Duration};

use mwap_backend::{
    app::build_app,
    config::AppConfig,
    sms::{LogSmsSender, SmsSender},
    state::AppState,
    store::MemoryStore,
    utils::RetryPolicy,
};

/// App state on an in memory store which returns generated codes to the caller
pub fn test_state() -> (Arc<AppState>, Arc<MemoryStore>) {
    let mut config = AppConfig::local();
    config.otp.expose_code = true;
    let retry = RetryPolicy::new(3, Duration::from_millis(1));
    state_with(config, Arc::new(LogSmsSender), retry)
}

/// App state on an in memory store with the given config and sms gateway
pub fn state_with(
    config: AppConfig,
    sms: Arc<dyn SmsSender>,
    retry: RetryPolicy,
) -> (Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(config, store.clone(), store.clone(), sms, retry);
    (Arc::new(state), store)
}

/// Serve the app on a random local port
pub fn spawn_server(state: Arc<AppState>) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_app(state);
    tokio::spawn(async move {
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service())
            .await
            .unwrap();
    });
    addr
}

pub fn build_post_request(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

pub fn build_get_request(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

pub async fn read_json<T: DeserializeOwned>(res: Response) -> T {
    let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
