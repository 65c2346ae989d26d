use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{get, post},
    BoxError, Json, Router,
};
use std::{sync::Arc, time::Duration};
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    constants::*, handlers::*, models::GenericResponse, state::AppState, swagger::ApiDoc,
};

/// Build the application router with all the routes, docs and middleware
pub fn build_app(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/ping", get(ping_handler))
        .route("/otp/send", post(send_otp_handler))
        .route("/otp/verify", post(verify_otp_handler))
        .route("/registration", post(commit_registration_handler))
        .route("/registration/check", get(check_registration_handler))
        .route("/login", post(login_handler));
    let swagger = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi());
    let middleware = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(default_route_handler))
        .nest("/api/v1", api_routes)
        .merge(swagger)
        .fallback(global_404_handler)
        .layer(middleware)
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<GenericResponse>) {
    let (status, message) = if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_owned())
    } else {
        tracing::error!("Unhandled middleware error: {err}");
        let msg = "Something went wrong".to_owned();
        (StatusCode::INTERNAL_SERVER_ERROR, msg)
    };
    let res = GenericResponse {
        success: false,
        message,
    };
    (status, Json(res))
}
