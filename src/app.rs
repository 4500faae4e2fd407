use crate::{
    logging::{access_log, log_payloads},
    models::AppState,
    routes::recipes,
};

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::{Json, Router};

use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

async fn healthz() -> Json<&'static str> {
    Json("ok")
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.map(HeaderValue::from_str) {
        Some(Ok(v)) => AllowOrigin::exact(v),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "invalid CORS origin, allowing all origins");
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn recipe_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/recipe/generate",
            post(recipes::generate).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/recipes", get(recipes::list))
        .route("/recipes/latest", get(recipes::latest))
}

pub fn build_app(state: AppState) -> Router {
    let routes = recipe_routes(state.config.max_upload_bytes);
    let cors = cors_layer(state.config.cors_origin.as_deref());

    // Request-ID middleware comes first so everything downstream
    // has access to the x-request-id header.
    let request_id_layer = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id());

    // Served both at the root and under /api, where existing clients call it.
    Router::new()
        .route("/healthz", get(healthz))
        .merge(routes.clone())
        .nest("/api", routes)
        .with_state(state)
        .layer(from_fn(log_payloads))
        .layer(from_fn(access_log))
        .layer(request_id_layer)
        .layer(cors)
}
