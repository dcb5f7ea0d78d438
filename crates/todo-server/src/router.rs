use std::time::Duration;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
use crate::endpoint::endpoints;
use crate::handler;
use crate::pagination::TOTAL_COUNT_HEADER;
use crate::state::SharedState;

/// Build the axum router with all todo endpoints.
pub fn build_router(state: SharedState, cors: &CorsConfig) -> Router {
    let cors_layer = cors_layer(&state, cors);

    let router = Router::new()
        .route(
            endpoints::ITEMS,
            get(handler::list_items)
                .post(handler::create_item)
                .put(handler::update_item),
        )
        .route(
            endpoints::ITEM,
            get(handler::get_item).delete(handler::delete_item),
        )
        .route(endpoints::HEALTH, get(handler::health_handler))
        .route(endpoints::INFO, get(handler::info_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match cors_layer {
        Some(layer) => router.layer(layer),
        None => router,
    }
}

fn cors_layer(state: &SharedState, cors: &CorsConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .expose_headers([
                header::AUTHORIZATION,
                header::LINK,
                TOTAL_COUNT_HEADER,
                state.alerts.alert_header().clone(),
                state.alerts.error_header().clone(),
                state.alerts.params_header().clone(),
            ])
            .max_age(Duration::from_secs(cors.max_age_secs)),
    )
}
