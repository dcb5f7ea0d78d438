use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{OriginalUri, Path, RawQuery, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::debug;

use todo_types::{ItemId, ENTITY_NAME};

use crate::endpoint::{item_location, HealthResponse};
use crate::error::{ApiError, ApiResult};
use crate::pagination::{page_request, pagination_headers, parse_query};
use crate::service::{ItemPayload, ItemService};
use crate::state::{ErrorReply, SharedState};

type Reply = Result<Response, ErrorReply>;

/// Run a service call on the blocking pool. Store backends do file I/O
/// (and possibly `fsync`) inline.
async fn blocking<T, F>(state: &SharedState, call: F) -> Result<T, ErrorReply>
where
    T: Send + 'static,
    F: FnOnce(&ItemService) -> ApiResult<T> + Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || call(&service))
        .await
        .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))
        .and_then(|result| result)
        .map_err(|e| state.reject(e))
}

/// `POST /api/items`
pub async fn create_item(
    State(state): State<SharedState>,
    body: Result<Json<ItemPayload>, JsonRejection>,
) -> Reply {
    let Json(payload) = body.map_err(|e| state.reject(ApiError::BadRequest(e.body_text())))?;
    debug!(?payload, "REST request to save Item");

    let item = blocking(&state, move |service| service.create(payload)).await?;
    let id = item.id.map(|id| id.to_string()).unwrap_or_default();

    let mut headers = state.alerts.entity_created(ENTITY_NAME, &id);
    if let Ok(location) = HeaderValue::from_str(&item_location(&id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(item)).into_response())
}

/// `PUT /api/items`
pub async fn update_item(
    State(state): State<SharedState>,
    body: Result<Json<ItemPayload>, JsonRejection>,
) -> Reply {
    let Json(payload) = body.map_err(|e| state.reject(ApiError::BadRequest(e.body_text())))?;
    debug!(?payload, "REST request to update Item");

    let item = blocking(&state, move |service| service.update(payload)).await?;
    let id = item.id.map(|id| id.to_string()).unwrap_or_default();

    let headers = state.alerts.entity_updated(ENTITY_NAME, &id);
    Ok((StatusCode::OK, headers, Json(item)).into_response())
}

/// `GET /api/items?page=&size=&sort=`
pub async fn list_items(
    State(state): State<SharedState>,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
) -> Reply {
    debug!("REST request to get a page of Items");
    let pairs = parse_query(query.as_deref());
    let request = page_request(&pairs, &state.paging).map_err(|e| state.reject(e))?;

    let page = blocking(&state, move |service| service.list(&request)).await?;
    let headers = pagination_headers(uri.path(), &pairs, &page);
    Ok((headers, Json(page.content)).into_response())
}

/// `GET /api/items/:id`
pub async fn get_item(
    State(state): State<SharedState>,
    id: Result<Path<ItemId>, PathRejection>,
) -> Reply {
    let Path(id) = id.map_err(|e| state.reject(ApiError::BadRequest(e.body_text())))?;
    debug!(%id, "REST request to get Item");

    let item = blocking(&state, move |service| service.get(id)).await?;
    Ok(Json(item).into_response())
}

/// `DELETE /api/items/:id`
pub async fn delete_item(
    State(state): State<SharedState>,
    id: Result<Path<ItemId>, PathRejection>,
) -> Reply {
    let Path(id) = id.map_err(|e| state.reject(ApiError::BadRequest(e.body_text())))?;
    debug!(%id, "REST request to delete Item");

    blocking(&state, move |service| service.delete(id)).await?;
    let headers = state.alerts.entity_deleted(ENTITY_NAME, &id.to_string());
    Ok((StatusCode::NO_CONTENT, headers).into_response())
}

/// Health check handler. Counts the store to confirm it answers.
pub async fn health_handler(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    let service = state.service.clone();
    let status = tokio::task::spawn_blocking(move || service.store().count())
        .await
        .map_err(|e| e.to_string())
        .and_then(|count| count.map_err(|e| e.to_string()));

    match status {
        Ok(_) => (StatusCode::OK, Json(HealthResponse::up())),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(HealthResponse::down(e)))
        }
    }
}

/// Info handler.
pub async fn info_handler(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "todo-server",
        "version": env!("CARGO_PKG_VERSION"),
        "application": state.application_name,
    }))
}
