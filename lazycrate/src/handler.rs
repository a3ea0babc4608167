//! Axum adapter.
//!
//! Exposes a resource's lazy load as a `POST` endpoint taking the descriptor
//! as JSON. Pages carry a `Content-Range` header.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .nest("/people", lazycrate::handler::lazy_load_router::<Person>())
//!     .with_state(db);
//! // POST /people/lazy  {"filters": {...}, "paginate": true, "rows": 25, "page": 1}
//! ```

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::post,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use serde_json::Value;

use crate::core::{LazyResource, lazy_load};
use crate::errors::ApiError;

/// Run a lazy load for `R` from a JSON body.
///
/// # Errors
///
/// 400 when the body is not JSON, 422 when the descriptor is rejected and 500
/// when the query fails.
pub async fn lazy_load_handler<R>(
    State(db): State<DatabaseConnection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError>
where
    R: LazyResource + Serialize,
    R::EntityType: EntityTrait + Sync,
    <R::EntityType as EntityTrait>::Model: Sync,
    R: From<<R::EntityType as EntityTrait>::Model>,
{
    let Json(raw) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let result = lazy_load::<R>(&db, &raw).await?;

    let headers = result
        .as_page()
        .map(|page| page.content_range(R::RESOURCE_NAME_PLURAL))
        .unwrap_or_else(HeaderMap::new);
    Ok((headers, Json(result)).into_response())
}

/// Router with `POST /lazy` bound to [`lazy_load_handler`] for `R`.
pub fn lazy_load_router<R>() -> Router<DatabaseConnection>
where
    R: LazyResource + Serialize + 'static,
    R::EntityType: EntityTrait + Sync,
    <R::EntityType as EntityTrait>::Model: Sync,
    R: From<<R::EntityType as EntityTrait>::Model>,
{
    Router::new().route("/lazy", post(lazy_load_handler::<R>))
}
