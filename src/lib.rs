//! HTTP API for todo items backed by a single-file SQLite database.
//!
//! # Overview
//! One resource, five verbs: list, fetch, create, replace, partially update,
//! and delete items under `/items`. Handlers deserialize a JSON payload, run
//! one statement through [`ItemStore`], and serialize the result back.
//!
//! # Design
//! - The router is built by [`app`] from an explicitly passed store, so
//!   tests drive it in-process through `tower::ServiceExt::oneshot` with an
//!   in-memory database.
//! - Failures map to exactly two statuses: a missing item is 404, anything
//!   else is 400, always with an `{"message": ...}` body (see [`ApiError`]).
//! - PUT and PATCH share one handler. Both fetch the stored item, fold the
//!   payload's recognized fields onto it, and write it back, so a partial
//!   body leaves the remaining fields untouched.
//! - A body that fails JSON extraction is treated as an absent payload
//!   rather than rejected. Applying fields never fails; a create without a
//!   usable `name` is stopped by the `NOT NULL` constraint instead.

pub mod error;
pub mod store;
pub mod types;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

pub use error::ApiError;
pub use store::ItemStore;
pub use types::Item;

type SharedStore = Arc<ItemStore>;

/// Builds the router serving the `/items` resource on the given store.
pub fn app(store: ItemStore) -> Router {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item)
                .put(update_item)
                .patch(update_item)
                .delete(delete_item),
        )
        .with_state(Arc::new(store))
}

/// Serves [`app`] on the given listener until the task is cancelled.
pub async fn run(listener: TcpListener, store: ItemStore) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}

fn payload(body: Result<Json<Value>, JsonRejection>) -> Value {
    body.map(|Json(value)| value).unwrap_or(Value::Null)
}

async fn list_items(State(store): State<SharedStore>) -> Result<Json<Vec<Item>>, ApiError> {
    store.list().map(Json)
}

async fn get_item(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
) -> Result<Json<Item>, ApiError> {
    store.get(id).map(Json)
}

async fn create_item(
    State(store): State<SharedStore>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Item>, ApiError> {
    let mut item = Item::default();
    item.apply(&payload(body));
    store.create(&mut item)?;
    tracing::debug!(id = item.id, "created item");
    Ok(Json(item))
}

async fn update_item(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Item>, ApiError> {
    let mut item = store.get(id)?;
    item.apply(&payload(body));
    store.update(&item)?;
    Ok(Json(item))
}

async fn delete_item(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let item = store.get(id)?;
    store.delete(item)?;
    tracing::debug!(id, "deleted item");
    Ok(StatusCode::OK)
}
