//! Handlers for `/owners` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use stud_core::{
  owner::{Owner, OwnerDraft, OwnerQuery},
  registry::Registry,
  store::RecordStore,
};

use crate::error::ApiError;

/// `GET /owners[?name=..][&max_amount=..]`
pub async fn search<S: RecordStore>(
  State(registry): State<Arc<Registry<S>>>,
  query: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<Vec<Owner>>, ApiError> {
  let Query(query) = query?;
  Ok(Json(registry.search_owners(&query).await?))
}

/// `POST /owners`
pub async fn create<S: RecordStore>(
  State(registry): State<Arc<Registry<S>>>,
  body: Result<Json<OwnerDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(draft) = body?;
  let owner = registry.create_owner(draft).await?;
  tracing::info!(id = owner.id, "owner created");
  Ok((StatusCode::CREATED, Json(owner)))
}
