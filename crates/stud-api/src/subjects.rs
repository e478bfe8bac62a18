//! Handlers for `/subjects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subjects` | Query params mirror [`SubjectQuery`] |
//! | `POST`   | `/subjects` | Body: [`SubjectDraft`]; 201 on success |
//! | `GET`    | `/subjects/{id}` | 404 if not found |
//! | `PUT`    | `/subjects/{id}` | Body: [`SubjectDraft`]; replaces every field |
//! | `DELETE` | `/subjects/{id}` | Returns the deleted subject |
//! | `GET`    | `/subjects/{id}/pedigree` | Optional `?max_generations=n` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use stud_core::{
  pedigree::PedigreeNode,
  registry::Registry,
  store::RecordStore,
  subject::{SubjectDetail, SubjectDraft, SubjectId, SubjectQuery, SubjectSummary},
};

use crate::error::ApiError;

type Reg<S> = State<Arc<Registry<S>>>;

// ─── Search ──────────────────────────────────────────────────────────────────

/// `GET /subjects[?name=..][&description=..][&date_of_birth=..][&sex=..][&owner_name=..][&limit=..]`
pub async fn search<S: RecordStore>(
  State(registry): Reg<S>,
  query: Result<Query<SubjectQuery>, QueryRejection>,
) -> Result<Json<Vec<SubjectSummary>>, ApiError> {
  let Query(query) = query?;
  Ok(Json(registry.search(&query).await?))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /subjects`
pub async fn create<S: RecordStore>(
  State(registry): Reg<S>,
  body: Result<Json<SubjectDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(draft) = body?;
  let created = registry.create(draft).await?;
  tracing::info!(id = created.subject.id, "subject created");
  Ok((StatusCode::CREATED, Json(created)))
}

// ─── Single subject ──────────────────────────────────────────────────────────

/// `GET /subjects/{id}`
pub async fn get_one<S: RecordStore>(
  State(registry): Reg<S>,
  id: Result<Path<SubjectId>, PathRejection>,
) -> Result<Json<SubjectDetail>, ApiError> {
  let Path(id) = id?;
  Ok(Json(registry.get(id).await?))
}

/// `PUT /subjects/{id}`
pub async fn update<S: RecordStore>(
  State(registry): Reg<S>,
  id: Result<Path<SubjectId>, PathRejection>,
  body: Result<Json<SubjectDraft>, JsonRejection>,
) -> Result<Json<SubjectDetail>, ApiError> {
  let Path(id) = id?;
  let Json(draft) = body?;
  let updated = registry.update(id, draft).await?;
  tracing::info!(id, "subject updated");
  Ok(Json(updated))
}

/// `DELETE /subjects/{id}`
pub async fn delete<S: RecordStore>(
  State(registry): Reg<S>,
  id: Result<Path<SubjectId>, PathRejection>,
) -> Result<Json<SubjectDetail>, ApiError> {
  let Path(id) = id?;
  let deleted = registry.delete(id).await?;
  tracing::info!(id, "subject deleted");
  Ok(Json(deleted))
}

// ─── Pedigree ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PedigreeParams {
  /// Parent edges to follow; absent for the full ancestry.
  pub max_generations: Option<i64>,
}

/// `GET /subjects/{id}/pedigree[?max_generations=n]`
pub async fn pedigree<S: RecordStore>(
  State(registry): Reg<S>,
  id: Result<Path<SubjectId>, PathRejection>,
  params: Result<Query<PedigreeParams>, QueryRejection>,
) -> Result<Json<PedigreeNode>, ApiError> {
  let Path(id) = id?;
  let Query(params) = params?;
  Ok(Json(registry.compute_pedigree(id, params.max_generations).await?))
}
