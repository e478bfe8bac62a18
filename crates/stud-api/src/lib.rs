//! JSON REST API for the Stud registry.
//!
//! Exposes an axum [`Router`] backed by a [`Registry`] over any
//! [`RecordStore`]. TLS and auth are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", stud_api::api_router(registry.clone()))
//! ```

pub mod error;
pub mod owners;
pub mod subjects;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use serde::Deserialize;
use stud_core::{registry::Registry, store::RecordStore};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `STUD_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  /// Replace the negative-id demonstration records on startup.
  #[serde(default)]
  pub seed_test_data: bool,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `registry`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(registry: Arc<Registry<S>>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    // Subjects
    .route(
      "/subjects",
      get(subjects::search::<S>).post(subjects::create::<S>),
    )
    .route(
      "/subjects/{id}",
      get(subjects::get_one::<S>)
        .put(subjects::update::<S>)
        .delete(subjects::delete::<S>),
    )
    .route("/subjects/{id}/pedigree", get(subjects::pedigree::<S>))
    // Owners
    .route("/owners", get(owners::search::<S>).post(owners::create::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(registry)
}
