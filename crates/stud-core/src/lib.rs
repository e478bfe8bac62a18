//! Core types, the record-store trait, and the genealogy engine for Stud.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Backends implement [`store::RecordStore`]; transports talk to a
//! [`registry::Registry`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod ancestry;
pub mod error;
pub mod owner;
pub mod pedigree;
pub mod registry;
pub mod store;
pub mod subject;
pub mod validate;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
