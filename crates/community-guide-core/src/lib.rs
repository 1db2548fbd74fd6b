//! # Community Guide Core
//!
//! Shared logic for Community Guide: record models, the store item codec,
//! the store abstraction, the Data Access Layer and the keyword-routed
//! Query Router.
//!
//! This crate contains no tokio, sqlx, network or filesystem code. Storage
//! backends and the HTTP surface live in the `community-guide` crate.
//!
//! ```text
//! question ──▶ QueryRouter ──▶ DataAccess ──▶ dyn Store
//!                  │                             │
//!                  ▼                             ▼
//!          results + suggestions        get / query / scan
//! ```

pub mod clock;
pub mod data_access;
pub mod error;
pub mod item;
pub mod models;
pub mod router;
pub mod store;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use clock::{Clock, FixedClock, SystemClock};
pub use data_access::{DataAccess, LoadReport, SeedData};
pub use error::{DataError, FailureMode};
pub use router::{CommunitySummary, QueryRouter, RouteResult, RouterResponse, RouterVocabulary};
pub use store::Store;
