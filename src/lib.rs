//! # Community Guide
//!
//! Answers natural-language questions about a city's tech community
//! (meetups, events, venues, companies) from a partitioned key-value store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌────────────┐   ┌────────────────┐
//! │   CLI    │──▶│ QueryRouter │──▶│ DataAccess │──▶│ ResilientStore │
//! │ (cguide) │   │  (keywords) │   │  (typed)   │   │  ▶ SqliteStore │
//! └──────────┘   └─────────────┘   └────────────┘   └────────────────┘
//! ┌──────────┐          ▲
//! │   HTTP   │──────────┘   POST /ask and `ask --context` also phrase the
//! │  (axum)  │              answer with an optional language model (answer)
//! └──────────┘
//! ```
//!
//! The record models, store contract, Data Access Layer and router live in
//! `community-guide-core`. This crate owns configuration, SQLite, the HTTP
//! surface and the CLI.
//!
//! ## Quick Start
//!
//! ```bash
//! cguide init
//! cguide seed
//! cguide ask "What's the next tech meetup?"
//! cguide serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite implementation of the store contract |
//! | [`resilient`] | Retry and timeout wrapper for any store |
//! | [`service`] | Wiring from config to a ready router |
//! | [`seed`] | Sample data and JSON import |
//! | [`answer`] | Route, phrase and fall back: the shared answer path |
//! | [`health`] | Store and model health checks |
//! | [`ask`] | Router, answer and health output on the command line |
//! | [`stats`] | Record counts |
//! | [`llm`] | Language-model client |
//! | [`server`] | HTTP server |

pub mod answer;
pub mod ask;
pub mod config;
pub mod db;
pub mod health;
pub mod llm;
pub mod migrate;
pub mod resilient;
pub mod seed;
pub mod server;
pub mod service;
pub mod sqlite_store;
pub mod stats;
