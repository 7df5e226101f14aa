//! linkhub - workspace-scoped link shortening backend
//!
//! Workspaces manage custom domains and short links, clicks are recorded on
//! redirect, leads and sales are tracked through the API, and every event
//! can be queried or exported as CSV.
//!
//! # Architecture
//! - `storage`: sea-orm backend and domain models
//! - `services`: business rules (auth, domains, links, events, redirects)
//! - `analytics`: query windows, plan gating and CSV export
//! - `api`: actix-web handlers and middleware
//! - `config`: static configuration
//! - `runtime`: startup and execution modes
//! - `system`: logging and shutdown signals

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
#[cfg(feature = "cli")]
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
