//! Mode routing
//!
//! - Server mode (HTTP server), the default
//! - CLI mode (`workspace`, `token`, `config` commands)

#[cfg(feature = "cli")]
pub mod cli;
pub mod server;

#[cfg(feature = "cli")]
pub use cli::run_cli;
pub use server::{configure_app, run_server};
