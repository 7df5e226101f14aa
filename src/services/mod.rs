//! Service layer for business logic
//!
//! Shared by the HTTP handlers and the CLI.

mod auth_service;
mod domain_service;
mod event_service;
mod link_service;
mod redirect_service;
mod workspace_service;

pub use auth_service::*;
pub use domain_service::*;
pub use event_service::*;
pub use link_service::*;
pub use redirect_service::*;
pub use workspace_service::*;
