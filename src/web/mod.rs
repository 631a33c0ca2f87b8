//! Web API module for fileshare.
//!
//! This module provides the JSON REST API: accounts and sessions, folder and
//! image management, and public share links.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use openapi::{create_swagger_router, ApiDoc};
pub use router::{create_health_router, create_router};
pub use server::WebServer;
