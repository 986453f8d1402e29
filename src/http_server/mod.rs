//! # Roster HTTP Server Module
//!
//! Combines the endpoint routers into a single Axum server.
//!
//! # Endpoints
//!
//! - `/`, `/health` - Liveness
//! - `/students`, `/students/{id}` - Student CRUD

pub mod config;
pub mod extract;
pub mod health_routes;
pub mod server;
pub mod student_routes;

pub use config::HttpServerConfig;
pub use extract::{CaseInsensitiveJson, RosterPath};
pub use server::{build_router, AppState, HttpServer};
