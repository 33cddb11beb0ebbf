//! REST surface: cache administration and health.

pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

pub use server::{build_router, start_server, AppState};
