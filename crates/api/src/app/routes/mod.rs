use axum::{Router, routing::post};

pub mod analyze;
pub mod system;

/// Router for the `/api` endpoints.
pub fn router() -> Router {
    Router::new().route("/analyze", post(analyze::analyze))
}
