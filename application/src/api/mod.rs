//! HTTP API definitions.

pub mod users;

use axum::{routing::get, Router};

/// Name of the [`tracing::Span`] for the API handlers.
pub(crate) const SPAN_NAME: &str = "HTTP API handler";

/// Creates a new [`Router`] serving the HTTP API.
///
/// Handlers expect a [`Service`] to be provided as an [`Extension`].
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
pub fn router() -> Router {
    Router::new()
        .route("/users", get(users::list))
        .route("/users/:id", get(users::get_by_id))
}
