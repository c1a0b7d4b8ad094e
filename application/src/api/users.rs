//! [`User`]-related HTTP API handlers.
//!
//! [`User`]: service::domain::User

use axum::{
    extract::{rejection::QueryRejection, Path, Query},
    Extension, Json,
};
use service::{domain::user, query, read, Query as _};
use tracing as log;

use crate::{api, define_error, AsError, Error, Service};

/// Returns the `User` with the specified ID.
///
/// # Errors
///
/// Possible error codes:
/// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist;
/// - `STORAGE_UNAVAILABLE` - the storage failed to serve the request.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "getUserById",
        id = %id,
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn get_by_id(
    Extension(service): Extension<Service>,
    Path(id): Path<String>,
) -> Result<Json<read::user::Projection>, Error> {
    service
        .execute(query::user::ById::by(user::Id::from(id)))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| UserError::NotExists.into())
        .map(Json)
}

/// Returns the page of `User`s matching the provided query parameters.
///
/// Malformed query parameters are never rejected: they fall back to their
/// defaults instead. Only the first occurrence of a duplicated parameter is
/// considered.
///
/// # Errors
///
/// Possible error codes:
/// - `STORAGE_UNAVAILABLE` - the storage failed to serve the request.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "getAllUsers",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn list(
    Extension(service): Extension<Service>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<read::user::list::Page>, Error> {
    let raw = raw_query(pairs);

    service
        .execute(query::users::List(raw))
        .await
        .map_err(AsError::into_error)
        .map(Json)
}

/// Collects a [`RawQuery`] out of the extracted query string pairs.
///
/// [`RawQuery`]: read::user::list::RawQuery
fn raw_query(
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> read::user::list::RawQuery {
    let pairs = pairs.map(|Query(pairs)| pairs).unwrap_or_else(|e| {
        log::debug!("malformed query string repaired: {e}");
        Vec::new()
    });
    read::user::list::RawQuery::from_pairs(pairs)
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
