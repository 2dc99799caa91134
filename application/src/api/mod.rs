//! HTTP API definitions.

pub mod status;
pub mod user;

use axum::{routing::get, Extension, Router};

use crate::Service;

pub use self::{status::Status, user::User};

/// Path prefixes the users collection is served under.
pub const USERS_PREFIXES: [&str; 2] = ["/users", "/api/users"];

/// Builds the [`Router`] serving the HTTP API of the provided [`Service`].
///
/// The users collection is served under each of [`USERS_PREFIXES`], both with
/// and without a trailing slash.
pub fn router(service: Service) -> Router {
    USERS_PREFIXES
        .into_iter()
        .fold(Router::new(), |router, prefix| {
            router
                .route(prefix, get(user::list).post(user::create))
                .route(
                    &format!("{prefix}/"),
                    get(user::list).post(user::create),
                )
                .route(
                    &format!("{prefix}/:id"),
                    get(user::get).patch(user::update).delete(user::delete),
                )
        })
        .route("/status", get(status::get))
        .layer(Extension(service))
}
