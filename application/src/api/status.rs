//! [`Status`]-related definitions.

use axum::{Extension, Json};
use serde::Serialize;
use service::{query, read, Query as _};

use crate::{AsError, Error, Service};

/// Availability of the server dependencies.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Status {
    /// Indicator whether the database responds.
    pub database: bool,
}

impl From<read::Status> for Status {
    fn from(status: read::Status) -> Self {
        let read::Status { database } = status;
        Self { database }
    }
}

/// Reports the [`Status`] of the server dependencies.
#[tracing::instrument(skip_all, fields(otel.name = "getStatus"))]
pub async fn get(
    Extension(service): Extension<Service>,
) -> Result<Json<Status>, Error> {
    service
        .execute(query::Status::by(()))
        .await
        .map(|status| Json(status.into()))
        .map_err(AsError::into_error)
}
