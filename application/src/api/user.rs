//! [`User`]-related definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use service::{
    command, domain, query, read,
    validation::{self, NewUser, UserPatch},
    Command as _,
};

use crate::{define_error, AsError, Error, Service};

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` does not exist"]
        NotExists,
    }
}

/// A `User` of the directory.
#[derive(Clone, Debug, Serialize)]
pub struct User {
    /// Unique identifier of this [`User`].
    pub id: domain::user::Id,

    /// Email address of this [`User`].
    pub email: domain::user::Email,

    /// First name of this [`User`].
    pub first_name: domain::user::Name,

    /// Last name of this [`User`].
    pub last_name: domain::user::Name,

    /// URL of this [`User`]'s avatar image.
    pub avatar: domain::user::Avatar,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        let domain::User {
            id,
            email,
            first_name,
            last_name,
            avatar,
        } = user;

        Self {
            id,
            email,
            first_name,
            last_name,
            avatar,
        }
    }
}

/// A page of [`User`]s.
pub type Page = common::Page<User>;

/// Raw query parameters of a [`User`]s listing request.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// Requested 1-based page number.
    pub page: Option<String>,

    /// Requested page size.
    pub size: Option<String>,
}

/// Outcome of a successful [`User`] deletion.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Deleted {
    /// Always `true`.
    pub ok: bool,
}

/// Validates the raw [`domain::user::Id`] taken from the request path.
fn user_id(
    path: Result<Path<String>, PathRejection>,
) -> Result<domain::user::Id, Error> {
    let Path(raw) = path.map_err(AsError::into_error)?;
    let id = validation::user_id(&raw).map_err(AsError::into_error)?;
    _ = tracing::Span::current().record("user.id", tracing::field::display(id));
    Ok(id)
}

/// Returns the [`User`] with the requested ID.
///
/// # Errors
///
/// - `MALFORMED`/`OUT_OF_RANGE` - the ID is not a positive integer;
/// - `USER_NOT_EXISTS` - no `User` has the ID.
#[tracing::instrument(
    skip_all,
    fields(otel.name = "getUser", user.id = tracing::field::Empty),
)]
pub async fn get(
    Extension(service): Extension<Service>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<User>, Error> {
    let id = user_id(path)?;

    service
        .execute(query::user::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|user| Json(user.into()))
        .ok_or_else(|| UserError::NotExists.into())
}

/// Returns the requested [`Page`] of [`User`]s ordered by their IDs.
///
/// A page past the last one has no items and is not an error.
///
/// # Errors
///
/// `MALFORMED`/`OUT_OF_RANGE` - `page` or `size` is not a positive integer, or
/// `size` exceeds the configured maximum.
#[tracing::instrument(
    skip_all,
    fields(
        otel.name = "listUsers",
        page = tracing::field::Empty,
        size = tracing::field::Empty,
    ),
)]
pub async fn list(
    Extension(service): Extension<Service>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page>, Error> {
    let Query(ListParams { page, size }) =
        params.map_err(AsError::into_error)?;
    let args = validation::pagination(
        page.as_deref(),
        size.as_deref(),
        service.config().pagination,
    )
    .map_err(AsError::into_error)?;

    let span = tracing::Span::current();
    _ = span.record("page", args.page());
    _ = span.record("size", args.size());

    service
        .execute(query::users::List(args))
        .await
        .map(|page: read::user::list::Page| Json(page.map(User::from)))
        .map_err(AsError::into_error)
}

/// Creates a new [`User`] from the provided payload.
///
/// # Errors
///
/// `SCHEMA_INVALID` - the payload is not a JSON object, or any of its fields is
/// missing or invalid.
#[tracing::instrument(
    skip_all,
    fields(otel.name = "createUser", user.id = tracing::field::Empty),
)]
pub async fn create(
    Extension(service): Extension<Service>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(http::StatusCode, Json<User>), Error> {
    let Json(new) = payload.map_err(AsError::into_error)?;
    let cmd = new.validate().map_err(AsError::into_error)?;

    let user = service
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;
    _ = tracing::Span::current()
        .record("user.id", tracing::field::display(user.id));

    Ok((http::StatusCode::CREATED, Json(user.into())))
}

/// Partially updates the [`User`] with the requested ID.
///
/// Only the fields present in the payload are changed.
///
/// # Errors
///
/// - `MALFORMED`/`OUT_OF_RANGE` - the ID is not a positive integer;
/// - `SCHEMA_INVALID` - the payload is not a JSON object, or any of its
///   present fields is `null` or invalid;
/// - `USER_NOT_EXISTS` - no `User` has the ID.
#[tracing::instrument(
    skip_all,
    fields(otel.name = "updateUser", user.id = tracing::field::Empty),
)]
pub async fn update(
    Extension(service): Extension<Service>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<User>, Error> {
    let user_id = user_id(path)?;
    let Json(patch) = payload.map_err(AsError::into_error)?;
    let changes = patch.validate().map_err(AsError::into_error)?;

    service
        .execute(command::UpdateUser { user_id, changes })
        .await
        .map(|user| Json(user.into()))
        .map_err(AsError::into_error)
}

/// Deletes the [`User`] with the requested ID.
///
/// # Errors
///
/// - `MALFORMED`/`OUT_OF_RANGE` - the ID is not a positive integer;
/// - `USER_NOT_EXISTS` - no `User` has the ID, unless deletion is configured
///   to be idempotent.
#[tracing::instrument(
    skip_all,
    fields(otel.name = "deleteUser", user.id = tracing::field::Empty),
)]
pub async fn delete(
    Extension(service): Extension<Service>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Deleted>, Error> {
    let user_id = user_id(path)?;

    service
        .execute(command::DeleteUser { user_id })
        .await
        .map(|_| Json(Deleted { ok: true }))
        .map_err(AsError::into_error)
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}
