//! Seeding of the user directory at startup.

use std::{io, path::Path};

use derive_more::{Display, Error as StdError, From};
use service::{
    command::{self, CreateUser},
    infra::database,
    query, read,
    validation::{NewUser, ValidationError},
    Command as _,
};
use tracerr::Traced;

use crate::Service;

/// Error of seeding the user directory.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Failed to read the seed file.
    #[display("failed to read seed file: {_0}")]
    Io(io::Error),

    /// Seed file is not a JSON array of objects.
    #[display("seed file is not a JSON array of users: {_0}")]
    Json(serde_json::Error),

    /// A record of the seed file is invalid.
    #[display("seed record #{index} is invalid: {error}")]
    #[from(ignore)]
    Invalid {
        /// 0-based index of the invalid record.
        index: usize,

        /// [`ValidationError`] of the record.
        error: ValidationError,
    },

    /// Failed to check whether the user directory is empty.
    #[display("failed to count existing users: {_0}")]
    Count(Traced<database::Error>),

    /// Failed to create a seeded user.
    #[display("failed to create seeded user: {_0}")]
    Create(Traced<command::create_user::ExecutionError>),
}

/// Parses and validates the provided `json` array of users.
///
/// IDs present in the records are ignored.
///
/// # Errors
///
/// If `json` is not an array of objects, or any of its records is invalid.
pub fn parse(json: &str) -> Result<Vec<CreateUser>, Error> {
    serde_json::from_str::<Vec<NewUser>>(json)?
        .into_iter()
        .enumerate()
        .map(|(index, user)| {
            user.validate()
                .map_err(|error| Error::Invalid { index, error })
        })
        .collect()
}

/// Creates the users listed in the seed file at the provided `path`, in the
/// file order, unless the user directory already has users.
///
/// Returns the number of created users.
///
/// # Errors
///
/// If the file cannot be read or parsed, or any user fails to be created.
pub async fn run(
    service: &Service,
    path: impl AsRef<Path>,
) -> Result<usize, Error> {
    let json = tokio::fs::read_to_string(path).await?;
    apply(service, parse(&json)?).await
}

/// Creates the provided `users` in their order, unless the user directory
/// already has users.
///
/// Returns the number of created users, which is `0` for a non-empty
/// directory.
///
/// # Errors
///
/// If the existing users cannot be counted, or any user fails to be created.
pub async fn apply(
    service: &Service,
    users: Vec<CreateUser>,
) -> Result<usize, Error> {
    let Some(first) = read::user::list::Arguments::new(1, 1) else {
        unreachable!("`1` is positive")
    };
    let existing = service
        .execute(query::users::List(first))
        .await
        .map_err(Error::Count)?
        .total;
    if existing > 0 {
        tracing::info!(existing, "`User`s already present, skipping seeding");
        return Ok(0);
    }

    let count = users.len();
    for cmd in users {
        let user = service.execute(cmd).await?;
        tracing::debug!(id = %user.id, "seeded `User`");
    }
    Ok(count)
}
