//! [`Command`] for creating a new [`User`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
///
/// The [`user::Id`] is assigned by the [`Database`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`user::Email`] of a new [`User`].
    pub email: user::Email,

    /// First [`user::Name`] of a new [`User`].
    pub first_name: user::Name,

    /// Last [`user::Name`] of a new [`User`].
    pub last_name: user::Name,

    /// [`user::Avatar`] of a new [`User`].
    pub avatar: user::Avatar,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: Database<
        Insert<user::New>,
        Ok = User,
        Err = Traced<database::Error>,
    >,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            email,
            first_name,
            last_name,
            avatar,
        } = cmd;

        self.database()
            .execute(Insert(user::New {
                email,
                first_name,
                last_name,
                avatar,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
