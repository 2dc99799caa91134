//! In-process [`Database`] implementation.

use std::{collections::BTreeMap, sync::Arc};

use common::operations::{By, Delete, Insert, Select, Update};
use derive_more::{Display, Error as StdError};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    read,
};

/// In-process [`Database`] keeping [`User`]s in memory.
///
/// Clones share the same data. All mutations are performed under a single
/// write lock, so [`user::Id`] assignment is atomic and readers never observe
/// a partially applied update.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<RwLock<Users>>);

/// [`User`]s stored in a [`Memory`] database.
#[derive(Debug, Default)]
struct Users {
    /// Live [`User`]s ordered by their [`user::Id`]s, which is also their
    /// creation order.
    entries: BTreeMap<user::Id, User>,

    /// Last [`user::Id`] ever assigned.
    ///
    /// Never decreases, so deleted [`user::Id`]s are never reused.
    last_id: Option<user::Id>,
}

impl Users {
    /// Assigns the next [`user::Id`].
    fn next_id(&mut self) -> Result<user::Id, Error> {
        let id = match self.last_id {
            None => user::Id::new(1),
            Some(last) => last.next(),
        }
        .ok_or(Error::IdsExhausted)?;
        self.last_id = Some(id);
        Ok(id)
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// No more [`user::Id`]s can be assigned.
    #[display("`user::Id`s are exhausted")]
    IdsExhausted,
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.0.read().await.entries.get(&id).cloned())
    }
}

impl Database<Select<By<Vec<User>, ()>>> for Memory {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<User>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.entries.values().cloned().collect())
    }
}

impl Database<Insert<user::New>> for Memory {
    type Ok = User;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<user::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut users = self.0.write().await;

        let id = users
            .next_id()
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        let user = new.with_id(id);
        drop(users.entries.insert(id, user.clone()));

        tracing::debug!(%id, "`User` inserted");
        Ok(user)
    }
}

impl Database<Update<(user::Id, user::Changes)>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update((id, changes)): Update<(user::Id, user::Changes)>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut users = self.0.write().await;

        let Some(user) = users.entries.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply(user);

        tracing::debug!(%id, "`User` updated");
        Ok(Some(user.clone()))
    }
}

impl Database<Delete<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let removed = self.0.write().await.entries.remove(&id);

        if removed.is_some() {
            tracing::debug!(%id, "`User` deleted");
        }
        Ok(removed)
    }
}

impl Database<Select<By<read::Status, ()>>> for Memory {
    type Ok = read::Status;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::Status, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(read::Status { database: true })
    }
}
