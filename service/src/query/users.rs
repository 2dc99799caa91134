//! [`Query`] collection related to the multiple [`User`]s.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::User,
    infra::{database, Database},
    read, Service,
};

use super::Query;

/// Queries a [`read::user::list::Page`] of [`User`]s ordered by their IDs.
#[derive(Clone, Copy, Debug)]
pub struct List(pub read::user::list::Arguments);

impl<Db> Query<List> for Service<Db>
where
    Db: Database<
        Select<By<Vec<User>, ()>>,
        Ok = Vec<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = read::user::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        List(args): List,
    ) -> Result<Self::Ok, Self::Err> {
        let all = self
            .database()
            .execute(Select(By::<Vec<User>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::user::list::Page::new(all, args))
    }
}
