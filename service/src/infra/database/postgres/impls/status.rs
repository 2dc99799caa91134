//! [`read::Status`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{
        database::{self, postgres::Connection as _, Postgres},
        Database,
    },
    read,
};

impl Database<Select<By<read::Status, ()>>> for Postgres {
    type Ok = read::Status;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::Status, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "SELECT 1";
        let database = match self.query_opt(SQL, &[]).await {
            Ok(row) => row.is_some(),
            Err(e) => {
                tracing::warn!("`Postgres` is unavailable: {e}");
                false
            }
        };
        Ok(read::Status { database })
    }
}
