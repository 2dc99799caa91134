//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection as _, Postgres},
        Database,
    },
};

/// Columns selected to build a [`User`] from a [`Row`].
const COLUMNS: &str = "id, email, first_name, last_name, avatar";

/// Builds a [`User`] from the provided [`Row`] containing [`COLUMNS`].
fn user_from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        avatar: row.get("avatar"),
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Postgres {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE id = $1::INT8",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(user_from_row))
    }
}

impl Database<Select<By<Vec<User>, ()>>> for Postgres {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<User>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             ORDER BY id ASC",
        );
        Ok(self
            .query(sql.as_str(), &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(user_from_row)
            .collect())
    }
}

impl Database<Insert<user::New>> for Postgres {
    type Ok = User;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<user::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::New {
            email,
            first_name,
            last_name,
            avatar,
        } = &new;

        const SQL: &str = "\
            INSERT INTO users (email, first_name, last_name, avatar) \
            VALUES ($1::VARCHAR, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR) \
            RETURNING id";
        let row = self
            .query(SQL, &[email, first_name, last_name, avatar])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .next()
            .expect("`INSERT ... RETURNING` always returns a row");
        let id: user::Id = row.get("id");

        tracing::debug!(%id, "`User` inserted");
        Ok(new.with_id(id))
    }
}

impl Database<Update<(user::Id, user::Changes)>> for Postgres {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update((id, changes)): Update<(user::Id, user::Changes)>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::Changes {
            email,
            first_name,
            last_name,
            avatar,
        } = changes;

        // Absent fields are passed as `NULL` and keep their current values.
        let sql = format!(
            "UPDATE users \
             SET email = COALESCE($2::VARCHAR, email), \
                 first_name = COALESCE($3::VARCHAR, first_name), \
                 last_name = COALESCE($4::VARCHAR, last_name), \
                 avatar = COALESCE($5::VARCHAR, avatar) \
             WHERE id = $1::INT8 \
             RETURNING {COLUMNS}",
        );
        let user = self
            .query_opt(
                sql.as_str(),
                &[&id, &email, &first_name, &last_name, &avatar],
            )
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(user_from_row);

        if user.is_some() {
            tracing::debug!(%id, "`User` updated");
        }
        Ok(user)
    }
}

impl Database<Delete<By<Option<User>, user::Id>>> for Postgres {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: user::Id = by.into_inner();

        let sql = format!(
            "DELETE FROM users \
             WHERE id = $1::INT8 \
             RETURNING {COLUMNS}",
        );
        let user = self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(user_from_row);

        if user.is_some() {
            tracing::debug!(%id, "`User` deleted");
        }
        Ok(user)
    }
}
