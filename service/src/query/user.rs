//! [`Query`] of a single [`User`].

use common::operations::By;

use crate::domain::{user, User};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`User`] by its [`user::Id`], resolving to [`None`] if there is
/// no such [`User`].
pub type ById = DatabaseQuery<By<Option<User>, user::Id>>;
