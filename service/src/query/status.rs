//! [`Query`] of the [`Service`] dependencies availability.
//!
//! [`Service`]: crate::Service

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries the [`read::Status`] of the [`Service`] dependencies.
///
/// [`Service`]: crate::Service
pub type Status = DatabaseQuery<By<read::Status, ()>>;
