//! [`Handler`] abstractions.

use std::future::Future;

/// Something executing an operation described by `Args`.
///
/// Store operations, service queries and service commands are all
/// [`Handler`]s, differing only in their `Args` type.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes the operation described by the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
