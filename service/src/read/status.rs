//! [`Status`] read model definition.

/// Availability of the [`Service`] dependencies.
///
/// [`Service`]: crate::Service
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Status {
    /// Indicator whether the [`Database`] responds.
    ///
    /// [`Database`]: crate::infra::Database
    pub database: bool,
}
