//! [`User`] read model definition.
//!
//! [`User`]: crate::domain::User

pub mod list {
    //! [`User`]s list definitions.

    use crate::domain::User;

    /// A [`common::Page`] of [`User`]s.
    pub type Page = common::Page<User>;

    /// Arguments for selecting a [`Page`].
    pub type Arguments = common::PageArguments;
}
