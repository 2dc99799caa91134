//! Read models definitions.

pub mod status;
pub mod user;

pub use self::status::Status;
