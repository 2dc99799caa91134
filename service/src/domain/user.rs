//! [`User`] definitions.

use std::{str::FromStr, sync::LazyLock};

use derive_more::{AsRef, Display, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::Serialize;
use url::Url;

/// Entry of the user directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Email`] of this [`User`].
    pub email: Email,

    /// First [`Name`] of this [`User`].
    pub first_name: Name,

    /// Last [`Name`] of this [`User`].
    pub last_name: Name,

    /// [`Avatar`] of this [`User`].
    pub avatar: Avatar,
}

/// [`User`] not yet stored, so having no [`Id`] assigned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct New {
    /// [`Email`] of the new [`User`].
    pub email: Email,

    /// First [`Name`] of the new [`User`].
    pub first_name: Name,

    /// Last [`Name`] of the new [`User`].
    pub last_name: Name,

    /// [`Avatar`] of the new [`User`].
    pub avatar: Avatar,
}

impl New {
    /// Turns this [`New`] user into a [`User`] with the assigned [`Id`].
    #[must_use]
    pub fn with_id(self, id: Id) -> User {
        let Self {
            email,
            first_name,
            last_name,
            avatar,
        } = self;

        User {
            id,
            email,
            first_name,
            last_name,
            avatar,
        }
    }
}

/// Partial update of a [`User`].
///
/// Only the fields being [`Some`] are applied.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Changes {
    /// New [`Email`] of the [`User`].
    pub email: Option<Email>,

    /// New first [`Name`] of the [`User`].
    pub first_name: Option<Name>,

    /// New last [`Name`] of the [`User`].
    pub last_name: Option<Name>,

    /// New [`Avatar`] of the [`User`].
    pub avatar: Option<Avatar>,
}

impl Changes {
    /// Indicates whether these [`Changes`] change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let Self {
            email,
            first_name,
            last_name,
            avatar,
        } = self;

        email.is_none()
            && first_name.is_none()
            && last_name.is_none()
            && avatar.is_none()
    }

    /// Applies these [`Changes`] to the provided [`User`].
    pub fn apply(self, user: &mut User) {
        let Self {
            email,
            first_name,
            last_name,
            avatar,
        } = self;

        if let Some(email) = email {
            user.email = email;
        }
        if let Some(name) = first_name {
            user.first_name = name;
        }
        if let Some(name) = last_name {
            user.last_name = name;
        }
        if let Some(avatar) = avatar {
            user.avatar = avatar;
        }
    }
}

/// ID of a [`User`].
///
/// Always positive.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Id(i64);

impl Id {
    /// Creates a new [`Id`] if the given `id` is positive.
    #[must_use]
    pub fn new(id: i64) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    /// Returns the [`Id`] following this one.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

/// Name of a [`User`] (either first or last one).
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    /// Maximum number of characters in a [`Name`].
    pub const MAX_LEN: usize = 512;

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        !name.trim().is_empty() && name.chars().count() <= Self::MAX_LEN
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Email address of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an [`Email`] address.
    pub const MAX_LEN: usize = 254;

    /// Minimum length of an [`Email`] address (`a@b.c`).
    pub const MIN_LEN: usize = 5;

    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format:
        /// - local part of atoms separated by single dots;
        /// - domain of dot-separated labels, at least two of them;
        /// - labels neither start nor end with a hyphen.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(concat!(
                r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+",
                r"(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*",
                r"@",
                r"(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+",
                r"[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$",
            ))
            .expect("valid regex")
        });

        let address = address.as_ref();
        (Self::MIN_LEN..=Self::MAX_LEN).contains(&address.len())
            && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Absolute URL of a [`User`]'s avatar image.
///
/// Kept exactly as provided, without normalization.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Avatar(String);

impl Avatar {
    /// Maximum length of an [`Avatar`] URL.
    pub const MAX_LEN: usize = 2083;

    /// Creates a new [`Avatar`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`Avatar`].
    fn check(url: impl AsRef<str>) -> bool {
        let url = url.as_ref();
        if url.len() > Self::MAX_LEN || url.trim() != url {
            return false;
        }
        Url::parse(url).is_ok_and(|u| {
            matches!(u.scheme(), "http" | "https") && u.has_host()
        })
    }
}

impl FromStr for Avatar {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Avatar`")
    }
}
