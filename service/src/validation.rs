//! Validation of raw request input, performed before touching any store.

use std::{fmt, num::IntErrorKind};

use common::PageArguments;
use derive_more::Error;
use serde::{Deserialize, Deserializer};
use smart_default::SmartDefault;

use crate::{
    command::CreateUser,
    domain::user::{self, Avatar, Email, Name},
};

/// Kind of a [`ValidationError`].
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    strum::Display,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Kind {
    /// Value cannot be parsed as an integer.
    Malformed,

    /// Value is an integer, but outside of the allowed range.
    OutOfRange,

    /// Payload field is missing or doesn't satisfy its format.
    SchemaInvalid,
}

/// Structured failure of validating raw input.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct ValidationError {
    /// [`Kind`] of this [`ValidationError`].
    pub kind: Kind,

    /// Names of the offending fields or parameters.
    pub fields: Vec<&'static str>,
}

impl ValidationError {
    /// Creates a new [`ValidationError`] of the provided [`Kind`] about the
    /// provided `fields`.
    #[must_use]
    pub fn new(
        kind: Kind,
        fields: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        Self {
            kind,
            fields: fields.into_iter().collect(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind {
            Kind::Malformed => "not an integer",
            Kind::OutOfRange => "out of range",
            Kind::SchemaInvalid => "missing or invalid",
        };
        write!(f, "`{}`: {msg}", self.fields.join("`, `"))
    }
}

/// Limits of the page size accepted in listing requests.
#[derive(Clone, Copy, Debug, Eq, PartialEq, SmartDefault)]
pub struct PageLimits {
    /// Page size used when none is requested.
    #[default(50)]
    pub default_size: usize,

    /// Maximum page size that may be requested.
    #[default(100)]
    pub max_size: usize,
}

/// Validates a raw [`user::Id`] taken from a request path.
///
/// Existence of the [`User`] is not checked.
///
/// # Errors
///
/// - [`Kind::Malformed`] if `raw` is not an integer;
/// - [`Kind::OutOfRange`] if `raw` is not positive.
///
/// [`User`]: crate::domain::User
pub fn user_id(raw: &str) -> Result<user::Id, ValidationError> {
    positive(raw)
        .and_then(|n| user::Id::new(n).ok_or(Kind::OutOfRange))
        .map_err(|kind| ValidationError::new(kind, ["id"]))
}

/// Validates raw `page` and `size` parameters of a listing request, applying
/// the defaults for the absent ones.
///
/// # Errors
///
/// - [`Kind::Malformed`] if any parameter is not an integer;
/// - [`Kind::OutOfRange`] if any parameter is not positive, or `size` exceeds
///   [`PageLimits::max_size`].
pub fn pagination(
    page: Option<&str>,
    size: Option<&str>,
    limits: PageLimits,
) -> Result<PageArguments, ValidationError> {
    let page = page.map_or(Ok(1), |raw| {
        positive(raw).and_then(|n| {
            usize::try_from(n).map_err(|_| Kind::OutOfRange)
        })
    });
    let size = size.map_or(Ok(limits.default_size), |raw| {
        positive(raw)
            .and_then(|n| usize::try_from(n).map_err(|_| Kind::OutOfRange))
            .and_then(|n| {
                if n > limits.max_size {
                    Err(Kind::OutOfRange)
                } else {
                    Ok(n)
                }
            })
    });

    match (page, size) {
        (Ok(page), Ok(size)) => PageArguments::new(page, size).ok_or_else(
            || ValidationError::new(Kind::OutOfRange, ["size"]),
        ),
        (Err(kind), Ok(_)) => Err(ValidationError::new(kind, ["page"])),
        (Ok(_), Err(kind)) => Err(ValidationError::new(kind, ["size"])),
        (Err(page), Err(size)) => {
            let kind = if page == Kind::Malformed || size == Kind::Malformed {
                Kind::Malformed
            } else {
                Kind::OutOfRange
            };
            Err(ValidationError::new(kind, ["page", "size"]))
        }
    }
}

/// Parses the provided `raw` value as a positive integer.
fn positive(raw: &str) -> Result<i64, Kind> {
    match raw.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err(Kind::OutOfRange),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                Err(Kind::OutOfRange)
            }
            _ => Err(Kind::Malformed),
        },
    }
}

/// Raw payload for creating a new [`User`].
///
/// [`User`]: crate::domain::User
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewUser {
    /// Raw [`Email`] of the new [`User`].
    ///
    /// [`User`]: crate::domain::User
    pub email: Option<String>,

    /// Raw first [`Name`] of the new [`User`].
    ///
    /// [`User`]: crate::domain::User
    pub first_name: Option<String>,

    /// Raw last [`Name`] of the new [`User`].
    ///
    /// [`User`]: crate::domain::User
    pub last_name: Option<String>,

    /// Raw [`Avatar`] of the new [`User`].
    ///
    /// [`User`]: crate::domain::User
    pub avatar: Option<String>,
}

impl NewUser {
    /// Validates this [`NewUser`] payload into a [`CreateUser`] command.
    ///
    /// # Errors
    ///
    /// [`Kind::SchemaInvalid`] naming every field being absent or not
    /// satisfying its format.
    pub fn validate(self) -> Result<CreateUser, ValidationError> {
        let Self {
            email,
            first_name,
            last_name,
            avatar,
        } = self;

        let mut invalid = Vec::new();
        let email = required(email, "email", Email::new, &mut invalid);
        let first_name =
            required(first_name, "first_name", Name::new, &mut invalid);
        let last_name =
            required(last_name, "last_name", Name::new, &mut invalid);
        let avatar = required(avatar, "avatar", Avatar::new, &mut invalid);

        match (email, first_name, last_name, avatar) {
            (Some(email), Some(first_name), Some(last_name), Some(avatar)) => {
                Ok(CreateUser {
                    email,
                    first_name,
                    last_name,
                    avatar,
                })
            }
            _ => Err(ValidationError::new(Kind::SchemaInvalid, invalid)),
        }
    }
}

/// Raw payload for partially updating an existing [`User`].
///
/// Outer [`None`] means the field is absent and stays unchanged, while inner
/// [`None`] means the field is explicitly `null`, which is never valid.
///
/// [`User`]: crate::domain::User
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    /// Raw new [`Email`] of the [`User`].
    ///
    /// [`User`]: crate::domain::User
    #[serde(deserialize_with = "present")]
    pub email: Option<Option<String>>,

    /// Raw new first [`Name`] of the [`User`].
    ///
    /// [`User`]: crate::domain::User
    #[serde(deserialize_with = "present")]
    pub first_name: Option<Option<String>>,

    /// Raw new last [`Name`] of the [`User`].
    ///
    /// [`User`]: crate::domain::User
    #[serde(deserialize_with = "present")]
    pub last_name: Option<Option<String>>,

    /// Raw new [`Avatar`] of the [`User`].
    ///
    /// [`User`]: crate::domain::User
    #[serde(deserialize_with = "present")]
    pub avatar: Option<Option<String>>,
}

impl UserPatch {
    /// Validates this [`UserPatch`] into [`user::Changes`].
    ///
    /// An empty [`UserPatch`] is valid and results in no changes.
    ///
    /// # Errors
    ///
    /// [`Kind::SchemaInvalid`] naming every present field not satisfying its
    /// format.
    pub fn validate(self) -> Result<user::Changes, ValidationError> {
        let Self {
            email,
            first_name,
            last_name,
            avatar,
        } = self;

        let mut invalid = Vec::new();
        let changes = user::Changes {
            email: optional(email, "email", Email::new, &mut invalid),
            first_name: optional(
                first_name,
                "first_name",
                Name::new,
                &mut invalid,
            ),
            last_name: optional(
                last_name,
                "last_name",
                Name::new,
                &mut invalid,
            ),
            avatar: optional(avatar, "avatar", Avatar::new, &mut invalid),
        };

        if invalid.is_empty() {
            Ok(changes)
        } else {
            Err(ValidationError::new(Kind::SchemaInvalid, invalid))
        }
    }
}

/// Parses the required `value`, recording its `name` as `invalid` if it's
/// absent or malformed.
fn required<T>(
    value: Option<String>,
    name: &'static str,
    parse: impl FnOnce(String) -> Option<T>,
    invalid: &mut Vec<&'static str>,
) -> Option<T> {
    let parsed = value.and_then(parse);
    if parsed.is_none() {
        invalid.push(name);
    }
    parsed
}

/// Parses the optional `value`, recording its `name` as `invalid` if it's
/// present but `null` or malformed.
fn optional<T>(
    value: Option<Option<String>>,
    name: &'static str,
    parse: impl FnOnce(String) -> Option<T>,
    invalid: &mut Vec<&'static str>,
) -> Option<T> {
    value.and_then(|v| required(v, name, parse, invalid))
}

/// Deserializes a field distinguishing its absence from an explicit `null`.
fn present<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

#[cfg(test)]
mod spec {
    use super::{pagination, user_id, Kind, NewUser, PageLimits, UserPatch};

    fn new_user() -> NewUser {
        NewUser {
            email: Some("ivan@example.com".into()),
            first_name: Some("Ivan".into()),
            last_name: Some("Petrov".into()),
            avatar: Some("https://example.com/ivan.png".into()),
        }
    }

    #[test]
    fn accepts_positive_ids() {
        assert_eq!(i64::from(user_id("1").unwrap()), 1);
        assert_eq!(i64::from(user_id("42").unwrap()), 42);
        assert_eq!(
            i64::from(user_id("9223372036854775807").unwrap()),
            i64::MAX,
        );
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in ["text", "", "1.5", "1e3", " 1", "0x10", "--1"] {
            let err = user_id(raw).unwrap_err();
            assert_eq!(err.kind, Kind::Malformed, "raw: {raw:?}");
            assert_eq!(err.fields, vec!["id"]);
        }
    }

    #[test]
    fn rejects_out_of_range_ids() {
        for raw in [
            "0",
            "-1",
            "-100",
            "9223372036854775808",
            "-99999999999999999999",
        ] {
            let err = user_id(raw).unwrap_err();
            assert_eq!(err.kind, Kind::OutOfRange, "raw: {raw:?}");
            assert_eq!(err.fields, vec!["id"]);
        }
    }

    #[test]
    fn pagination_defaults() {
        let args = pagination(None, None, PageLimits::default()).unwrap();

        assert_eq!(args.page(), 1);
        assert_eq!(args.size(), 50);
    }

    #[test]
    fn pagination_explicit() {
        let args =
            pagination(Some("3"), Some("12"), PageLimits::default()).unwrap();

        assert_eq!(args.page(), 3);
        assert_eq!(args.size(), 12);

        let args =
            pagination(None, Some("100"), PageLimits::default()).unwrap();
        assert_eq!(args.size(), 100);
    }

    #[test]
    fn pagination_rejects_invalid() {
        let limits = PageLimits::default();

        let err = pagination(Some("0"), None, limits).unwrap_err();
        assert_eq!(err.kind, Kind::OutOfRange);
        assert_eq!(err.fields, vec!["page"]);

        let err = pagination(None, Some("abc"), limits).unwrap_err();
        assert_eq!(err.kind, Kind::Malformed);
        assert_eq!(err.fields, vec!["size"]);

        let err = pagination(None, Some("101"), limits).unwrap_err();
        assert_eq!(err.kind, Kind::OutOfRange);
        assert_eq!(err.fields, vec!["size"]);

        let err = pagination(Some("-1"), Some("x"), limits).unwrap_err();
        assert_eq!(err.kind, Kind::Malformed);
        assert_eq!(err.fields, vec!["page", "size"]);

        let err = pagination(Some("-1"), Some("0"), limits).unwrap_err();
        assert_eq!(err.kind, Kind::OutOfRange);
        assert_eq!(err.fields, vec!["page", "size"]);
    }

    #[test]
    fn pagination_respects_custom_limits() {
        let limits = PageLimits {
            default_size: 5,
            max_size: 10,
        };

        assert_eq!(pagination(None, None, limits).unwrap().size(), 5);
        assert!(pagination(None, Some("10"), limits).is_ok());
        assert!(pagination(None, Some("11"), limits).is_err());
    }

    #[test]
    fn accepts_valid_new_user() {
        let cmd = new_user().validate().unwrap();

        assert_eq!(cmd.email.to_string(), "ivan@example.com");
        assert_eq!(cmd.first_name.to_string(), "Ivan");
        assert_eq!(cmd.last_name.to_string(), "Petrov");
        assert_eq!(cmd.avatar.to_string(), "https://example.com/ivan.png");
    }

    #[test]
    fn names_missing_new_user_fields() {
        let err = NewUser::default().validate().unwrap_err();

        assert_eq!(err.kind, Kind::SchemaInvalid);
        assert_eq!(
            err.fields,
            vec!["email", "first_name", "last_name", "avatar"],
        );
    }

    #[test]
    fn names_invalid_new_user_fields() {
        let err = NewUser {
            email: Some("not-an-email".into()),
            avatar: Some("not a url".into()),
            ..new_user()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.kind, Kind::SchemaInvalid);
        assert_eq!(err.fields, vec!["email", "avatar"]);

        let err = NewUser {
            last_name: Some(String::new()),
            ..new_user()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.fields, vec!["last_name"]);
    }

    #[test]
    fn empty_patch_is_noop() {
        let changes = UserPatch::default().validate().unwrap();

        assert!(changes.is_empty());
    }

    #[test]
    fn patch_validates_present_fields_only() {
        let changes = UserPatch {
            email: Some(Some("updated_mail@test.ru".into())),
            ..UserPatch::default()
        }
        .validate()
        .unwrap();

        assert_eq!(
            changes.email.map(|e| e.to_string()).as_deref(),
            Some("updated_mail@test.ru"),
        );
        assert!(changes.first_name.is_none());
        assert!(changes.last_name.is_none());
        assert!(changes.avatar.is_none());
    }

    #[test]
    fn patch_rejects_invalid_and_null_fields() {
        let err = UserPatch {
            first_name: Some(Some("  ".into())),
            avatar: Some(None),
            ..UserPatch::default()
        }
        .validate()
        .unwrap_err();

        assert_eq!(err.kind, Kind::SchemaInvalid);
        assert_eq!(err.fields, vec!["first_name", "avatar"]);
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let patch: UserPatch =
            serde_json::from_str(r#"{"email": null, "last_name": "New"}"#)
                .unwrap();

        assert_eq!(patch.email, Some(None));
        assert_eq!(patch.first_name, None);
        assert_eq!(patch.last_name, Some(Some("New".into())));
        assert_eq!(patch.avatar, None);
    }

    #[test]
    fn displays_offending_fields() {
        let err = NewUser {
            email: None,
            avatar: None,
            ..new_user()
        }
        .validate()
        .unwrap_err();

        assert_eq!(err.to_string(), "`email`, `avatar`: missing or invalid");
        assert_eq!(err.kind.to_string(), "SCHEMA_INVALID");
    }
}
