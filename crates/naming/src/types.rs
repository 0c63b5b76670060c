//! Identifier and value types shared by naming-service clients.
//!
//! Keygroups are addressed by a three-segment [`KeygroupId`]
//! (`app/tenant/group`); nodes and clients by opaque string identifiers.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Macro to define a newtype wrapper around `String` with standard trait
/// implementations.
///
/// Each generated type:
/// - Is a transparent wrapper around `String`
/// - Derives `Clone`, `Debug`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Serializes as the bare string
/// - Implements `From<String>`, `From<&str>` and `Display`
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps the given string without further validation.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a client registered at the naming service.
    ///
    /// Equality is exact string match. The naming service validated the
    /// identifier when the client was registered, so no checks happen here.
    ///
    /// # Examples
    ///
    /// ```
    /// use fogbase_naming::ClientId;
    ///
    /// let client = ClientId::new("C1");
    /// assert_eq!(client.as_str(), "C1");
    /// assert_eq!(client, ClientId::from("C1"));
    /// ```
    ClientId
);

define_id!(
    /// Identifier of a node registered at the naming service.
    ///
    /// The same node identifier is used for replica and trigger membership.
    ///
    /// # Examples
    ///
    /// ```
    /// use fogbase_naming::NodeId;
    ///
    /// let node = NodeId::from("N2");
    /// assert_eq!(node.to_string(), "N2");
    /// ```
    NodeId
);

/// Separator between the segments of a [`KeygroupId`].
pub const KEYGROUP_SEPARATOR: char = '/';

/// Reasons a raw string is not a valid [`KeygroupId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum KeygroupIdError {
    /// The input was empty.
    #[error("keygroup id is empty")]
    Empty,

    /// The input did not split into exactly `app/tenant/group`.
    #[error("keygroup id must have 3 segments (app/tenant/group), found {found}")]
    SegmentCount {
        /// Number of segments found.
        found: usize,
    },

    /// One of the segments was empty.
    #[error("keygroup id segment {index} is empty")]
    EmptySegment {
        /// Zero-based index of the empty segment.
        index: usize,
    },

    /// A segment was `.` or `..`, which address paths rather than names.
    #[error("keygroup id segment {index} must not be {segment:?}")]
    DotSegment {
        /// Zero-based index of the offending segment.
        index: usize,
        /// The rejected segment.
        segment: String,
    },

    /// A segment contained a character outside `[A-Za-z0-9._-]`.
    #[error("keygroup id segment {index} contains invalid character {character:?}")]
    InvalidCharacter {
        /// Zero-based index of the offending segment.
        index: usize,
        /// The rejected character.
        character: char,
    },
}

/// Namespace-qualified identifier of a keygroup.
///
/// A keygroup belongs to a tenant of an application, which gives the
/// identifier the textual form `app/tenant/group`.
///
/// # Examples
///
/// ```
/// use fogbase_naming::KeygroupId;
///
/// let id: KeygroupId = "smarthome/lights/floor1".parse()?;
/// assert_eq!(id.app(), "smarthome");
/// assert_eq!(id.tenant(), "lights");
/// assert_eq!(id.group(), "floor1");
/// assert_eq!(id.to_string(), "smarthome/lights/floor1");
///
/// assert!("smarthome/lights".parse::<KeygroupId>().is_err());
/// # Ok::<(), fogbase_naming::KeygroupIdError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawKeygroupId")]
pub struct KeygroupId {
    app: String,
    tenant: String,
    group: String,
}

/// Unvalidated wire form of a [`KeygroupId`].
#[derive(Deserialize)]
struct RawKeygroupId {
    app: String,
    tenant: String,
    group: String,
}

impl TryFrom<RawKeygroupId> for KeygroupId {
    type Error = KeygroupIdError;

    fn try_from(raw: RawKeygroupId) -> Result<Self, Self::Error> {
        Self::new(raw.app, raw.tenant, raw.group)
    }
}

impl KeygroupId {
    /// Builds an identifier from its segments, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`KeygroupIdError`] if a segment is empty, is `.` or `..`,
    /// or contains a character outside `[A-Za-z0-9._-]`.
    pub fn new(
        app: impl Into<String>,
        tenant: impl Into<String>,
        group: impl Into<String>,
    ) -> Result<Self, KeygroupIdError> {
        let (app, tenant, group) = (app.into(), tenant.into(), group.into());
        for (index, segment) in [&app, &tenant, &group].into_iter().enumerate() {
            validate_segment(index, segment)?;
        }
        Ok(Self { app, tenant, group })
    }

    /// Returns the application segment.
    #[must_use]
    pub fn app(&self) -> &str {
        &self.app
    }

    /// Returns the tenant segment.
    #[must_use]
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Returns the group segment.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Returns the three segments in order.
    #[must_use]
    pub fn segments(&self) -> [&str; 3] {
        [&self.app, &self.tenant, &self.group]
    }
}

fn validate_segment(index: usize, segment: &str) -> Result<(), KeygroupIdError> {
    if segment.is_empty() {
        return Err(KeygroupIdError::EmptySegment { index });
    }
    if matches!(segment, "." | "..") {
        return Err(KeygroupIdError::DotSegment { index, segment: segment.to_owned() });
    }
    match segment.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))) {
        Some(character) => Err(KeygroupIdError::InvalidCharacter { index, character }),
        None => Ok(()),
    }
}

impl FromStr for KeygroupId {
    type Err = KeygroupIdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() {
            return Err(KeygroupIdError::Empty);
        }

        let segments: Vec<&str> = raw.split(KEYGROUP_SEPARATOR).collect();
        match segments.as_slice() {
            [app, tenant, group] => Self::new(*app, *tenant, *group),
            _ => Err(KeygroupIdError::SegmentCount { found: segments.len() }),
        }
    }
}

impl fmt::Display for KeygroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app, self.tenant, self.group)
    }
}

/// Wire value of [`TimeToLive::Unbounded`].
pub const UNBOUNDED_TTL: i64 = -1;

/// Lease of a replica node on a keygroup.
///
/// On the wire the lease is an integer number of seconds where
/// [`UNBOUNDED_TTL`] (any negative value when reading) means the node is
/// never evicted.
///
/// # Examples
///
/// ```
/// use fogbase_naming::TimeToLive;
///
/// assert_eq!(TimeToLive::default(), TimeToLive::Unbounded);
/// assert_eq!(i64::from(TimeToLive::Seconds(120)), 120);
/// assert_eq!(TimeToLive::from(-1), TimeToLive::Unbounded);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum TimeToLive {
    /// The node keeps its replica until it is removed explicitly.
    #[default]
    Unbounded,
    /// The node's replica lease expires after the given number of seconds.
    Seconds(u32),
}

impl TimeToLive {
    /// Returns the lease as a [`Duration`], or `None` when unbounded.
    #[must_use]
    pub fn as_duration(self) -> Option<Duration> {
        match self {
            Self::Unbounded => None,
            Self::Seconds(secs) => Some(Duration::from_secs(u64::from(secs))),
        }
    }
}

impl From<i64> for TimeToLive {
    fn from(value: i64) -> Self {
        if value < 0 {
            Self::Unbounded
        } else {
            Self::Seconds(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }
}

impl From<TimeToLive> for i64 {
    fn from(ttl: TimeToLive) -> Self {
        match ttl {
            TimeToLive::Unbounded => UNBOUNDED_TTL,
            TimeToLive::Seconds(secs) => i64::from(secs),
        }
    }
}

impl fmt::Display for TimeToLive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("unbounded"),
            Self::Seconds(secs) => write!(f, "{secs}s"),
        }
    }
}

/// Encryption algorithm selector understood by the naming service.
///
/// Keygroup data is protected with a symmetric algorithm; node and client
/// key material uses an asymmetric one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum EncryptionAlgorithm {
    /// AES with a shared secret. Default for new keygroups.
    #[default]
    #[serde(rename = "AES")]
    Aes,
    /// RSA key pairs.
    #[serde(rename = "RSA")]
    Rsa,
}

impl fmt::Display for EncryptionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aes => f.write_str("AES"),
            Self::Rsa => f.write_str("RSA"),
        }
    }
}
