//! Resource identity and identity-set constraints.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::actions::WILDCARD;
use crate::error::IdentityParseError;

const ID_LEN: usize = 12;

/// A 12-byte object identifier.
///
/// Parsed from either its 24-character hex form (any case) or a raw
/// 12-byte string. Comparison is structural.
///
/// # Example
///
/// ```
/// use platform_policy::identity::ResourceId;
///
/// let a = ResourceId::parse("65a1b2c3d4e5f60718293a4b").unwrap();
/// let b = ResourceId::parse("65A1B2C3D4E5F60718293A4B").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "65a1b2c3d4e5f60718293a4b");
///
/// assert!(ResourceId::parse("42").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId([u8; ID_LEN]);

impl ResourceId {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse an identifier string.
    pub fn parse(s: &str) -> Result<Self, IdentityParseError> {
        let mut bytes = [0u8; ID_LEN];
        match s.len() {
            len if len == ID_LEN * 2 => {
                hex::decode_to_slice(s, &mut bytes)
                    .map_err(|_| IdentityParseError(s.to_string()))?;
            }
            ID_LEN => bytes.copy_from_slice(s.as_bytes()),
            _ => return Err(IdentityParseError(s.to_string())),
        }
        Ok(Self(bytes))
    }

    /// Get the raw bytes.
    pub fn bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for ResourceId {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Which resource instances a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResourceConstraint {
    /// Any resource (the policy listed `*`).
    #[default]
    Unconstrained,
    /// Only resources whose identity is in the set.
    Only(HashSet<ResourceId>),
}

impl ResourceConstraint {
    /// Build the constraint from a policy's `resources` list.
    ///
    /// A `*` anywhere in the list makes the constraint unconstrained.
    /// Otherwise every entry must parse; the first failure is returned and
    /// no partial set is built.
    pub fn from_resources<S: AsRef<str>>(resources: &[S]) -> Result<Self, IdentityParseError> {
        if resources.iter().any(|r| r.as_ref() == WILDCARD) {
            return Ok(Self::Unconstrained);
        }

        resources
            .iter()
            .map(|r| ResourceId::parse(r.as_ref()))
            .collect::<Result<HashSet<_>, _>>()
            .map(Self::Only)
    }

    /// Check whether a resource identity satisfies the constraint.
    ///
    /// `None` (missing or unparseable identity) only satisfies
    /// [`ResourceConstraint::Unconstrained`].
    pub fn admits(&self, id: Option<&ResourceId>) -> bool {
        match (self, id) {
            (Self::Unconstrained, _) => true,
            (Self::Only(ids), Some(id)) => ids.contains(id),
            (Self::Only(_), None) => false,
        }
    }

    /// Check if this is the unconstrained variant.
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Self::Unconstrained)
    }
}
