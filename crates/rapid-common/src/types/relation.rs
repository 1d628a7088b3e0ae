//! Relation identity.
//!
//! A relation is identified by its schema-qualified name. The key is what the
//! snapshot cache stores entries under, so callers must keep it stable and
//! collision-free for the lifetime of a cache instance.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::RELATION_KEY_SEPARATOR;
use crate::error::RapidError;

/// Schema-qualified relation name, rendered as `schema.relation`.
///
/// # Example
///
/// ```rust
/// use rapid_common::types::RelationKey;
///
/// let key = RelationKey::new("sales", "region");
/// assert_eq!(key.to_string(), "sales.region");
/// assert_eq!("sales.region".parse::<RelationKey>().unwrap(), key);
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationKey {
    schema: String,
    relation: String,
}

impl RelationKey {
    /// Creates a key from its schema and relation parts.
    #[must_use]
    pub fn new(schema: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            relation: relation.into(),
        }
    }

    /// Returns the schema part.
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns the relation part.
    #[inline]
    #[must_use]
    pub fn relation(&self) -> &str {
        &self.relation
    }
}

impl FromStr for RelationKey {
    type Err = RapidError;

    /// Parses `schema.relation`. The split happens at the first separator,
    /// so relation names may themselves contain dots.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(RELATION_KEY_SEPARATOR) {
            Some((schema, relation)) if !schema.is_empty() && !relation.is_empty() => {
                Ok(Self::new(schema, relation))
            }
            _ => Err(RapidError::InvalidRelationKey { key: s.to_string() }),
        }
    }
}

impl fmt::Debug for RelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RelationKey({self})")
    }
}

impl fmt::Display for RelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.schema, RELATION_KEY_SEPARATOR, self.relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let key = RelationKey::new("tpch", "nation");
        assert_eq!(key.to_string(), "tpch.nation");

        let parsed: RelationKey = "tpch.nation".parse().unwrap();
        assert_eq!(parsed, key);
        assert_eq!(parsed.schema(), "tpch");
        assert_eq!(parsed.relation(), "nation");
    }

    #[test]
    fn test_parse_splits_at_first_separator() {
        let key: RelationKey = "db.tbl.part".parse().unwrap();
        assert_eq!(key.schema(), "db");
        assert_eq!(key.relation(), "tbl.part");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("nation".parse::<RelationKey>().is_err());
        assert!(".nation".parse::<RelationKey>().is_err());
        assert!("tpch.".parse::<RelationKey>().is_err());
    }

    #[test]
    fn test_debug_format() {
        let key = RelationKey::new("a", "b");
        assert_eq!(format!("{key:?}"), "RelationKey(a.b)");
    }
}
