//! Join kinds.

use std::fmt;

/// Join kind of a nested-loop join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    /// Inner join - only outer rows with at least one inner row.
    Inner,
    /// Left outer join - every outer row, null-extended when unmatched.
    LeftOuter,
}

impl JoinType {
    /// Returns true if unmatched outer rows are emitted null-extended.
    #[inline]
    pub fn is_outer(self) -> bool {
        matches!(self, JoinType::LeftOuter)
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER JOIN"),
            JoinType::LeftOuter => write!(f, "LEFT JOIN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_outer() {
        assert!(!JoinType::Inner.is_outer());
        assert!(JoinType::LeftOuter.is_outer());
        assert_eq!(JoinType::LeftOuter.to_string(), "LEFT JOIN");
    }
}
