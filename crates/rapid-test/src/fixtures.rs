//! Rows carry a little-endian `u32` id in their first four bytes and a fill
//! byte in the rest, so a row can be recognized after any number of copies.

use rapid_common::RelationKey;
use rapid_storage::{MemRelation, StorageResult};

/// Row length used by the fixtures.
pub const FIXTURE_ROW_LENGTH: usize = 16;

/// Encodes `id` into a row of `row_length` bytes (at least four).
pub fn encode_row(id: u32, row_length: usize) -> Vec<u8> {
    let mut row = vec![(id % 251) as u8; row_length];
    row[..4].copy_from_slice(&id.to_le_bytes());
    row
}

/// Returns the id stored in `row`.
pub fn decode_id(row: &[u8]) -> u32 {
    let mut id = [0u8; 4];
    id.copy_from_slice(&row[..4]);
    u32::from_le_bytes(id)
}

/// Creates `test.<name>` holding rows with ids `0..count`.
pub fn numbered_relation(name: &str, count: u32) -> StorageResult<MemRelation> {
    MemRelation::with_rows(
        RelationKey::new("test", name),
        FIXTURE_ROW_LENGTH,
        (0..count).map(|id| encode_row(id, FIXTURE_ROW_LENGTH)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapid_storage::Relation;

    #[test]
    fn test_encode_decode() {
        let row = encode_row(70_000, 8);
        assert_eq!(row.len(), 8);
        assert_eq!(decode_id(&row), 70_000);
    }

    #[test]
    fn test_numbered_relation() {
        let relation = numbered_relation("dim", 5).unwrap();
        assert_eq!(relation.live_rows(), 5);
        assert_eq!(relation.descriptor().estimated_rows(), 5);
        assert_eq!(relation.descriptor().row_length(), FIXTURE_ROW_LENGTH);
    }
}
