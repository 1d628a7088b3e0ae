//! Fixed-length record buffers.

use super::error::{StorageError, StorageResult};

/// A source's working record buffer.
///
/// Every row source owns exactly one of these. Reads overwrite it in place,
/// and the null-row flag marks the whole record as absent, which is how an
/// outer join represents the inner side of a null-extended row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBuffer {
    data: Vec<u8>,
    null_row: bool,
}

impl RowBuffer {
    /// Creates a zeroed buffer of `len` bytes.
    pub fn new(len: usize) -> Self {
        Self {
            data: vec![0; len],
            null_row: false,
        }
    }

    /// Returns the buffer length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true for a zero-length buffer.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the record bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Returns the record bytes for writing.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Overwrites the record with `src`, which must have the same length.
    pub fn copy_from(&mut self, src: &[u8]) -> StorageResult<()> {
        if src.len() != self.data.len() {
            return Err(StorageError::BufferLength {
                expected: self.data.len(),
                actual: src.len(),
            });
        }
        self.data.copy_from_slice(src);
        Ok(())
    }

    /// Returns true if the record is marked as entirely null.
    #[inline]
    pub fn is_null_row(&self) -> bool {
        self.null_row
    }

    /// Marks or unmarks the record as entirely null.
    #[inline]
    pub fn set_null_row(&mut self, is_null: bool) {
        self.null_row = is_null;
    }

    /// Returns the record bytes, or `None` when the record is null.
    #[inline]
    pub fn row(&self) -> Option<&[u8]> {
        if self.null_row {
            None
        } else {
            Some(&self.data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_from() {
        let mut buf = RowBuffer::new(4);
        buf.copy_from(&[1, 2, 3, 4]).unwrap();
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);

        let err = buf.copy_from(&[1, 2]).unwrap_err();
        assert!(matches!(
            err,
            StorageError::BufferLength {
                expected: 4,
                actual: 2
            }
        ));
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_null_row() {
        let mut buf = RowBuffer::new(2);
        assert_eq!(buf.row(), Some(&[0u8, 0][..]));

        buf.set_null_row(true);
        assert!(buf.is_null_row());
        assert_eq!(buf.row(), None);

        buf.set_null_row(false);
        assert!(buf.row().is_some());
    }
}
