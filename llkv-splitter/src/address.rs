//! Chunk addressing within a portion.

use std::fmt;

/// Identifier of a column within a portion.
///
/// Matches the width of the field id used by the column store, so addresses
/// can be built directly from catalog field ids.
pub type FieldId = u32;

/// Position of a chunk: the column it belongs to and its ordinal among that
/// column's chunks in the owning portion.
///
/// Addresses order by `(column_id, chunk_index)`. Within one column the
/// ordinal follows row order, so sorting a column's records by address yields
/// the order in which their rows must be concatenated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkAddress {
    pub column_id: FieldId,
    pub chunk_index: u32,
}

impl ChunkAddress {
    #[inline]
    pub const fn new(column_id: FieldId, chunk_index: u32) -> Self {
        Self {
            column_id,
            chunk_index,
        }
    }

    /// Same column, different ordinal.
    #[inline]
    pub const fn with_chunk_index(self, chunk_index: u32) -> Self {
        Self {
            column_id: self.column_id,
            chunk_index,
        }
    }

    /// Address `offset` positions after this one, or `None` on overflow.
    #[inline]
    pub fn checked_offset(self, offset: usize) -> Option<Self> {
        let offset = u32::try_from(offset).ok()?;
        let chunk_index = self.chunk_index.checked_add(offset)?;
        Some(self.with_chunk_index(chunk_index))
    }
}

impl fmt::Display for ChunkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "col={} chunk={}", self.column_id, self.chunk_index)
    }
}
