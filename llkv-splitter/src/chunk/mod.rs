//! Packed column chunks.
//!
//! A chunk is an immutable, row-aligned slice of one column's encoded data.
//! Every chunk kind implements [`PortionChunk`]; the size and row-count
//! checks that make splitting safe live once, in
//! [`crate::split::split_chunk`], which calls the kind-specific
//! [`PortionChunk::split_impl`].
//!
//! Chunks are shared as [`ChunkRef`] (`Arc<dyn PortionChunk>`) and their
//! payloads as `bytes::Bytes`, so one parent can back any number of split
//! calls or in-flight writers without copying.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use llkv_result::{Error, Result};

use crate::address::ChunkAddress;
use crate::meta::ChunkMeta;
use crate::serialization::ColumnSerializer;
use crate::split::SplitMode;

mod array_chunk;
mod fixed_width;

pub use array_chunk::ArrayChunk;
pub use fixed_width::FixedWidthChunk;

/// Shared handle to an immutable chunk.
pub type ChunkRef = Arc<dyn PortionChunk>;

/// Capabilities every chunk kind provides.
pub trait PortionChunk: fmt::Debug + Send + Sync {
    /// Short kind name for diagnostics.
    fn kind(&self) -> &'static str;

    fn address(&self) -> ChunkAddress;

    /// Encoded payload. This is what the blob-write path persists.
    fn packed_bytes(&self) -> &Bytes;

    fn packed_size(&self) -> u64 {
        self.packed_bytes().len() as u64
    }

    fn records_count(&self) -> u64;

    /// A chunk with a single row (or none) cannot be divided further.
    fn is_splittable(&self) -> bool {
        self.records_count() > 1
    }

    /// Index statistics recorded when the chunk is persisted into a portion.
    fn build_meta(&self) -> Result<ChunkMeta>;

    /// Same payload, re-addressed to `chunk_index` on the same column.
    fn with_chunk_index(&self, chunk_index: u32) -> ChunkRef;

    /// Kind-specific split. Callers go through [`crate::split::split_chunk`],
    /// which validates the plan before and the result after this call.
    ///
    /// Implementations return pieces in row order, addressed consecutively
    /// from this chunk's index, with exactly one piece per target size plus a
    /// trailing piece in [`SplitMode::Remainder`].
    fn split_impl(
        &self,
        serializer: &dyn ColumnSerializer,
        target_sizes: &[u64],
        mode: SplitMode,
    ) -> Result<Vec<ChunkRef>>;
}

/// Address of the `offset`-th child of `parent`.
pub(crate) fn child_address(parent: ChunkAddress, offset: usize) -> Result<ChunkAddress> {
    parent.checked_offset(offset).ok_or_else(|| {
        Error::contract_violation(format!(
            "chunk index overflow addressing child {offset} of {parent}"
        ))
    })
}
