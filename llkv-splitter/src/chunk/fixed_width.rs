use std::sync::Arc;

use bytes::Bytes;
use llkv_result::{Error, Result};

use super::{ChunkRef, PortionChunk, child_address};
use crate::address::ChunkAddress;
use crate::meta::ChunkMeta;
use crate::serialization::ColumnSerializer;
use crate::split::{RowOffsets, SplitMode, plan_row_ranges};

/// Opaque rows of a constant encoded width.
///
/// Splits are zero-copy: each piece is a `Bytes` slice of the parent payload.
#[derive(Clone, Debug)]
pub struct FixedWidthChunk {
    address: ChunkAddress,
    row_width: u64,
    packed: Bytes,
}

impl FixedWidthChunk {
    pub fn new(address: ChunkAddress, row_width: u64, packed: Bytes) -> Result<Self> {
        if row_width == 0 {
            return Err(Error::invalid_argument("row_width must be non-zero"));
        }
        if packed.len() as u64 % row_width != 0 {
            return Err(Error::invalid_argument(format!(
                "payload of {} bytes is not a multiple of row width {row_width}",
                packed.len()
            )));
        }
        Ok(Self {
            address,
            row_width,
            packed,
        })
    }

    pub fn row_width(&self) -> u64 {
        self.row_width
    }
}

impl PortionChunk for FixedWidthChunk {
    fn kind(&self) -> &'static str {
        "fixed_width"
    }

    fn address(&self) -> ChunkAddress {
        self.address
    }

    fn packed_bytes(&self) -> &Bytes {
        &self.packed
    }

    fn records_count(&self) -> u64 {
        self.packed.len() as u64 / self.row_width
    }

    fn build_meta(&self) -> Result<ChunkMeta> {
        Ok(ChunkMeta::simple(self.records_count(), self.packed_size()))
    }

    fn with_chunk_index(&self, chunk_index: u32) -> ChunkRef {
        Arc::new(Self {
            address: self.address.with_chunk_index(chunk_index),
            row_width: self.row_width,
            packed: self.packed.clone(),
        })
    }

    fn split_impl(
        &self,
        _serializer: &dyn ColumnSerializer,
        target_sizes: &[u64],
        mode: SplitMode,
    ) -> Result<Vec<ChunkRef>> {
        let offsets = RowOffsets::Uniform {
            rows: self.records_count() as usize,
            width: self.row_width,
        };
        let ranges = plan_row_ranges(offsets, target_sizes, mode)?;

        let width = self.row_width as usize;
        ranges
            .into_iter()
            .enumerate()
            .map(|(i, range)| {
                let piece: ChunkRef = Arc::new(Self {
                    address: child_address(self.address, i)?,
                    row_width: self.row_width,
                    packed: self.packed.slice(range.start * width..range.end * width),
                });
                Ok(piece)
            })
            .collect()
    }
}
