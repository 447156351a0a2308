use crate::address::ChunkAddress;
use crate::blob::BlobRange;
use crate::meta::ChunkMeta;

/// Index entry for one persisted chunk: where its bytes live and what they
/// hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRecord {
    pub address: ChunkAddress,
    pub location: BlobRange,
    pub meta: ChunkMeta,
}

impl ColumnRecord {
    pub fn new(address: ChunkAddress, location: BlobRange, meta: ChunkMeta) -> Self {
        Self {
            address,
            location,
            meta,
        }
    }

    #[inline]
    pub fn records_count(&self) -> u64 {
        self.meta.records_count
    }

    #[inline]
    pub fn packed_size(&self) -> u64 {
        self.meta.packed_size
    }
}
