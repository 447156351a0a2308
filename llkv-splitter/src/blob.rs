/// Opaque identifier of a persisted blob in the storage namespace.
pub type BlobId = u64;

/// Physical location of a persisted chunk: a byte range inside a blob.
///
/// Assigned by the blob-write path after it stores a chunk's packed bytes.
/// The splitter never creates these.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlobRange {
    pub blob_id: BlobId,
    pub offset: u64,
    pub size: u64,
}

impl BlobRange {
    #[inline]
    pub const fn new(blob_id: BlobId, offset: u64, size: u64) -> Self {
        Self {
            blob_id,
            offset,
            size,
        }
    }

    /// Exclusive end offset within the blob.
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }
}
