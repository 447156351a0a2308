#![allow(dead_code)]

use std::sync::{Arc, Once};

use arrow::array::{ArrayRef, StringArray};
use bytes::Bytes;
use llkv_splitter::{
    ArrayChunk, BlobRange, ChunkAddress, ChunkRef, FieldId, FixedWidthChunk, Portion,
    PortionChunk, RowFramedSerializer,
};

static INIT: Once = Once::new();

/// Initialize tracing for test binaries. Safe to call multiple times.
pub fn init_tracing() {
    INIT.call_once(|| {
        use tracing_subscriber::filter::EnvFilter;
        use tracing_subscriber::fmt;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

/// `rows` opaque rows of `width` bytes; row `i` is filled with byte `i`.
pub fn fixed_chunk(column: FieldId, rows: usize, width: usize) -> FixedWidthChunk {
    let payload: Vec<u8> = (0..rows)
        .flat_map(|i| std::iter::repeat_n(i as u8, width))
        .collect();
    FixedWidthChunk::new(ChunkAddress::new(column, 0), width as u64, Bytes::from(payload)).unwrap()
}

/// Ten Utf8 rows framed to exactly 100 bytes each (tag + length + 95 chars),
/// for a 1000-byte chunk.
pub fn utf8_chunk_1000(column: FieldId) -> ArrayChunk {
    let values: Vec<String> = (0..10)
        .map(|i| char::from(b'a' + i as u8).to_string().repeat(95))
        .collect();
    let array: ArrayRef = Arc::new(StringArray::from(values));
    ArrayChunk::from_array(ChunkAddress::new(column, 0), array, &RowFramedSerializer).unwrap()
}

/// Concatenated payloads of `pieces`, in order.
pub fn concat_payloads(pieces: &[ChunkRef]) -> Vec<u8> {
    pieces
        .iter()
        .flat_map(|p| p.packed_bytes().iter().copied())
        .collect()
}

/// In-memory stand-in for the blob-write path: appends every piece to one
/// growing blob and registers it in `portion`.
pub struct BlobSink {
    pub blob_id: u64,
    pub data: Vec<u8>,
}

impl BlobSink {
    pub fn new(blob_id: u64) -> Self {
        Self {
            blob_id,
            data: Vec::new(),
        }
    }

    pub fn persist(&mut self, portion: &mut Portion, piece: &dyn PortionChunk) -> llkv_splitter::Result<()> {
        let range = BlobRange::new(self.blob_id, self.data.len() as u64, piece.packed_size());
        self.data.extend_from_slice(piece.packed_bytes());
        portion.add(piece, range)
    }

    pub fn read(&self, range: BlobRange) -> &[u8] {
        &self.data[range.offset as usize..range.end() as usize]
    }
}
