//! Row-boundary-safe splitting of packed column chunks.
//!
//! A write or compaction path produces one packed chunk per column, asks the
//! splitter to cut it into blob-sized pieces, persists each piece, and
//! registers it in a [`Portion`]:
//!
//! ```
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Int64Array};
//! use llkv_splitter::{
//!     ArrayChunk, BlobRange, ChunkAddress, ChunkSplitter, Portion, PortionChunk,
//!     RowFramedSerializer, SplitCounters, SplitSettings,
//! };
//!
//! let serializer = Arc::new(RowFramedSerializer::new());
//! let counters = Arc::new(SplitCounters::new());
//! let splitter = ChunkSplitter::new(serializer.clone(), counters.clone())
//!     .with_settings(SplitSettings::default().with_max_blob_bytes(40));
//!
//! let values: ArrayRef = Arc::new(Int64Array::from((0..10).collect::<Vec<i64>>()));
//! let chunk = ArrayChunk::from_array(ChunkAddress::new(1, 0), values, serializer.as_ref())?;
//! let pieces = splitter.split_to_blobs(&chunk)?;
//! assert_eq!(pieces.len(), 3);
//!
//! let mut portion = Portion::new(0);
//! let mut offset = 0;
//! for piece in &pieces {
//!     let range = BlobRange::new(1, offset, piece.packed_size());
//!     offset = range.end();
//!     portion.add(piece.as_ref(), range)?;
//! }
//! assert_eq!(portion.column_records_count(1), 10);
//! assert_eq!(counters.snapshot().output_chunks, 3);
//! # Ok::<(), llkv_splitter::Error>(())
//! ```
//!
//! Splitting never clamps an inconsistent plan. Any mismatch between a plan,
//! a chunk and the pieces it produced is an [`Error::ContractViolation`].

#![forbid(unsafe_code)]

pub mod address;
pub mod blob;
pub mod chunk;
pub mod codecs;
pub mod config;
pub mod constants;
pub mod counters;
pub mod meta;
pub mod planner;
pub mod portion;
pub mod record;
pub mod serialization;
pub mod split;

pub use address::{ChunkAddress, FieldId};
pub use blob::{BlobId, BlobRange};
pub use chunk::{ArrayChunk, ChunkRef, FixedWidthChunk, PortionChunk};
pub use config::SplitSettings;
pub use counters::{SplitCounters, SplitCountersSnapshot};
pub use llkv_result::{Error, Result};
pub use meta::{ChunkMeta, ChunkStats, compute_chunk_stats};
pub use planner::plan_blob_target_sizes;
pub use portion::{Portion, PortionId, SealedPortion};
pub use record::ColumnRecord;
pub use serialization::{ColumnSerializer, RowFramedSerializer};
pub use split::{ChunkSplitter, SplitMode, split_chunk};
