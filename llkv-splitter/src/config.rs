use llkv_result::{Error, Result};

use crate::constants::DEFAULT_MAX_BLOB_BYTES;

/// Run-time splitter configuration (no hidden constants).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSettings {
    /// Upper bound the planner aims for when tiling a chunk into blobs.
    /// Pieces can still exceed it when a single row is larger.
    pub max_blob_bytes: usize,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
        }
    }
}

impl SplitSettings {
    pub fn with_max_blob_bytes(mut self, max_blob_bytes: usize) -> Self {
        self.max_blob_bytes = max_blob_bytes;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_blob_bytes == 0 {
            return Err(Error::invalid_argument("max_blob_bytes must be non-zero"));
        }
        Ok(())
    }
}
