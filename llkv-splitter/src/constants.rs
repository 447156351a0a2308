/// Default ceiling for a single persisted blob.
pub const DEFAULT_MAX_BLOB_BYTES: usize = 8 * 1024 * 1024;
