//! Size plans for tiling a chunk into bounded blobs.

use llkv_result::Result;

use crate::config::SplitSettings;

/// Build a target-size plan that tiles `packed_size` bytes into pieces of at
/// most `settings.max_blob_bytes` each.
///
/// The plan is empty when the chunk already fits or has a single row.
/// Otherwise it has `min(ceil(packed_size / max), records_count)` entries
/// summing exactly to `packed_size`, with sizes differing by at most one
/// byte (larger ones first). Such a plan always passes the splitter's
/// preconditions.
pub fn plan_blob_target_sizes(
    packed_size: u64,
    records_count: u64,
    settings: &SplitSettings,
) -> Result<Vec<u64>> {
    settings.validate()?;
    let max = settings.max_blob_bytes as u64;
    if packed_size <= max || records_count <= 1 {
        return Ok(Vec::new());
    }

    let n = packed_size.div_ceil(max).min(records_count);
    let base = packed_size / n;
    let extra = packed_size % n;
    let plan: Vec<u64> = (0..n).map(|i| base + u64::from(i < extra)).collect();

    tracing::debug!(packed_size, records_count, max, pieces = n, "planned blob tiling");
    Ok(plan)
}
