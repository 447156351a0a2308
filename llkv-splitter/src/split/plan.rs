//! Row-boundary planning shared by every chunk kind.

use std::ops::Range;

use llkv_result::{Error, Result};

/// How a size plan relates to the chunk it is applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitMode {
    /// Target sizes sum to the packed size: one piece per target.
    Exact,
    /// Target sizes sum below the packed size: a trailing piece takes the rest.
    Remainder,
}

impl SplitMode {
    #[inline]
    pub fn for_plan(packed_size: u64, planned_bytes: u64) -> Self {
        if planned_bytes == packed_size {
            SplitMode::Exact
        } else {
            SplitMode::Remainder
        }
    }

    /// Number of pieces a split in this mode must return.
    #[inline]
    pub fn expected_pieces(self, targets: usize) -> usize {
        match self {
            SplitMode::Exact => targets,
            SplitMode::Remainder => targets + 1,
        }
    }
}

/// Prefix sums of per-row encoded widths: `offsets[i]` is where row `i`
/// starts, and the last element is the total size.
pub(crate) fn row_offsets(row_sizes: &[u64]) -> Vec<u64> {
    let mut out = Vec::with_capacity(row_sizes.len() + 1);
    let mut acc = 0u64;
    out.push(acc);
    for &s in row_sizes {
        acc = acc.saturating_add(s);
        out.push(acc);
    }
    out
}

/// Byte offsets of the row boundaries of a chunk.
#[derive(Clone, Copy, Debug)]
pub(crate) enum RowOffsets<'a> {
    /// Prefix sums from [`row_offsets`]: `len = rows + 1`, starting at 0.
    Prefix(&'a [u64]),
    /// `rows` rows of `width` bytes each; boundary `i` sits at `i * width`.
    Uniform { rows: usize, width: u64 },
}

impl RowOffsets<'_> {
    fn rows(&self) -> usize {
        match self {
            RowOffsets::Prefix(offsets) => offsets.len().saturating_sub(1),
            RowOffsets::Uniform { rows, .. } => *rows,
        }
    }

    #[inline]
    fn at(&self, boundary: usize) -> u64 {
        match self {
            RowOffsets::Prefix(offsets) => offsets[boundary],
            RowOffsets::Uniform { width, .. } => boundary as u64 * width,
        }
    }

    /// Row boundary whose byte offset is closest to `goal`. Ties go to the
    /// lower boundary.
    fn nearest_boundary(&self, goal: u64) -> usize {
        let rows = self.rows();
        let below = match self {
            // offsets[0] == 0 <= goal, so the partition point is at least 1.
            RowOffsets::Prefix(offsets) => offsets.partition_point(|&o| o <= goal) - 1,
            RowOffsets::Uniform { width, .. } => {
                usize::try_from(goal / width.max(&1)).map_or(rows, |b| b.min(rows))
            }
        };
        if below < rows && self.at(below + 1) - goal < goal - self.at(below) {
            below + 1
        } else {
            below
        }
    }
}

/// Choose the row range of every output piece.
///
/// Piece `i` ends at the row boundary nearest the cumulative goal
/// `sum(target_sizes[..=i])`, clamped so that it holds at least one row and
/// every later piece can still hold one. In [`SplitMode::Exact`] the last
/// planned piece ends at the last row; in [`SplitMode::Remainder`] a final
/// range covers whatever is left.
pub(crate) fn plan_row_ranges(
    offsets: RowOffsets<'_>,
    target_sizes: &[u64],
    mode: SplitMode,
) -> Result<Vec<Range<usize>>> {
    let rows = offsets.rows();
    let pieces = mode.expected_pieces(target_sizes.len());
    if rows < pieces || (pieces == 0 && rows > 0) {
        return Err(Error::Internal(format!(
            "cannot plan {pieces} pieces over {rows} rows"
        )));
    }

    let mut out = Vec::with_capacity(pieces);
    let mut start = 0usize;
    let mut goal = 0u64;
    for (i, &target) in target_sizes.iter().enumerate() {
        goal = goal.saturating_add(target);
        let pieces_after = pieces - i - 1;
        let end = if pieces_after == 0 {
            rows
        } else {
            offsets.nearest_boundary(goal).clamp(start + 1, rows - pieces_after)
        };
        tracing::trace!(piece = i, start, end, goal, "planned split range");
        out.push(start..end);
        start = end;
    }
    if mode == SplitMode::Remainder {
        tracing::trace!(piece = target_sizes.len(), start, end = rows, "planned remainder range");
        out.push(start..rows);
    }
    Ok(out)
}
