use std::fmt;
use thiserror::Error;

/// Unified error type for LLKV storage operations.
///
/// # Error Handling Strategy
///
/// Errors propagate upward using Rust's `?` operator. Most variants describe
/// conditions a caller can react to (bad input, unsupported types). The
/// exception is [`Error::ContractViolation`]: it signals that an upstream
/// component handed the storage layer inconsistent instructions, and the
/// operation that owns the write (a flush, a compaction) must be abandoned.
///
/// # Thread Safety
///
/// `Error` is `Send + Sync`, so it can be returned from worker threads that
/// split or persist chunks in parallel.
#[derive(Error, Debug)]
pub enum Error {
    /// Arrow library error during columnar data operations.
    ///
    /// Typically raised while rebuilding Arrow arrays from decoded rows.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Invalid input or API parameter.
    ///
    /// This error indicates a problem with arguments passed to LLKV APIs:
    /// - Unsupported Arrow data types for a codec
    /// - Truncated or malformed encoded payloads
    /// - Inconsistent constructor inputs (e.g. payload not a multiple of the row width)
    ///
    /// # Recovery
    ///
    /// These errors are recoverable: fix the input and retry.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// Internal error indicating a bug or unexpected state.
    ///
    /// This should never occur during normal operation. It indicates a
    /// violated internal invariant, such as a serializer whose per-row widths
    /// disagree with the bytes it produced.
    #[error("An internal operation failed: {0}")]
    Internal(String),

    /// A caller broke a storage contract.
    ///
    /// Raised when:
    /// - A split plan asks for more bytes than the chunk holds
    /// - A split plan asks for more pieces than there are rows
    /// - A split produced the wrong number of pieces or lost rows/bytes
    /// - Chunks are registered into a portion out of order
    ///
    /// # Recovery
    ///
    /// None. The inputs are inconsistent, and any attempt to clamp or truncate
    /// them risks a portion whose rows cannot be reconstructed. Abort the
    /// enclosing write or compaction.
    #[error("contract violation: {0}")]
    ContractViolation(String),
}

impl Error {
    /// Create a contract violation error from any displayable message.
    ///
    /// # Examples
    ///
    /// ```
    /// use llkv_result::Error;
    ///
    /// let err = Error::contract_violation(format!("plan sum {} exceeds {}", 1200, 1000));
    /// assert!(err.is_contract_violation());
    /// assert!(err.to_string().contains("1200"));
    /// ```
    #[inline]
    pub fn contract_violation<M: fmt::Display>(msg: M) -> Self {
        Error::ContractViolation(msg.to_string())
    }

    /// Create an invalid argument error from any displayable message.
    #[inline]
    pub fn invalid_argument<M: fmt::Display>(msg: M) -> Self {
        Error::InvalidArgumentError(msg.to_string())
    }

    /// Returns `true` for fatal contract violations.
    ///
    /// Callers that own a write or compaction use this to tell "abort this
    /// operation" apart from ordinary, retryable failures.
    #[inline]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Error::ContractViolation(_))
    }
}
