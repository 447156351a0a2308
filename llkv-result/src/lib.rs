//! Error types and result definitions shared by the LLKV storage crates.
//!
//! Every fallible operation returns [`Result<T>`], whose error variant is the
//! single [`Error`] enum defined here. Errors cross crate boundaries with `?`
//! and never need per-crate wrapping.
//!
//! # Error Categories
//!
//! - **Data format errors** ([`Error::Arrow`]): Arrow array construction issues
//! - **Bad input** ([`Error::InvalidArgumentError`]): malformed payloads, bad parameters
//! - **Internal errors** ([`Error::Internal`]): bugs or unexpected states
//! - **Contract violations** ([`Error::ContractViolation`]): a caller broke an
//!   invariant the storage layer relies on; the enclosing write must abort

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
