//! Batch orchestration.
//!
//! [`BatchRunner`] drives one batch: every row is normalized, named, and
//! rendered independently, row failures are collected into the manifest,
//! and the successes are assembled into the archive in row order.

pub mod cancel;
pub mod error;
pub mod naming;
pub mod runner;

pub use cancel::CancellationToken;
pub use error::BatchError;
pub use naming::{FilenameAllocator, identity_label};
pub use runner::{BatchRunner, run_batch};
