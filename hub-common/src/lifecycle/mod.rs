//! Pure lifecycle engines
//!
//! Transition rules and payout arithmetic, independent of storage. The
//! storage layer enforces the same rules a second time with guarded UPDATEs
//! so concurrent writers cannot race past them.

pub mod sample;
pub mod submission;
