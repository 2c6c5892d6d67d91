//! Storage layer over the SQLite pool
//!
//! Each module owns the queries for one entity family. State transitions are
//! written as guarded UPDATEs (`WHERE id = ? AND status = ?`) and counter
//! changes as in-database increments, so concurrent requests serialize in the
//! database instead of racing through read-modify-write in process.

pub mod campaigns;
pub mod incentives;
pub mod leaderboard;
pub mod sample_requests;
pub mod submissions;
pub mod tickets;
