//! HTTP API handlers for hub-server

pub mod auth;
pub mod campaigns;
pub mod error;
pub mod health;
pub mod incentives;
pub mod leaderboard;
pub mod sample_requests;
pub mod settings;
pub mod sse;
pub mod submissions;
pub mod tickets;

pub use error::{ApiError, ApiResult};
