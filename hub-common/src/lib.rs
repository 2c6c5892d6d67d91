//! # Creator Hub Common Library
//!
//! Shared code for the Creator Hub services including:
//! - Domain models (campaigns, submissions, sample requests, settings)
//! - Database initialization and default settings
//! - Event types (HubEvent enum) and the EventBus
//! - Pure lifecycle engines for submissions and sample requests
//! - Read-only view helpers (filter/sort/paginate) and CSV export

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod export;
pub mod lifecycle;
pub mod models;
pub mod settings;
pub mod views;

pub use error::{Error, Result};
