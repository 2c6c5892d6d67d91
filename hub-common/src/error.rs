//! Common error types for the Creator Hub

use thiserror::Error;

/// Common result type for Creator Hub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Creator Hub services
///
/// Lifecycle precondition failures surface as `InvalidTransition` and are
/// never silently swallowed; callers must report them to the user.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Storage unavailable: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request field (rejected before any write)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Lifecycle precondition on current state failed; no state change occurred
    #[error("Invalid transition: cannot {action} a {entity} in state {from}")]
    InvalidTransition {
        entity: &'static str,
        action: &'static str,
        from: &'static str,
    },

    /// Payout finalization would push total_paid_out past total_budget
    #[error("Budget exhausted for campaign {campaign_id}: {remaining:.2} remaining")]
    BudgetExhausted { campaign_id: String, remaining: f64 },

    /// Write rejected by storage-side authorization
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
