//! Content submission lifecycle and payout arithmetic
//!
//! State machine:
//!
//! ```text
//! PendingReview --approve--> Approved --evidence--> AwaitingPayout --finalize--> Paid
//!       |
//!       +------reject------> Rejected
//! ```
//!
//! Paid and Rejected are terminal. Any action attempted from the wrong state
//! returns `InvalidTransition` and leaves the record untouched. A rejected
//! submission is never revived; resubmitting creates a new record so the
//! rejection stays in the audit trail.

use crate::models::SubmissionStatus;
use crate::{Error, Result};

const ENTITY: &str = "submission";

fn invalid(action: &'static str, from: SubmissionStatus) -> Error {
    Error::InvalidTransition {
        entity: ENTITY,
        action,
        from: from.as_str(),
    }
}

/// Admin approves a pending submission
pub fn approve(from: SubmissionStatus) -> Result<SubmissionStatus> {
    match from {
        SubmissionStatus::PendingReview => Ok(SubmissionStatus::Approved),
        other => Err(invalid("approve", other)),
    }
}

/// Admin rejects a pending submission (reason required by the caller)
pub fn reject(from: SubmissionStatus) -> Result<SubmissionStatus> {
    match from {
        SubmissionStatus::PendingReview => Ok(SubmissionStatus::Rejected),
        other => Err(invalid("reject", other)),
    }
}

/// Affiliate attaches view-count evidence, queueing the submission for payout
pub fn attach_evidence(from: SubmissionStatus) -> Result<SubmissionStatus> {
    match from {
        SubmissionStatus::Approved => Ok(SubmissionStatus::AwaitingPayout),
        other => Err(invalid("attach evidence to", other)),
    }
}

/// Admin finalizes the payout
pub fn finalize(from: SubmissionStatus) -> Result<SubmissionStatus> {
    match from {
        SubmissionStatus::AwaitingPayout => Ok(SubmissionStatus::Paid),
        other => Err(invalid("finalize", other)),
    }
}

/// Compute the payout for a finalized submission
///
/// `(views / 1000) * rate`, clamped to `[minimum, maximum]`. A non-positive
/// view count is a validation error; the caller must not have written anything
/// before calling this.
pub fn compute_payout(
    final_view_count: i64,
    payout_rate: f64,
    minimum_payout: f64,
    maximum_payout: f64,
) -> Result<f64> {
    if final_view_count <= 0 {
        return Err(Error::Validation(
            "final view count must be greater than zero".to_string(),
        ));
    }

    let raw = (final_view_count as f64 / 1000.0) * payout_rate;
    Ok(raw.clamp(minimum_payout, maximum_payout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let s = approve(SubmissionStatus::PendingReview).unwrap();
        assert_eq!(s, SubmissionStatus::Approved);

        let s = attach_evidence(s).unwrap();
        assert_eq!(s, SubmissionStatus::AwaitingPayout);

        let s = finalize(s).unwrap();
        assert_eq!(s, SubmissionStatus::Paid);
    }

    #[test]
    fn test_reject_only_from_pending() {
        assert_eq!(
            reject(SubmissionStatus::PendingReview).unwrap(),
            SubmissionStatus::Rejected
        );
        assert!(reject(SubmissionStatus::Approved).is_err());
        assert!(reject(SubmissionStatus::Paid).is_err());
    }

    #[test]
    fn test_invalid_transitions_name_the_state() {
        let err = finalize(SubmissionStatus::Paid).unwrap_err();
        match err {
            Error::InvalidTransition { entity, action, from } => {
                assert_eq!(entity, "submission");
                assert_eq!(action, "finalize");
                assert_eq!(from, "Paid");
            }
            other => panic!("expected InvalidTransition, got {:?}", other),
        }

        assert!(approve(SubmissionStatus::Rejected).is_err());
        assert!(attach_evidence(SubmissionStatus::PendingReview).is_err());
        assert!(attach_evidence(SubmissionStatus::AwaitingPayout).is_err());
    }

    #[test]
    fn test_payout_clamps_to_minimum() {
        // 100 views at $5/1k is $0.50, clamped up to the $1 floor
        let payout = compute_payout(100, 5.0, 1.0, 50.0).unwrap();
        assert_eq!(payout, 1.0);
    }

    #[test]
    fn test_payout_clamps_to_maximum() {
        // 20,000 views at $5/1k is $100, clamped down to the $50 ceiling
        let payout = compute_payout(20_000, 5.0, 1.0, 50.0).unwrap();
        assert_eq!(payout, 50.0);
    }

    #[test]
    fn test_payout_within_bounds() {
        let payout = compute_payout(2_000, 5.0, 1.0, 50.0).unwrap();
        assert_eq!(payout, 10.0);
    }

    #[test]
    fn test_payout_rejects_non_positive_views() {
        assert!(matches!(
            compute_payout(0, 5.0, 1.0, 50.0),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            compute_payout(-100, 5.0, 1.0, 50.0),
            Err(Error::Validation(_))
        ));
    }
}
