//! Sample request lifecycle
//!
//! Linear fulfillment chain:
//!
//! ```text
//! PendingApproval -> PendingShowcase -> PendingOrder -> Shipped
//!       |
//!       +--reject--> Rejected
//! ```
//!
//! `advance` moves one step forward; rejection is only possible before
//! approval. Shipped and Rejected are terminal.

use crate::models::SampleRequestStatus;
use crate::{Error, Result};

const ENTITY: &str = "sample request";

/// Advance a request one step along the fulfillment chain
pub fn advance(from: SampleRequestStatus) -> Result<SampleRequestStatus> {
    match from {
        SampleRequestStatus::PendingApproval => Ok(SampleRequestStatus::PendingShowcase),
        SampleRequestStatus::PendingShowcase => Ok(SampleRequestStatus::PendingOrder),
        SampleRequestStatus::PendingOrder => Ok(SampleRequestStatus::Shipped),
        other => Err(Error::InvalidTransition {
            entity: ENTITY,
            action: "advance",
            from: other.as_str(),
        }),
    }
}

/// Reject a request still awaiting approval
pub fn reject(from: SampleRequestStatus) -> Result<SampleRequestStatus> {
    match from {
        SampleRequestStatus::PendingApproval => Ok(SampleRequestStatus::Rejected),
        other => Err(Error::InvalidTransition {
            entity: ENTITY,
            action: "reject",
            from: other.as_str(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_walks_the_chain() {
        let s = advance(SampleRequestStatus::PendingApproval).unwrap();
        assert_eq!(s, SampleRequestStatus::PendingShowcase);

        let s = advance(s).unwrap();
        assert_eq!(s, SampleRequestStatus::PendingOrder);

        let s = advance(s).unwrap();
        assert_eq!(s, SampleRequestStatus::Shipped);
    }

    #[test]
    fn test_advance_from_terminal_fails() {
        assert!(advance(SampleRequestStatus::Shipped).is_err());
        assert!(advance(SampleRequestStatus::Rejected).is_err());
    }

    #[test]
    fn test_reject_only_before_approval() {
        assert_eq!(
            reject(SampleRequestStatus::PendingApproval).unwrap(),
            SampleRequestStatus::Rejected
        );
        assert!(reject(SampleRequestStatus::PendingShowcase).is_err());
        assert!(reject(SampleRequestStatus::PendingOrder).is_err());
        assert!(reject(SampleRequestStatus::Shipped).is_err());
    }
}
