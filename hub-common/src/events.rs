//! Event types for the Creator Hub event system
//!
//! Provides the shared event definitions and EventBus used by the server.
//! Events are broadcast in-process and re-broadcast to HTTP clients over SSE.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Creator Hub event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
/// All events use this central enum for type safety and exhaustive matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HubEvent {
    /// New content submission entered the review pipeline
    SubmissionCreated {
        submission_id: String,
        campaign_id: String,
        affiliate_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Submission moved to a new review state
    ///
    /// Emitted for approve, reject, evidence upload, and finalization.
    SubmissionStatusChanged {
        submission_id: String,
        campaign_id: String,
        old_status: String,
        new_status: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Payout finalized; campaign aggregates were incremented
    PayoutFinalized {
        submission_id: String,
        campaign_id: String,
        final_view_count: i64,
        earnings: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Campaign created or edited by an admin
    CampaignUpdated {
        campaign_id: String,
        status: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Campaign budget fully consumed; campaign flipped to Ended
    CampaignBudgetExhausted {
        campaign_id: String,
        total_paid_out: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// New sample request entered the queue
    SampleRequestCreated {
        request_id: String,
        campaign_id: String,
        affiliate_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Sample request advanced or was rejected
    SampleRequestStatusChanged {
        request_id: String,
        old_status: String,
        new_status: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Affiliate joined an incentive campaign
    IncentiveJoined {
        incentive_id: String,
        affiliate_id: String,
        joined_affiliates: i64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Global settings were updated (carries the new version)
    SettingsUpdated {
        version: i64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Support ticket created or its status changed
    TicketStatusChanged {
        ticket_id: String,
        status: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl HubEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            HubEvent::SubmissionCreated { .. } => "SubmissionCreated",
            HubEvent::SubmissionStatusChanged { .. } => "SubmissionStatusChanged",
            HubEvent::PayoutFinalized { .. } => "PayoutFinalized",
            HubEvent::CampaignUpdated { .. } => "CampaignUpdated",
            HubEvent::CampaignBudgetExhausted { .. } => "CampaignBudgetExhausted",
            HubEvent::SampleRequestCreated { .. } => "SampleRequestCreated",
            HubEvent::SampleRequestStatusChanged { .. } => "SampleRequestStatusChanged",
            HubEvent::IncentiveJoined { .. } => "IncentiveJoined",
            HubEvent::SettingsUpdated { .. } => "SettingsUpdated",
            HubEvent::TicketStatusChanged { .. } => "TicketStatusChanged",
        }
    }
}

/// Central event distribution bus for application-wide events
///
/// Wraps tokio::broadcast, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<HubEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: HubEvent) -> Result<usize, broadcast::error::SendError<HubEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring whether anyone is listening
    ///
    /// Used for notification events where a missing listener is acceptable.
    pub fn emit_lossy(&self, event: HubEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eventbus_new() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_eventbus_subscribe() {
        let bus = EventBus::new(10);
        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_eventbus_emit() {
        use std::sync::Arc;
        let bus = Arc::new(EventBus::new(10));
        let mut rx = bus.subscribe();

        let event = HubEvent::SubmissionCreated {
            submission_id: "s1".to_string(),
            campaign_id: "c1".to_string(),
            affiliate_id: "a1".to_string(),
            timestamp: chrono::Utc::now(),
        };

        bus.emit(event).expect("emit should succeed");

        let received = rx.try_recv().expect("Should receive event");
        assert_eq!(received.event_type(), "SubmissionCreated");
    }

    #[test]
    fn test_eventbus_emit_lossy() {
        let bus = EventBus::new(2);
        let mut _rx = bus.subscribe();

        // Fill past capacity; should not panic
        for i in 0..10 {
            bus.emit_lossy(HubEvent::SettingsUpdated {
                version: i,
                timestamp: chrono::Utc::now(),
            });
        }
        assert_eq!(bus.capacity(), 2);
    }

    #[test]
    fn test_eventbus_multiple_subscribers() {
        use std::sync::Arc;
        let bus = Arc::new(EventBus::new(10));
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(HubEvent::PayoutFinalized {
            submission_id: "s1".to_string(),
            campaign_id: "c1".to_string(),
            final_view_count: 2000,
            earnings: 10.0,
            timestamp: chrono::Utc::now(),
        })
        .expect("emit should succeed");

        let r1 = rx1.try_recv().expect("rx1 should receive");
        let r2 = rx2.try_recv().expect("rx2 should receive");
        assert_eq!(r1.event_type(), "PayoutFinalized");
        assert_eq!(r2.event_type(), "PayoutFinalized");
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = HubEvent::SubmissionStatusChanged {
            submission_id: "s1".to_string(),
            campaign_id: "c1".to_string(),
            old_status: "PendingReview".to_string(),
            new_status: "Approved".to_string(),
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&event).expect("serialization should succeed");
        assert!(json.contains("\"type\":\"SubmissionStatusChanged\""));
        assert!(json.contains("\"new_status\":\"Approved\""));

        let back: HubEvent = serde_json::from_str(&json).expect("deserialization should succeed");
        assert_eq!(back.event_type(), "SubmissionStatusChanged");
    }
}
