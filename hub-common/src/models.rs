//! Domain models for the Creator Hub
//!
//! All entities are owned by the database; in-process values are snapshots
//! refreshed on each read. IDs are UUID strings, money is f64 dollars,
//! timestamps are UTC.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User role claim provided by the identity layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    Affiliate,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Affiliate => "Affiliate",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "Admin" => Ok(UserRole::Admin),
            "Affiliate" => Ok(UserRole::Affiliate),
            other => Err(Error::Validation(format!("unknown user role: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub tiktok_username: Option<String>,
    pub role: UserRole,
    /// "Verified" or "Banned"
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Platform a content reward campaign accepts submissions from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    TikTok,
    Instagram,
    YouTube,
}

/// Content reward campaign state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    Active,
    Ended,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Active => "Active",
            CampaignStatus::Ended => "Ended",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "Active" => Ok(CampaignStatus::Active),
            "Ended" => Ok(CampaignStatus::Ended),
            other => Err(Error::Internal(format!("unknown campaign status: {}", other))),
        }
    }
}

/// Downloadable asset attached to a campaign brief
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignAsset {
    pub title: String,
    pub url: String,
}

/// Pay-per-view campaign affiliates submit content against
///
/// `total_paid_out`, `total_views` and `participant_count` are running
/// aggregates; only payout finalization and submission intake mutate them,
/// always via atomic in-database increments. They are recomputable from the
/// submission set at any time (see the rebuild operation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRewardCampaign {
    pub id: String,
    pub title: String,
    /// Dollars per 1,000 views
    pub payout_rate: f64,
    pub total_budget: f64,
    pub total_paid_out: f64,
    pub participant_count: i64,
    pub total_views: i64,
    pub minimum_payout: f64,
    pub maximum_payout: f64,
    pub platforms: Vec<Platform>,
    pub status: CampaignStatus,
    pub requirements: Vec<String>,
    pub assets: Vec<CampaignAsset>,
    pub created_at: DateTime<Utc>,
}

impl ContentRewardCampaign {
    /// Budget still available for payouts
    pub fn remaining_budget(&self) -> f64 {
        self.total_budget - self.total_paid_out
    }
}

/// Content submission review state
///
/// PendingReview -> {Approved, Rejected}; Approved -> AwaitingPayout;
/// AwaitingPayout -> Paid. Paid and Rejected are terminal; resubmission
/// after rejection creates a new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    PendingReview,
    Approved,
    Rejected,
    AwaitingPayout,
    Paid,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::PendingReview => "PendingReview",
            SubmissionStatus::Approved => "Approved",
            SubmissionStatus::Rejected => "Rejected",
            SubmissionStatus::AwaitingPayout => "AwaitingPayout",
            SubmissionStatus::Paid => "Paid",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "PendingReview" => Ok(SubmissionStatus::PendingReview),
            "Approved" => Ok(SubmissionStatus::Approved),
            "Rejected" => Ok(SubmissionStatus::Rejected),
            "AwaitingPayout" => Ok(SubmissionStatus::AwaitingPayout),
            "Paid" => Ok(SubmissionStatus::Paid),
            other => Err(Error::Internal(format!("unknown submission status: {}", other))),
        }
    }

    /// Terminal states accept no further actions
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Paid | SubmissionStatus::Rejected)
    }
}

/// A piece of affiliate content in a campaign's review pipeline
///
/// Invariant: `calculated_earnings` is present iff `status == Paid` iff
/// `final_view_count` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSubmission {
    pub id: String,
    pub campaign_id: String,
    pub affiliate_id: String,
    pub affiliate_handle: String,
    pub video_url: String,
    pub status: SubmissionStatus,
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub screenshot_url: Option<String>,
    pub final_view_count: Option<i64>,
    pub calculated_earnings: Option<f64>,
}

/// Sample request fulfillment state
///
/// PendingApproval -> {PendingShowcase, Rejected}; PendingShowcase ->
/// PendingOrder; PendingOrder -> Shipped. Shipped and Rejected terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleRequestStatus {
    PendingApproval,
    PendingShowcase,
    PendingOrder,
    Shipped,
    Rejected,
}

impl SampleRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleRequestStatus::PendingApproval => "PendingApproval",
            SampleRequestStatus::PendingShowcase => "PendingShowcase",
            SampleRequestStatus::PendingOrder => "PendingOrder",
            SampleRequestStatus::Shipped => "Shipped",
            SampleRequestStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "PendingApproval" => Ok(SampleRequestStatus::PendingApproval),
            "PendingShowcase" => Ok(SampleRequestStatus::PendingShowcase),
            "PendingOrder" => Ok(SampleRequestStatus::PendingOrder),
            "Shipped" => Ok(SampleRequestStatus::Shipped),
            "Rejected" => Ok(SampleRequestStatus::Rejected),
            other => Err(Error::Internal(format!("unknown sample request status: {}", other))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SampleRequestStatus::Shipped | SampleRequestStatus::Rejected)
    }
}

/// Affiliate request for a physical product sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRequest {
    pub id: String,
    pub campaign_id: String,
    pub campaign_name: String,
    pub affiliate_id: String,
    pub affiliate_handle: String,
    pub video_url: String,
    pub ad_code: String,
    pub status: SampleRequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Sample-product campaign backing sample requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleCampaign {
    pub id: String,
    pub name: String,
    pub category: String,
    pub product_url: String,
    /// Admin-only purchase link used when fulfilling PendingOrder requests
    pub order_link: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncentiveStatus {
    Pending,
    Active,
    Ended,
}

impl IncentiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncentiveStatus::Pending => "Pending",
            IncentiveStatus::Active => "Active",
            IncentiveStatus::Ended => "Ended",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(IncentiveStatus::Pending),
            "Active" => Ok(IncentiveStatus::Active),
            "Ended" => Ok(IncentiveStatus::Ended),
            other => Err(Error::Internal(format!("unknown incentive status: {}", other))),
        }
    }
}

/// Time-boxed incentive campaign affiliates opt into
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncentiveCampaign {
    pub id: String,
    pub title: String,
    pub description: String,
    pub rules: Vec<String>,
    pub rewards: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Minimum participants before the campaign activates
    pub min_affiliates: i64,
    pub joined_affiliates: i64,
    pub status: IncentiveStatus,
}

/// Single row on a published leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub tiktok_username: String,
    pub total_gmv: f64,
    pub items_sold: i64,
    pub orders: i64,
    pub video_views: i64,
}

/// Published leaderboard snapshot for a timeframe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    pub date: DateTime<Utc>,
    pub timeframe: String,
    pub top_affiliates: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Pending,
    Received,
    OnGoing,
    Completed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "Pending",
            TicketStatus::Received => "Received",
            TicketStatus::OnGoing => "OnGoing",
            TicketStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(TicketStatus::Pending),
            "Received" => Ok(TicketStatus::Received),
            "OnGoing" => Ok(TicketStatus::OnGoing),
            "Completed" => Ok(TicketStatus::Completed),
            other => Err(Error::Validation(format!("unknown ticket status: {}", other))),
        }
    }
}

/// Affiliate support ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub affiliate_id: String,
    pub affiliate_handle: String,
    pub subject: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}
