//! Read-only view helpers: filter, search, sort, paginate
//!
//! All sorting is deterministic: equal keys tie-break by id ascending so a
//! paginated listing never shuffles rows between requests.

use crate::models::{ContentRewardCampaign, ContentSubmission, SampleRequest, SubmissionStatus};
use serde::Serialize;

/// Page size constant for all pagination
pub const PAGE_SIZE: i64 = 15;

/// Sort direction for created-date ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first
    Latest,
    /// Oldest first
    Oldest,
}

impl SortOrder {
    pub fn parse(s: &str) -> SortOrder {
        match s {
            "oldest" => SortOrder::Oldest,
            _ => SortOrder::Latest,
        }
    }
}

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Total number of rows across all pages
    pub total_results: i64,
    /// Offset of the first row on this page
    pub offset: i64,
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, total_pages].
pub fn calculate_pagination(total_results: i64, requested_page: i64) -> Pagination {
    let total_pages = (total_results + PAGE_SIZE - 1) / PAGE_SIZE;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * PAGE_SIZE;

    Pagination {
        page,
        total_pages,
        total_results,
        offset,
    }
}

/// Slice one page out of an already-sorted vector
pub fn paginate<T: Clone>(items: &[T], requested_page: i64) -> (Vec<T>, Pagination) {
    let pagination = calculate_pagination(items.len() as i64, requested_page);
    let start = pagination.offset as usize;
    let end = (start + PAGE_SIZE as usize).min(items.len());
    let page_items = if start < items.len() {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };
    (page_items, pagination)
}

/// Case-insensitive substring match used by all search boxes
fn matches_query(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Filter submissions by optional status/campaign/affiliate
pub fn filter_submissions(
    submissions: Vec<ContentSubmission>,
    status: Option<SubmissionStatus>,
    campaign_id: Option<&str>,
    affiliate_id: Option<&str>,
) -> Vec<ContentSubmission> {
    submissions
        .into_iter()
        .filter(|s| status.map_or(true, |want| s.status == want))
        .filter(|s| campaign_id.map_or(true, |want| s.campaign_id == want))
        .filter(|s| affiliate_id.map_or(true, |want| s.affiliate_id == want))
        .collect()
}

/// Sort submissions by submission date with id tie-break
pub fn sort_submissions(submissions: &mut [ContentSubmission], order: SortOrder) {
    submissions.sort_by(|a, b| {
        let by_date = match order {
            SortOrder::Latest => b.submitted_at.cmp(&a.submitted_at),
            SortOrder::Oldest => a.submitted_at.cmp(&b.submitted_at),
        };
        by_date.then_with(|| a.id.cmp(&b.id))
    });
}

/// Search sample requests over affiliate handle and campaign name
pub fn search_sample_requests(requests: Vec<SampleRequest>, query: &str) -> Vec<SampleRequest> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return requests;
    }
    requests
        .into_iter()
        .filter(|r| {
            matches_query(&r.affiliate_handle, &query) || matches_query(&r.campaign_name, &query)
        })
        .collect()
}

/// Sort sample requests by creation date with id tie-break
pub fn sort_sample_requests(requests: &mut [SampleRequest], order: SortOrder) {
    requests.sort_by(|a, b| {
        let by_date = match order {
            SortOrder::Latest => b.created_at.cmp(&a.created_at),
            SortOrder::Oldest => a.created_at.cmp(&b.created_at),
        };
        by_date.then_with(|| a.id.cmp(&b.id))
    });
}

/// Sort campaigns by remaining budget descending with id tie-break
///
/// Used on the affiliate-facing listing so campaigns with money left surface
/// first.
pub fn sort_campaigns_by_remaining_budget(campaigns: &mut [ContentRewardCampaign]) {
    campaigns.sort_by(|a, b| {
        b.remaining_budget()
            .partial_cmp(&a.remaining_budget())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}
