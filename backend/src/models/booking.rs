//! Booking records held by the in-memory ledger.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::venue::VenueId;

/// Opaque booking token of the form `BK-<hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    pub fn generate() -> Self {
        Self(format!("BK-{}", Uuid::new_v4().simple()).to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a caller supplies to reserve a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub venue_id: VenueId,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

impl BookingRequest {
    pub fn has_valid_range(&self) -> bool {
        self.start_time < self.end_time
    }
}

/// A confirmed booking. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: BookingId,
    pub venue_id: VenueId,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BookingRecord {
    pub fn from_request(id: BookingId, request: BookingRequest) -> Self {
        Self {
            id,
            venue_id: request.venue_id,
            user_name: request.user_name,
            user_email: request.user_email,
            user_phone: request.user_phone,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            special_requests: request.special_requests,
            created_at: Utc::now(),
        }
    }

    /// Half-open interval overlap on the same venue and date.
    pub fn overlaps(&self, venue_id: VenueId, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        self.venue_id == venue_id
            && self.date == date
            && !(end <= self.start_time || start >= self.end_time)
    }
}
