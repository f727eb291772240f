//! In-memory booking ledger.
//!
//! Bookings live for the lifetime of the process. Availability checks are
//! advisory reads; `create_booking` repeats the check under the write lock so
//! two concurrent requests can never both take the same slot.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use parking_lot::RwLock;

use crate::models::{BookingId, BookingRecord, BookingRequest, VenueId};

/// Why a booking was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("Start time {start} is not before end time {end}")]
    InvalidTimeRange { start: NaiveTime, end: NaiveTime },

    #[error("Venue {venue_id} is already booked on {date} between {start} and {end}")]
    SlotUnavailable {
        venue_id: VenueId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
}

/// Shared, append-only list of bookings.
#[derive(Clone, Default)]
pub struct BookingLedger {
    bookings: Arc<RwLock<Vec<BookingRecord>>>,
}

fn slot_free(
    bookings: &[BookingRecord],
    venue_id: VenueId,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> bool {
    start < end && !bookings.iter().any(|b| b.overlaps(venue_id, date, start, end))
}

impl BookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no booking for the venue overlaps `[start, end)` on `date`.
    ///
    /// An empty or inverted range is never available.
    pub fn check_availability(
        &self,
        venue_id: VenueId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> bool {
        slot_free(&self.bookings.read(), venue_id, date, start, end)
    }

    /// Check and append atomically.
    pub fn create_booking(&self, request: BookingRequest) -> Result<BookingId, BookingError> {
        if !request.has_valid_range() {
            return Err(BookingError::InvalidTimeRange {
                start: request.start_time,
                end: request.end_time,
            });
        }

        let mut bookings = self.bookings.write();
        if !slot_free(
            &bookings,
            request.venue_id,
            request.date,
            request.start_time,
            request.end_time,
        ) {
            log::info!(
                "Rejected booking for venue {} on {} {}-{}",
                request.venue_id,
                request.date,
                request.start_time,
                request.end_time
            );
            return Err(BookingError::SlotUnavailable {
                venue_id: request.venue_id,
                date: request.date,
                start: request.start_time,
                end: request.end_time,
            });
        }

        let id = BookingId::generate();
        log::info!("Created booking {} for venue {}", id, request.venue_id);
        bookings.push(BookingRecord::from_request(id.clone(), request));
        Ok(id)
    }

    /// Bookings for a venue in creation order.
    pub fn bookings_for_venue(&self, venue_id: VenueId) -> Vec<BookingRecord> {
        self.bookings
            .read()
            .iter()
            .filter(|b| b.venue_id == venue_id)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &BookingId) -> Option<BookingRecord> {
        self.bookings.read().iter().find(|b| &b.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.bookings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.read().is_empty()
    }
}
