//! Blocked-date bookkeeping at calendar-day granularity.
//!
//! A date is either blocked or it is not; there is no per-date metadata
//! and no time-of-day component. The backend's write model is a full
//! replace of the whole set, mirrored here by [`BlockedDates::replace_all`].

use crate::types::BookingRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The set of calendar days no booking may be scheduled on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockedDates(BTreeSet<NaiveDate>);

impl BlockedDates {
    /// An empty set
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Builds a set from any collection of days
    #[must_use]
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self(dates.into_iter().collect())
    }

    /// Replaces the whole set.
    ///
    /// This is the only way to add blocks: callers must re-include every
    /// date they want to keep, matching the backend's replace semantics.
    pub fn replace_all(&mut self, dates: impl IntoIterator<Item = NaiveDate>) {
        self.0 = dates.into_iter().collect();
    }

    /// Unblocks a single day.
    ///
    /// Returns `false` when the day was not blocked, which callers treat
    /// as a benign no-op rather than an error.
    pub fn free(&mut self, date: NaiveDate) -> bool {
        self.0.remove(&date)
    }

    /// Day-granularity membership test
    #[must_use]
    pub fn is_blocked(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }

    /// Iterates the blocked days in ascending order
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.iter().copied()
    }

    /// Blocked days in ascending order, as an owned list
    #[must_use]
    pub fn to_vec(&self) -> Vec<NaiveDate> {
        self.0.iter().copied().collect()
    }

    /// Number of blocked days
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing is blocked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<NaiveDate> for BlockedDates {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self::from_dates(iter)
    }
}

/// How one calendar day presents in the admin calendar
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayAnnotation {
    /// The day in question
    pub date: NaiveDate,
    /// Whether new bookings are blocked on this day
    pub blocked: bool,
    /// Number of bookings scheduled on this day, independent of blocking
    pub booking_count: usize,
}

/// Counts bookings per scheduled calendar day.
///
/// Every record counts, whatever its status; the calendar shows workload,
/// the block set controls schedulability, and the two never interact.
#[must_use]
pub fn bookings_per_day(bookings: &[BookingRecord]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for booking in bookings {
        *counts.entry(booking.scheduled_day()).or_insert(0) += 1;
    }
    counts
}

/// Annotates every day in the inclusive range with its block flag and
/// booking count. An inverted range yields an empty list.
#[must_use]
pub fn annotate_days(
    blocked: &BlockedDates,
    bookings: &[BookingRecord],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<DayAnnotation> {
    if from > to {
        return Vec::new();
    }
    let counts = bookings_per_day(bookings);
    from.iter_days()
        .take_while(|day| *day <= to)
        .map(|date| DayAnnotation {
            date,
            blocked: blocked.is_blocked(date),
            booking_count: counts.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{
        Address, BookingId, BookingRecord, BookingStatus, ContactInfo, FrequencyId, ServiceTypeId,
    };
    use chrono::{TimeZone, Utc};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn booking_on(d: u32, status: BookingStatus) -> BookingRecord {
        BookingRecord {
            booking_id: BookingId::new(format!("bk-{d}")),
            postal_code: "10115".to_string(),
            service_type_id: ServiceTypeId::new("standard"),
            frequency_id: FrequencyId::new("once"),
            scheduled_at: Utc.with_ymd_and_hms(2025, 6, d, 9, 0, 0).unwrap(),
            selected_extras: vec![],
            contact: ContactInfo::default(),
            address: Address::default(),
            total_price: 100.0,
            status,
            assigned_cleaner_id: None,
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn blocking_covers_every_submitted_date() {
        let mut blocked = BlockedDates::new();
        blocked.replace_all([day(1), day(2)]);
        assert!(blocked.is_blocked(day(1)));
        assert!(blocked.is_blocked(day(2)));
        assert!(!blocked.is_blocked(day(3)));
    }

    #[test]
    fn replace_drops_dates_missing_from_the_new_set() {
        let mut blocked = BlockedDates::from_dates([day(1), day(2)]);
        blocked.replace_all([day(2)]);
        assert!(!blocked.is_blocked(day(1)));
        assert!(blocked.is_blocked(day(2)));
        assert_eq!(blocked.len(), 1);
    }

    #[test]
    fn freeing_an_unblocked_date_is_a_no_op() {
        let mut blocked = BlockedDates::from_dates([day(1)]);
        assert!(blocked.free(day(1)));
        assert!(!blocked.free(day(1)));
        assert!(!blocked.free(day(9)));
        assert!(blocked.is_empty());
    }

    #[test]
    fn duplicate_dates_collapse() {
        let blocked = BlockedDates::from_dates([day(5), day(5), day(5)]);
        assert_eq!(blocked.len(), 1);
    }

    #[test]
    fn serializes_as_a_plain_date_array() {
        let blocked = BlockedDates::from_dates([day(2), day(1)]);
        let json = serde_json::to_string(&blocked).unwrap();
        assert_eq!(json, "[\"2025-06-01\",\"2025-06-02\"]");
    }

    #[test]
    fn booking_counts_ignore_status_and_blocking() {
        let bookings = vec![
            booking_on(1, BookingStatus::Pending),
            booking_on(1, BookingStatus::Cancelled),
            booking_on(2, BookingStatus::Completed),
        ];
        let counts = bookings_per_day(&bookings);
        assert_eq!(counts.get(&day(1)), Some(&2));
        assert_eq!(counts.get(&day(2)), Some(&1));
    }

    #[test]
    fn annotations_combine_blocks_and_counts_per_day() {
        let blocked = BlockedDates::from_dates([day(2)]);
        let bookings = vec![
            booking_on(1, BookingStatus::Pending),
            booking_on(2, BookingStatus::Assigned),
        ];
        let days = annotate_days(&blocked, &bookings, day(1), day(3));
        assert_eq!(days.len(), 3);
        assert_eq!(
            days[0],
            DayAnnotation {
                date: day(1),
                blocked: false,
                booking_count: 1
            }
        );
        assert_eq!(
            days[1],
            DayAnnotation {
                date: day(2),
                blocked: true,
                booking_count: 1
            }
        );
        assert_eq!(
            days[2],
            DayAnnotation {
                date: day(3),
                blocked: false,
                booking_count: 0
            }
        );
    }

    #[test]
    fn inverted_ranges_annotate_nothing() {
        let days = annotate_days(&BlockedDates::new(), &[], day(3), day(1));
        assert!(days.is_empty());
    }
}
