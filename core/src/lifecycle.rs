//! Booking lifecycle rules.
//!
//! The status graph is a DAG:
//!
//! ```text
//! pending ──assign──▶ assigned ──mark paid──▶ paid ──complete──▶ completed
//!    │                 │    ▲
//!    │                 │    └── assign (reassignment)
//!    └────cancel───────┴──────────────▶ cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal. Every rule here is local and
//! synchronous; rejecting an illegal transition never needs the network.

use crate::types::{BookingRecord, BookingStatus, Cleaner, CleanerId, CleanerStatus};
use std::fmt;
use thiserror::Error;

/// The four operations that move a booking through its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Attach or replace the assigned cleaner
    Assign,
    /// Record the proof of payment
    MarkPaid,
    /// Confirm the work was done
    Complete,
    /// Withdraw the booking
    Cancel,
}

impl TransitionKind {
    /// Every transition kind, for exhaustive table checks
    pub const ALL: [Self; 4] = [Self::Assign, Self::MarkPaid, Self::Complete, Self::Cancel];

    /// The status a booking lands in when this transition succeeds
    #[must_use]
    pub const fn target_status(self) -> BookingStatus {
        match self {
            Self::Assign => BookingStatus::Assigned,
            Self::MarkPaid => BookingStatus::Paid,
            Self::Complete => BookingStatus::Completed,
            Self::Cancel => BookingStatus::Cancelled,
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Assign => "assign",
            Self::MarkPaid => "mark paid",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        };
        write!(f, "{name}")
    }
}

/// Rejection of an illegal status change, preserving what was attempted
/// from which status.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("cannot {attempted} a booking that is {from}")]
pub struct InvalidTransition {
    /// Status the booking was in
    pub from: BookingStatus,
    /// Operation that was attempted
    pub attempted: TransitionKind,
}

/// The transition table.
///
/// Assignment doubles as reassignment, so it is allowed from `assigned`.
#[must_use]
pub const fn allows(from: BookingStatus, kind: TransitionKind) -> bool {
    match kind {
        TransitionKind::Assign | TransitionKind::Cancel => {
            matches!(from, BookingStatus::Pending | BookingStatus::Assigned)
        }
        TransitionKind::MarkPaid => matches!(from, BookingStatus::Assigned),
        TransitionKind::Complete => matches!(from, BookingStatus::Paid),
    }
}

/// Checks a transition against the table.
///
/// # Errors
///
/// Returns [`InvalidTransition`] when the table forbids the change.
pub const fn check_transition(
    from: BookingStatus,
    kind: TransitionKind,
) -> Result<(), InvalidTransition> {
    if allows(from, kind) {
        Ok(())
    } else {
        Err(InvalidTransition {
            from,
            attempted: kind,
        })
    }
}

/// Number of bookings currently keeping a cleaner busy.
///
/// Only `assigned` and `paid` bookings count; completed and cancelled
/// work never does.
#[must_use]
pub fn active_assignment_count(cleaner_id: &CleanerId, bookings: &[BookingRecord]) -> usize {
    bookings
        .iter()
        .filter(|booking| booking.status.occupies_cleaner())
        .filter(|booking| booking.assigned_cleaner_id.as_ref() == Some(cleaner_id))
        .count()
}

/// Derives a cleaner's effective status from the bookings.
///
/// Occupancy is computed, never stored: a cleaner is occupied while at
/// least one active assignment points at them. An `inactive` roster record
/// stays inactive no matter what is assigned.
#[must_use]
pub fn derived_cleaner_status(cleaner: &Cleaner, bookings: &[BookingRecord]) -> CleanerStatus {
    if cleaner.status == CleanerStatus::Inactive {
        return CleanerStatus::Inactive;
    }
    if active_assignment_count(&cleaner.id, bookings) > 0 {
        CleanerStatus::Occupied
    } else {
        CleanerStatus::Available
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Address, BookingId, ContactInfo, FrequencyId, ServiceTypeId};
    use chrono::{TimeZone, Utc};

    const ALL_STATUSES: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Assigned,
        BookingStatus::Paid,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    fn booking(status: BookingStatus, cleaner: Option<&str>) -> BookingRecord {
        BookingRecord {
            booking_id: BookingId::new("bk-1"),
            postal_code: "10115".to_string(),
            service_type_id: ServiceTypeId::new("standard"),
            frequency_id: FrequencyId::new("once"),
            scheduled_at: Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap(),
            selected_extras: vec![],
            contact: ContactInfo::default(),
            address: Address::default(),
            total_price: 120.0,
            status,
            assigned_cleaner_id: cleaner.map(CleanerId::new),
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    fn cleaner(status: CleanerStatus) -> Cleaner {
        Cleaner {
            id: CleanerId::new("cl-1"),
            first_name: "Ada".to_string(),
            last_name: "Krause".to_string(),
            email: "ada@example.com".to_string(),
            status,
        }
    }

    #[test]
    fn assignment_is_allowed_from_pending_and_assigned_only() {
        assert!(allows(BookingStatus::Pending, TransitionKind::Assign));
        assert!(allows(BookingStatus::Assigned, TransitionKind::Assign));
        assert!(!allows(BookingStatus::Paid, TransitionKind::Assign));
        assert!(!allows(BookingStatus::Completed, TransitionKind::Assign));
        assert!(!allows(BookingStatus::Cancelled, TransitionKind::Assign));
    }

    #[test]
    fn mark_paid_requires_an_assigned_booking() {
        for status in ALL_STATUSES {
            assert_eq!(
                allows(status, TransitionKind::MarkPaid),
                status == BookingStatus::Assigned
            );
        }
    }

    #[test]
    fn completion_requires_a_paid_booking() {
        for status in ALL_STATUSES {
            assert_eq!(
                allows(status, TransitionKind::Complete),
                status == BookingStatus::Paid
            );
        }
    }

    #[test]
    fn cancellation_stops_once_paid() {
        assert!(allows(BookingStatus::Pending, TransitionKind::Cancel));
        assert!(allows(BookingStatus::Assigned, TransitionKind::Cancel));
        assert!(!allows(BookingStatus::Paid, TransitionKind::Cancel));
        assert!(!allows(BookingStatus::Completed, TransitionKind::Cancel));
        assert!(!allows(BookingStatus::Cancelled, TransitionKind::Cancel));
    }

    #[test]
    fn terminal_statuses_admit_no_transition_at_all() {
        for status in [BookingStatus::Completed, BookingStatus::Cancelled] {
            assert!(status.is_terminal());
            for kind in TransitionKind::ALL {
                let err = check_transition(status, kind).unwrap_err();
                assert_eq!(err.from, status);
                assert_eq!(err.attempted, kind);
            }
        }
    }

    #[test]
    fn rejections_carry_a_readable_reason() {
        let err = check_transition(BookingStatus::Completed, TransitionKind::Assign).unwrap_err();
        assert_eq!(err.to_string(), "cannot assign a booking that is completed");
    }

    #[test]
    fn transition_targets_match_the_graph() {
        assert_eq!(
            TransitionKind::Assign.target_status(),
            BookingStatus::Assigned
        );
        assert_eq!(TransitionKind::MarkPaid.target_status(), BookingStatus::Paid);
        assert_eq!(
            TransitionKind::Complete.target_status(),
            BookingStatus::Completed
        );
        assert_eq!(
            TransitionKind::Cancel.target_status(),
            BookingStatus::Cancelled
        );
    }

    #[test]
    fn occupancy_counts_only_assigned_and_paid_work() {
        let bookings = vec![
            booking(BookingStatus::Assigned, Some("cl-1")),
            booking(BookingStatus::Paid, Some("cl-1")),
            booking(BookingStatus::Completed, Some("cl-1")),
            booking(BookingStatus::Cancelled, Some("cl-1")),
            booking(BookingStatus::Pending, None),
        ];
        assert_eq!(active_assignment_count(&CleanerId::new("cl-1"), &bookings), 2);
        assert_eq!(
            derived_cleaner_status(&cleaner(CleanerStatus::Available), &bookings),
            CleanerStatus::Occupied
        );
    }

    #[test]
    fn cleaner_with_no_active_work_is_available() {
        let bookings = vec![booking(BookingStatus::Completed, Some("cl-1"))];
        assert_eq!(
            derived_cleaner_status(&cleaner(CleanerStatus::Occupied), &bookings),
            CleanerStatus::Available
        );
    }

    #[test]
    fn inactive_roster_status_always_wins() {
        let bookings = vec![booking(BookingStatus::Assigned, Some("cl-1"))];
        assert_eq!(
            derived_cleaner_status(&cleaner(CleanerStatus::Inactive), &bookings),
            CleanerStatus::Inactive
        );
    }
}
