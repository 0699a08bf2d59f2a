//! # Tidybook Testing
//!
//! Test doubles and canonical data for the tidybook crates.
//!
//! This crate provides:
//! - [`mocks::InMemoryBackend`]: a full in-process booking backend
//! - [`mocks::FailingBackend`]: a backend that always errors
//! - [`mocks::FixedClock`]: deterministic time
//! - [`fixtures`]: one small sample world shared across test suites
//!
//! ## Example
//!
//! ```ignore
//! use tidybook_testing::{fixtures, test_clock};
//!
//! #[tokio::test]
//! async fn assigns_a_pending_booking() {
//!     let backend = fixtures::seeded_backend()
//!         .with_bookings(vec![fixtures::booking_with_status(
//!             "bk-1",
//!             BookingStatus::Pending,
//!             None,
//!         )]);
//!
//!     let updated = backend
//!         .assign_booking(&BookingId::new("bk-1"), &CleanerId::new("cl-1"))
//!         .await
//!         .unwrap();
//!     assert_eq!(updated.status, BookingStatus::Assigned);
//! }
//! ```

pub mod fixtures;
pub mod mocks;

// Re-export commonly used items
pub use mocks::{FailingBackend, FixedClock, InMemoryBackend, test_clock};

#[cfg(test)]
mod tests {
    use super::*;
    use tidybook_core::clock::Clock;
    use tidybook_core::pricing::{self, DEFAULT_TAX_RATE};

    #[test]
    fn fixed_clock_is_deterministic() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(time1, fixtures::test_now());
    }

    #[test]
    fn sample_draft_prices_to_the_canonical_total() {
        let quote = pricing::quote(
            &fixtures::complete_draft(),
            &fixtures::sample_catalog(),
            DEFAULT_TAX_RATE,
        )
        .rounded();
        assert!((quote.subtotal - 140.0).abs() < 1e-9);
        assert!((quote.grand_total - 154.0).abs() < 1e-9);
    }
}
