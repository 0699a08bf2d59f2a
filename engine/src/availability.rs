//! Blocked-date administration over a local read-through copy.
//!
//! The manager mirrors the backend's blocked-date set. Reads degrade
//! gracefully (a failed refresh keeps the last-known copy); writes go to
//! the backend first and only then update the mirror, so a failed write
//! leaves both sides as they were.

use std::sync::Arc;

use chrono::NaiveDate;
use tidybook_core::availability::{BlockedDates, DayAnnotation, annotate_days};
use tidybook_core::backend::BookingBackend;
use tidybook_core::types::BookingRecord;
use tokio::sync::RwLock;

use crate::error::EngineResult;

/// What freeing a date did
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FreeOutcome {
    /// The date was blocked and is now open
    Freed,
    /// The date was not blocked; nothing to do
    NotBlocked,
}

/// Shared mirror of the backend's blocked-date set
#[derive(Clone)]
pub struct AvailabilityManager {
    backend: Arc<dyn BookingBackend>,
    blocked: Arc<RwLock<BlockedDates>>,
}

impl AvailabilityManager {
    /// A manager with an empty local copy; call
    /// [`AvailabilityManager::refresh`] to load the real set
    #[must_use]
    pub fn new(backend: Arc<dyn BookingBackend>) -> Self {
        Self {
            backend,
            blocked: Arc::new(RwLock::new(BlockedDates::new())),
        }
    }

    /// Pulls the authoritative set. Returns false when the fetch failed
    /// and the last-known copy stayed in place.
    pub async fn refresh(&self) -> bool {
        match self.backend.blocked_dates().await {
            Ok(dates) => {
                self.blocked.write().await.replace_all(dates);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "blocked-date refresh failed, keeping the local copy");
                false
            }
        }
    }

    /// Replaces the whole blocked set, on the wire and locally.
    ///
    /// Dates absent from `dates` become open; callers must re-include
    /// every date they want to keep blocked.
    ///
    /// # Errors
    ///
    /// Returns the backend failure; the local copy is left unchanged.
    pub async fn block(&self, dates: Vec<NaiveDate>) -> EngineResult<()> {
        self.backend.replace_blocked_dates(dates.clone()).await?;
        self.blocked.write().await.replace_all(dates);
        Ok(())
    }

    /// Opens a single date.
    ///
    /// Freeing a date that is not blocked is answered locally with
    /// [`FreeOutcome::NotBlocked`]; no request is made.
    ///
    /// # Errors
    ///
    /// Returns the backend failure; the local copy is left unchanged.
    pub async fn free(&self, date: NaiveDate) -> EngineResult<FreeOutcome> {
        if !self.blocked.read().await.is_blocked(date) {
            return Ok(FreeOutcome::NotBlocked);
        }
        self.backend.free_blocked_date(date).await?;
        self.blocked.write().await.free(date);
        Ok(FreeOutcome::Freed)
    }

    /// Day-granularity membership on the local copy
    pub async fn is_blocked(&self, date: NaiveDate) -> bool {
        self.blocked.read().await.is_blocked(date)
    }

    /// A copy of the local blocked set
    pub async fn snapshot(&self) -> BlockedDates {
        self.blocked.read().await.clone()
    }

    /// Annotates every day in `from..=to` with its block status and
    /// booking count
    pub async fn day_annotations(
        &self,
        bookings: &[BookingRecord],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<DayAnnotation> {
        let blocked = self.blocked.read().await;
        annotate_days(&blocked, bookings, from, to)
    }
}
