//! Driving bookings through their lifecycle.
//!
//! The manager keeps a read-through cache of the booking list and the
//! cleaner roster. Every status change is validated locally against the
//! transition rules first, so an illegal request is rejected with a typed
//! [`InvalidTransition`] without a network round-trip; only then does the
//! backend write happen. Write failures surface directly and are never
//! retried. The backend's response replaces the cached record.

use std::sync::Arc;

use tidybook_core::backend::BookingBackend;
use tidybook_core::lifecycle::{
    TransitionKind, active_assignment_count, check_transition, derived_cleaner_status,
};
use tidybook_core::types::{
    BookingId, BookingRecord, Cleaner, CleanerId, CleanerStatus, ProofOfPayment,
};
use tidybook_core::validate::{ValidationErrors, field};
use tokio::sync::RwLock;

use crate::error::{EngineError, EngineResult};

/// One roster entry joined with its derived occupancy
#[derive(Clone, Debug)]
pub struct CleanerOverview {
    /// The roster record
    pub cleaner: Cleaner,
    /// Derived status; an inactive roster entry stays inactive
    pub status: CleanerStatus,
    /// Number of assigned or paid bookings held
    pub active_bookings: usize,
}

#[derive(Debug, Default)]
struct LifecycleState {
    bookings: Vec<BookingRecord>,
    cleaners: Vec<Cleaner>,
}

/// Booking list, cleaner roster and the status-change operations
#[derive(Clone)]
pub struct LifecycleManager {
    backend: Arc<dyn BookingBackend>,
    state: Arc<RwLock<LifecycleState>>,
}

impl LifecycleManager {
    /// A manager with empty caches; call [`LifecycleManager::refresh`]
    /// to load them
    #[must_use]
    pub fn new(backend: Arc<dyn BookingBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(RwLock::new(LifecycleState::default())),
        }
    }

    /// Reloads the booking list and the cleaner roster. Either fetch may
    /// fail independently; the failed part keeps its last-known copy and
    /// the method returns false.
    pub async fn refresh(&self) -> bool {
        let bookings = self.backend.bookings().await;
        let cleaners = self.backend.cleaners().await;

        let mut fresh = true;
        let mut state = self.state.write().await;
        match bookings {
            Ok(list) => state.bookings = list,
            Err(err) => {
                tracing::warn!(error = %err, "booking refresh failed, keeping the local copy");
                fresh = false;
            }
        }
        match cleaners {
            Ok(roster) => state.cleaners = roster,
            Err(err) => {
                tracing::warn!(error = %err, "roster refresh failed, keeping the local copy");
                fresh = false;
            }
        }
        fresh
    }

    /// A copy of the cached booking list
    pub async fn bookings(&self) -> Vec<BookingRecord> {
        self.state.read().await.bookings.clone()
    }

    /// The cached booking with this id, if any
    pub async fn booking(&self, id: &BookingId) -> Option<BookingRecord> {
        self.state
            .read()
            .await
            .bookings
            .iter()
            .find(|b| &b.booking_id == id)
            .cloned()
    }

    /// A copy of the cached cleaner roster
    pub async fn cleaners(&self) -> Vec<Cleaner> {
        self.state.read().await.cleaners.clone()
    }

    /// Assigns a cleaner to a pending booking, or moves an assigned
    /// booking to a different cleaner.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownBooking`] for an id not in the cache,
    /// [`EngineError::Transition`] when the booking's status does not
    /// admit assignment, or the backend failure.
    pub async fn assign(
        &self,
        id: &BookingId,
        cleaner_id: &CleanerId,
    ) -> EngineResult<BookingRecord> {
        self.check_locally(id, TransitionKind::Assign).await?;
        let updated = self.backend.assign_booking(id, cleaner_id).await?;
        Ok(self.remember(updated).await)
    }

    /// Marks an assigned booking paid, attaching the proof of payment.
    ///
    /// # Errors
    ///
    /// A [`ValidationErrors`] rejection when the proof is missing or
    /// empty (checked before anything else), the local transition errors
    /// of [`LifecycleManager::assign`], or the backend failure.
    pub async fn mark_paid(
        &self,
        id: &BookingId,
        proof: Option<&ProofOfPayment>,
    ) -> EngineResult<BookingRecord> {
        let proof = match proof {
            Some(proof) if !proof.is_empty() => proof.clone(),
            _ => {
                let mut errors = ValidationErrors::new();
                errors.push(field::PROOF_OF_PAYMENT, "Proof of payment is required");
                return Err(errors.into());
            }
        };
        self.check_locally(id, TransitionKind::MarkPaid).await?;
        let updated = self.backend.mark_booking_paid(id, proof).await?;
        Ok(self.remember(updated).await)
    }

    /// Confirms completion of a paid booking.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`LifecycleManager::assign`].
    pub async fn confirm_completion(&self, id: &BookingId) -> EngineResult<BookingRecord> {
        self.check_locally(id, TransitionKind::Complete).await?;
        let updated = self.backend.complete_booking(id).await?;
        Ok(self.remember(updated).await)
    }

    /// Cancels a pending or assigned booking.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`LifecycleManager::assign`].
    pub async fn cancel(&self, id: &BookingId) -> EngineResult<BookingRecord> {
        self.check_locally(id, TransitionKind::Cancel).await?;
        let updated = self.backend.cancel_booking(id).await?;
        Ok(self.remember(updated).await)
    }

    /// Joins the roster with derived occupancy for the dashboard
    pub async fn cleaner_overview(&self) -> Vec<CleanerOverview> {
        let state = self.state.read().await;
        state
            .cleaners
            .iter()
            .map(|cleaner| CleanerOverview {
                status: derived_cleaner_status(cleaner, &state.bookings),
                active_bookings: active_assignment_count(&cleaner.id, &state.bookings),
                cleaner: cleaner.clone(),
            })
            .collect()
    }

    async fn check_locally(&self, id: &BookingId, kind: TransitionKind) -> EngineResult<()> {
        let state = self.state.read().await;
        let record = state
            .bookings
            .iter()
            .find(|b| &b.booking_id == id)
            .ok_or_else(|| EngineError::UnknownBooking(id.clone()))?;
        check_transition(record.status, kind)?;
        Ok(())
    }

    async fn remember(&self, updated: BookingRecord) -> BookingRecord {
        let mut state = self.state.write().await;
        match state
            .bookings
            .iter_mut()
            .find(|b| b.booking_id == updated.booking_id)
        {
            Some(slot) => *slot = updated.clone(),
            None => state.bookings.push(updated.clone()),
        }
        updated
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tidybook_core::types::BookingStatus;
    use tidybook_testing::fixtures;
    use tidybook_testing::mocks::InMemoryBackend;

    fn manager_over(backend: &InMemoryBackend) -> LifecycleManager {
        LifecycleManager::new(Arc::new(backend.clone()))
    }

    fn proof() -> ProofOfPayment {
        ProofOfPayment {
            file_name: "receipt.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn assign_updates_backend_and_cache() {
        let backend = fixtures::seeded_backend().with_bookings(vec![
            fixtures::booking_with_status("bk-1", BookingStatus::Pending, None),
        ]);
        let manager = manager_over(&backend);
        manager.refresh().await;

        let updated = manager
            .assign(&BookingId::new("bk-1"), &CleanerId::new("cl-1"))
            .await
            .unwrap();

        assert_eq!(updated.status, BookingStatus::Assigned);
        assert_eq!(updated.assigned_cleaner_id, Some(CleanerId::new("cl-1")));
        let cached = manager.booking(&BookingId::new("bk-1")).await.unwrap();
        assert_eq!(cached.status, BookingStatus::Assigned);
    }

    #[tokio::test]
    async fn reassignment_moves_the_booking_to_the_new_cleaner() {
        let backend = fixtures::seeded_backend().with_bookings(vec![
            fixtures::booking_with_status("bk-1", BookingStatus::Assigned, Some("cl-1")),
        ]);
        let manager = manager_over(&backend);
        manager.refresh().await;

        let updated = manager
            .assign(&BookingId::new("bk-1"), &CleanerId::new("cl-2"))
            .await
            .unwrap();

        assert_eq!(updated.status, BookingStatus::Assigned);
        assert_eq!(updated.assigned_cleaner_id, Some(CleanerId::new("cl-2")));
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected_without_a_request() {
        let backend = fixtures::seeded_backend().with_bookings(vec![
            fixtures::booking_with_status("bk-1", BookingStatus::Completed, Some("cl-1")),
        ]);
        let manager = manager_over(&backend);
        manager.refresh().await;
        let writes_before = backend.write_call_count();

        let result = manager
            .assign(&BookingId::new("bk-1"), &CleanerId::new("cl-2"))
            .await;

        assert!(matches!(result, Err(EngineError::Transition(_))));
        assert_eq!(backend.write_call_count(), writes_before);
        let cached = manager.booking(&BookingId::new("bk-1")).await.unwrap();
        assert_eq!(cached.status, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn mark_paid_without_proof_is_rejected_before_io() {
        let backend = fixtures::seeded_backend().with_bookings(vec![
            fixtures::booking_with_status("bk-1", BookingStatus::Assigned, Some("cl-1")),
        ]);
        let manager = manager_over(&backend);
        manager.refresh().await;

        let result = manager.mark_paid(&BookingId::new("bk-1"), None).await;

        let error = result.unwrap_err();
        let errors = error.as_validation().unwrap();
        assert_eq!(
            errors.get(field::PROOF_OF_PAYMENT),
            Some("Proof of payment is required")
        );
        assert_eq!(backend.write_call_count(), 0);
        assert!(backend.proof_uploads().is_empty());
    }

    #[tokio::test]
    async fn empty_proof_counts_as_missing() {
        let backend = fixtures::seeded_backend().with_bookings(vec![
            fixtures::booking_with_status("bk-1", BookingStatus::Assigned, Some("cl-1")),
        ]);
        let manager = manager_over(&backend);
        manager.refresh().await;

        let empty = ProofOfPayment {
            file_name: "  ".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: vec![1],
        };
        let result = manager.mark_paid(&BookingId::new("bk-1"), Some(&empty)).await;

        assert!(matches!(result, Err(EngineError::Validation(_))));
        assert_eq!(backend.write_call_count(), 0);
    }

    #[tokio::test]
    async fn mark_paid_uploads_the_proof_and_advances_the_status() {
        let backend = fixtures::seeded_backend().with_bookings(vec![
            fixtures::booking_with_status("bk-1", BookingStatus::Assigned, Some("cl-1")),
        ]);
        let manager = manager_over(&backend);
        manager.refresh().await;

        let updated = manager
            .mark_paid(&BookingId::new("bk-1"), Some(&proof()))
            .await
            .unwrap();

        assert_eq!(updated.status, BookingStatus::Paid);
        assert_eq!(
            backend.proof_uploads(),
            vec![(BookingId::new("bk-1"), "receipt.pdf".to_string())]
        );
    }

    #[tokio::test]
    async fn unknown_booking_is_reported_as_such() {
        let manager = manager_over(&fixtures::seeded_backend());
        manager.refresh().await;

        let result = manager
            .assign(&BookingId::new("bk-404"), &CleanerId::new("cl-1"))
            .await;

        assert!(matches!(result, Err(EngineError::UnknownBooking(_))));
    }

    #[tokio::test]
    async fn overview_derives_occupancy_and_respects_inactive() {
        let backend = fixtures::seeded_backend().with_bookings(vec![
            fixtures::booking_with_status("bk-1", BookingStatus::Assigned, Some("cl-1")),
            fixtures::booking_with_status("bk-2", BookingStatus::Paid, Some("cl-1")),
            fixtures::booking_with_status("bk-3", BookingStatus::Completed, Some("cl-2")),
        ]);
        let manager = manager_over(&backend);
        manager.refresh().await;

        let overview = manager.cleaner_overview().await;

        assert_eq!(overview.len(), 3);
        let ada = &overview[0];
        assert_eq!(ada.status, CleanerStatus::Occupied);
        assert_eq!(ada.active_bookings, 2);
        // a completed booking does not occupy its cleaner
        let ben = &overview[1];
        assert_eq!(ben.status, CleanerStatus::Available);
        assert_eq!(ben.active_bookings, 0);
        // the roster says inactive, so derived status stays inactive
        let mia = &overview[2];
        assert_eq!(mia.status, CleanerStatus::Inactive);
    }
}
