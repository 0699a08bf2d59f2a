//! Mock implementations of the engine's injected dependencies.
//!
//! - [`FixedClock`]: deterministic time
//! - [`InMemoryBackend`]: a small but faithful stand-in for the remote
//!   booking service, including its server-side transition guards
//! - [`FailingBackend`]: every call fails the same way, for degraded-path
//!   tests

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Test utilities document panics where critical

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tidybook_core::backend::{
    BackendError, BackendResult, BookingBackend, BookingSubmission, NewFrequency, NewServiceArea,
    NewServiceOption, NewServiceType,
};
use tidybook_core::clock::Clock;
use tidybook_core::lifecycle::{TransitionKind, allows};
use tidybook_core::types::{
    BookingId, BookingRecord, BookingStatus, Catalog, Cleaner, CleanerId, FrequencyId, OptionId,
    ProofOfPayment, ServiceArea, ServiceAreaId, ServiceFrequency, ServiceOption, ServiceType,
    ServiceTypeId,
};
use uuid::Uuid;

/// Fixed clock for deterministic tests.
///
/// Always returns the same time, making tests reproducible.
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Create a default fixed clock for tests (2025-06-01 12:00:00 UTC)
///
/// # Panics
///
/// This function will panic if the hardcoded timestamp fails to parse,
/// which should never happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc),
    )
}

#[derive(Debug, Default)]
struct BackendState {
    areas: Vec<ServiceArea>,
    service_types: Vec<ServiceType>,
    frequencies: Vec<ServiceFrequency>,
    options: Vec<ServiceOption>,
    bookings: Vec<BookingRecord>,
    cleaners: Vec<Cleaner>,
    blocked: BTreeSet<NaiveDate>,
    write_calls: usize,
    proof_uploads: Vec<(BookingId, String)>,
    offline: bool,
}

/// In-memory booking backend for fast, deterministic testing.
///
/// Behaves like the remote service as far as the engine can tell: it
/// mints ids, stamps timestamps, guards lifecycle transitions server-side
/// and treats blocked-date writes as a full replace. Cloning shares the
/// underlying state, so a test can hold one handle while the engine holds
/// another.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBackend {
    state: Arc<RwLock<BackendState>>,
    area_lookup_delay: Option<Duration>,
}

impl InMemoryBackend {
    /// Create a new empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the catalog lists
    #[must_use]
    pub fn with_catalog(self, catalog: Catalog) -> Self {
        {
            let mut state = self.state.write().unwrap();
            state.service_types = catalog.service_types;
            state.frequencies = catalog.frequencies;
            state.options = catalog.options;
        }
        self
    }

    /// Seeds the service areas
    #[must_use]
    pub fn with_areas(self, areas: Vec<ServiceArea>) -> Self {
        self.state.write().unwrap().areas = areas;
        self
    }

    /// Seeds the cleaner roster
    #[must_use]
    pub fn with_cleaners(self, cleaners: Vec<Cleaner>) -> Self {
        self.state.write().unwrap().cleaners = cleaners;
        self
    }

    /// Seeds stored bookings
    #[must_use]
    pub fn with_bookings(self, bookings: Vec<BookingRecord>) -> Self {
        self.state.write().unwrap().bookings = bookings;
        self
    }

    /// Seeds the blocked-date set
    #[must_use]
    pub fn with_blocked_dates(self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.state.write().unwrap().blocked = dates.into_iter().collect();
        self
    }

    /// Makes every service-area lookup sleep before answering, so tests
    /// can stage a reply that lands after the input has moved on
    #[must_use]
    pub const fn with_area_lookup_delay(mut self, delay: Duration) -> Self {
        self.area_lookup_delay = Some(delay);
        self
    }

    /// Simulates losing the connection. While offline every call fails
    /// with a transport error; flip back to bring the service up again.
    pub fn set_offline(&self, offline: bool) {
        self.state.write().unwrap().offline = offline;
    }

    /// Snapshot of the stored bookings, for assertions
    #[must_use]
    pub fn bookings_snapshot(&self) -> Vec<BookingRecord> {
        self.state.read().unwrap().bookings.clone()
    }

    /// Snapshot of the blocked dates, for assertions
    #[must_use]
    pub fn blocked_snapshot(&self) -> Vec<NaiveDate> {
        self.state.read().unwrap().blocked.iter().copied().collect()
    }

    /// Number of write requests that reached this backend.
    ///
    /// Lets tests assert that local validation stopped a call before any
    /// network traffic would have happened.
    #[must_use]
    pub fn write_call_count(&self) -> usize {
        self.state.read().unwrap().write_calls
    }

    /// File names of the proof-of-payment uploads received, in order
    #[must_use]
    pub fn proof_uploads(&self) -> Vec<(BookingId, String)> {
        self.state.read().unwrap().proof_uploads.clone()
    }

    fn note_write(state: &mut BackendState) {
        state.write_calls += 1;
    }

    fn ensure_online(state: &BackendState) -> BackendResult<()> {
        if state.offline {
            Err(BackendError::Transport("simulated offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn guard_transition(record: &BookingRecord, kind: TransitionKind) -> BackendResult<()> {
        if allows(record.status, kind) {
            Ok(())
        } else {
            Err(BackendError::Status {
                status: 409,
                message: format!("booking is {}", record.status),
            })
        }
    }

    fn find_booking(state: &BackendState, id: &BookingId) -> BackendResult<usize> {
        state
            .bookings
            .iter()
            .position(|b| &b.booking_id == id)
            .ok_or_else(|| BackendError::Status {
                status: 404,
                message: format!("booking {id} not found"),
            })
    }

    fn not_found(what: &str) -> BackendError {
        BackendError::Status {
            status: 404,
            message: format!("{what} not found"),
        }
    }
}

#[async_trait]
impl BookingBackend for InMemoryBackend {
    async fn service_areas(&self) -> BackendResult<Vec<ServiceArea>> {
        if let Some(delay) = self.area_lookup_delay {
            tokio::time::sleep(delay).await;
        }
        let state = self.state.read().unwrap();
        Self::ensure_online(&state)?;
        Ok(state.areas.clone())
    }

    async fn create_service_area(&self, area: NewServiceArea) -> BackendResult<ServiceArea> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let created = ServiceArea {
            id: ServiceAreaId::new(format!("area-{}", Uuid::new_v4())),
            postal_code: area.postal_code,
            area_name: area.area_name,
        };
        state.areas.push(created.clone());
        Ok(created)
    }

    async fn update_service_area(
        &self,
        id: &ServiceAreaId,
        area: NewServiceArea,
    ) -> BackendResult<ServiceArea> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let existing = state
            .areas
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| Self::not_found("service area"))?;
        existing.postal_code = area.postal_code;
        existing.area_name = area.area_name;
        Ok(existing.clone())
    }

    async fn delete_service_area(&self, id: &ServiceAreaId) -> BackendResult<()> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let before = state.areas.len();
        state.areas.retain(|a| &a.id != id);
        if state.areas.len() == before {
            return Err(Self::not_found("service area"));
        }
        Ok(())
    }

    async fn service_types(&self) -> BackendResult<Vec<ServiceType>> {
        let state = self.state.read().unwrap();
        Self::ensure_online(&state)?;
        Ok(state.service_types.clone())
    }

    async fn create_service_type(
        &self,
        service_type: NewServiceType,
    ) -> BackendResult<ServiceType> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let created = ServiceType {
            id: ServiceTypeId::new(format!("type-{}", Uuid::new_v4())),
            name: service_type.name,
            description: service_type.description,
            base_price: service_type.base_price,
        };
        state.service_types.push(created.clone());
        Ok(created)
    }

    async fn update_service_type(
        &self,
        id: &ServiceTypeId,
        service_type: NewServiceType,
    ) -> BackendResult<ServiceType> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let existing = state
            .service_types
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| Self::not_found("service type"))?;
        existing.name = service_type.name;
        existing.description = service_type.description;
        existing.base_price = service_type.base_price;
        Ok(existing.clone())
    }

    async fn delete_service_type(&self, id: &ServiceTypeId) -> BackendResult<()> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let before = state.service_types.len();
        state.service_types.retain(|t| &t.id != id);
        if state.service_types.len() == before {
            return Err(Self::not_found("service type"));
        }
        Ok(())
    }

    async fn frequencies(&self) -> BackendResult<Vec<ServiceFrequency>> {
        let state = self.state.read().unwrap();
        Self::ensure_online(&state)?;
        Ok(state.frequencies.clone())
    }

    async fn create_frequency(&self, frequency: NewFrequency) -> BackendResult<ServiceFrequency> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let created = ServiceFrequency {
            id: FrequencyId::new(format!("freq-{}", Uuid::new_v4())),
            label: frequency.label,
            discount_percentage: frequency.discount_percentage,
        };
        state.frequencies.push(created.clone());
        Ok(created)
    }

    async fn update_frequency(
        &self,
        id: &FrequencyId,
        frequency: NewFrequency,
    ) -> BackendResult<ServiceFrequency> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let existing = state
            .frequencies
            .iter_mut()
            .find(|f| &f.id == id)
            .ok_or_else(|| Self::not_found("frequency"))?;
        existing.label = frequency.label;
        existing.discount_percentage = frequency.discount_percentage;
        Ok(existing.clone())
    }

    async fn delete_frequency(&self, id: &FrequencyId) -> BackendResult<()> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let before = state.frequencies.len();
        state.frequencies.retain(|f| &f.id != id);
        if state.frequencies.len() == before {
            return Err(Self::not_found("frequency"));
        }
        Ok(())
    }

    async fn options(&self) -> BackendResult<Vec<ServiceOption>> {
        let state = self.state.read().unwrap();
        Self::ensure_online(&state)?;
        Ok(state.options.clone())
    }

    async fn create_option(&self, option: NewServiceOption) -> BackendResult<ServiceOption> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let created = ServiceOption {
            id: OptionId::new(format!("opt-{}", Uuid::new_v4())),
            name: option.name,
            price_per_unit: option.price_per_unit,
            service_type_id: option.service_type_id,
        };
        state.options.push(created.clone());
        Ok(created)
    }

    async fn update_option(
        &self,
        id: &OptionId,
        option: NewServiceOption,
    ) -> BackendResult<ServiceOption> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let existing = state
            .options
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(|| Self::not_found("option"))?;
        existing.name = option.name;
        existing.price_per_unit = option.price_per_unit;
        existing.service_type_id = option.service_type_id;
        Ok(existing.clone())
    }

    async fn delete_option(&self, id: &OptionId) -> BackendResult<()> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let before = state.options.len();
        state.options.retain(|o| &o.id != id);
        if state.options.len() == before {
            return Err(Self::not_found("option"));
        }
        Ok(())
    }

    async fn bookings(&self) -> BackendResult<Vec<BookingRecord>> {
        let state = self.state.read().unwrap();
        Self::ensure_online(&state)?;
        Ok(state.bookings.clone())
    }

    async fn assigned_bookings(
        &self,
        cleaner_id: &CleanerId,
    ) -> BackendResult<Vec<BookingRecord>> {
        let state = self.state.read().unwrap();
        Self::ensure_online(&state)?;
        Ok(state
            .bookings
            .iter()
            .filter(|b| b.assigned_cleaner_id.as_ref() == Some(cleaner_id))
            .cloned()
            .collect())
    }

    async fn submit_booking(&self, submission: BookingSubmission) -> BackendResult<BookingRecord> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let record = BookingRecord {
            booking_id: BookingId::new(format!("bk-{}", Uuid::new_v4())),
            postal_code: submission.postal_code,
            service_type_id: submission.service_type_id,
            frequency_id: submission.frequency_id,
            scheduled_at: submission.scheduled_at,
            selected_extras: submission.selected_extras,
            contact: submission.contact,
            address: submission.address,
            total_price: submission.total_price,
            status: BookingStatus::Pending,
            assigned_cleaner_id: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        state.bookings.push(record.clone());
        Ok(record)
    }

    async fn assign_booking(
        &self,
        id: &BookingId,
        cleaner_id: &CleanerId,
    ) -> BackendResult<BookingRecord> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let index = Self::find_booking(&state, id)?;
        Self::guard_transition(&state.bookings[index], TransitionKind::Assign)?;
        let booking = &mut state.bookings[index];
        booking.status = BookingStatus::Assigned;
        booking.assigned_cleaner_id = Some(cleaner_id.clone());
        booking.updated_at = Some(Utc::now());
        Ok(booking.clone())
    }

    async fn mark_booking_paid(
        &self,
        id: &BookingId,
        proof: ProofOfPayment,
    ) -> BackendResult<BookingRecord> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let index = Self::find_booking(&state, id)?;
        Self::guard_transition(&state.bookings[index], TransitionKind::MarkPaid)?;
        state.proof_uploads.push((id.clone(), proof.file_name));
        let booking = &mut state.bookings[index];
        booking.status = BookingStatus::Paid;
        booking.updated_at = Some(Utc::now());
        Ok(booking.clone())
    }

    async fn complete_booking(&self, id: &BookingId) -> BackendResult<BookingRecord> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let index = Self::find_booking(&state, id)?;
        Self::guard_transition(&state.bookings[index], TransitionKind::Complete)?;
        let booking = &mut state.bookings[index];
        booking.status = BookingStatus::Completed;
        booking.updated_at = Some(Utc::now());
        Ok(booking.clone())
    }

    async fn cancel_booking(&self, id: &BookingId) -> BackendResult<BookingRecord> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        let index = Self::find_booking(&state, id)?;
        Self::guard_transition(&state.bookings[index], TransitionKind::Cancel)?;
        let booking = &mut state.bookings[index];
        booking.status = BookingStatus::Cancelled;
        booking.updated_at = Some(Utc::now());
        Ok(booking.clone())
    }

    async fn cleaners(&self) -> BackendResult<Vec<Cleaner>> {
        let state = self.state.read().unwrap();
        Self::ensure_online(&state)?;
        Ok(state.cleaners.clone())
    }

    async fn blocked_dates(&self) -> BackendResult<Vec<NaiveDate>> {
        let state = self.state.read().unwrap();
        Self::ensure_online(&state)?;
        Ok(state.blocked.iter().copied().collect())
    }

    async fn replace_blocked_dates(&self, dates: Vec<NaiveDate>) -> BackendResult<()> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        state.blocked = dates.into_iter().collect();
        Ok(())
    }

    async fn free_blocked_date(&self, date: NaiveDate) -> BackendResult<()> {
        let mut state = self.state.write().unwrap();
        Self::ensure_online(&state)?;
        Self::note_write(&mut state);
        state.blocked.remove(&date);
        Ok(())
    }
}

/// Which way every call on a [`FailingBackend`] fails
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FailureKind {
    Transport,
    Unauthorized,
}

/// A backend where every call fails, for degraded-path tests.
#[derive(Clone, Copy, Debug)]
pub struct FailingBackend {
    kind: FailureKind,
}

impl FailingBackend {
    /// Every call fails as if the service were unreachable
    #[must_use]
    pub const fn unreachable() -> Self {
        Self {
            kind: FailureKind::Transport,
        }
    }

    /// Every call fails as if the credentials were rejected
    #[must_use]
    pub const fn unauthorized() -> Self {
        Self {
            kind: FailureKind::Unauthorized,
        }
    }

    fn error(&self) -> BackendError {
        match self.kind {
            FailureKind::Transport => {
                BackendError::Transport("connection refused (simulated)".to_string())
            }
            FailureKind::Unauthorized => BackendError::Unauthorized,
        }
    }
}

#[async_trait]
impl BookingBackend for FailingBackend {
    async fn service_areas(&self) -> BackendResult<Vec<ServiceArea>> {
        Err(self.error())
    }

    async fn create_service_area(&self, _area: NewServiceArea) -> BackendResult<ServiceArea> {
        Err(self.error())
    }

    async fn update_service_area(
        &self,
        _id: &ServiceAreaId,
        _area: NewServiceArea,
    ) -> BackendResult<ServiceArea> {
        Err(self.error())
    }

    async fn delete_service_area(&self, _id: &ServiceAreaId) -> BackendResult<()> {
        Err(self.error())
    }

    async fn service_types(&self) -> BackendResult<Vec<ServiceType>> {
        Err(self.error())
    }

    async fn create_service_type(
        &self,
        _service_type: NewServiceType,
    ) -> BackendResult<ServiceType> {
        Err(self.error())
    }

    async fn update_service_type(
        &self,
        _id: &ServiceTypeId,
        _service_type: NewServiceType,
    ) -> BackendResult<ServiceType> {
        Err(self.error())
    }

    async fn delete_service_type(&self, _id: &ServiceTypeId) -> BackendResult<()> {
        Err(self.error())
    }

    async fn frequencies(&self) -> BackendResult<Vec<ServiceFrequency>> {
        Err(self.error())
    }

    async fn create_frequency(&self, _frequency: NewFrequency) -> BackendResult<ServiceFrequency> {
        Err(self.error())
    }

    async fn update_frequency(
        &self,
        _id: &FrequencyId,
        _frequency: NewFrequency,
    ) -> BackendResult<ServiceFrequency> {
        Err(self.error())
    }

    async fn delete_frequency(&self, _id: &FrequencyId) -> BackendResult<()> {
        Err(self.error())
    }

    async fn options(&self) -> BackendResult<Vec<ServiceOption>> {
        Err(self.error())
    }

    async fn create_option(&self, _option: NewServiceOption) -> BackendResult<ServiceOption> {
        Err(self.error())
    }

    async fn update_option(
        &self,
        _id: &OptionId,
        _option: NewServiceOption,
    ) -> BackendResult<ServiceOption> {
        Err(self.error())
    }

    async fn delete_option(&self, _id: &OptionId) -> BackendResult<()> {
        Err(self.error())
    }

    async fn bookings(&self) -> BackendResult<Vec<BookingRecord>> {
        Err(self.error())
    }

    async fn assigned_bookings(
        &self,
        _cleaner_id: &CleanerId,
    ) -> BackendResult<Vec<BookingRecord>> {
        Err(self.error())
    }

    async fn submit_booking(
        &self,
        _submission: BookingSubmission,
    ) -> BackendResult<BookingRecord> {
        Err(self.error())
    }

    async fn assign_booking(
        &self,
        _id: &BookingId,
        _cleaner_id: &CleanerId,
    ) -> BackendResult<BookingRecord> {
        Err(self.error())
    }

    async fn mark_booking_paid(
        &self,
        _id: &BookingId,
        _proof: ProofOfPayment,
    ) -> BackendResult<BookingRecord> {
        Err(self.error())
    }

    async fn complete_booking(&self, _id: &BookingId) -> BackendResult<BookingRecord> {
        Err(self.error())
    }

    async fn cancel_booking(&self, _id: &BookingId) -> BackendResult<BookingRecord> {
        Err(self.error())
    }

    async fn cleaners(&self) -> BackendResult<Vec<Cleaner>> {
        Err(self.error())
    }

    async fn blocked_dates(&self) -> BackendResult<Vec<NaiveDate>> {
        Err(self.error())
    }

    async fn replace_blocked_dates(&self, _dates: Vec<NaiveDate>) -> BackendResult<()> {
        Err(self.error())
    }

    async fn free_blocked_date(&self, _date: NaiveDate) -> BackendResult<()> {
        Err(self.error())
    }
}
