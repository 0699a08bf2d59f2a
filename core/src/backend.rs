//! Backend abstraction for the remote booking service.
//!
//! The engine only ever talks to the backend through [`BookingBackend`],
//! so the HTTP client, the in-memory test double and any future transport
//! are interchangeable. The trait mirrors the backend's logical REST
//! surface, one method per operation. It performs no validation of its
//! own; every rule lives in front of it.
//!
//! # Implementations
//!
//! - `BookingApiClient` (in `tidybook-client`): reqwest against the real
//!   service
//! - `InMemoryBackend` (in `tidybook-testing`): deterministic test double

use crate::types::{
    Address, BookingId, BookingRecord, Cleaner, CleanerId, ContactInfo, FrequencyId, OptionId,
    ProofOfPayment, SelectedExtra, ServiceArea, ServiceAreaId, ServiceFrequency, ServiceOption,
    ServiceType, ServiceTypeId,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shorthand for backend call results
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors surfaced by backend implementations.
///
/// `Unauthorized` is kept separate from other status failures because the
/// caller reacts to it differently: the session is invalid and the user
/// has to sign in again.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The service rejected our credentials (HTTP 401 or 403)
    #[error("the booking service rejected the credentials")]
    Unauthorized,

    /// The service could not be reached at all
    #[error("could not reach the booking service: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("the booking service rejected the request ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as far as it was readable
        message: String,
    },

    /// The response body did not decode
    #[error("could not decode the booking service response: {0}")]
    Decode(String),

    /// The client was built from unusable configuration
    #[error("invalid backend configuration: {0}")]
    InvalidConfig(String),
}

impl BackendError {
    /// True for credential rejections
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// True when the service was unreachable, as opposed to answering
    /// with an error
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

// ============================================================================
// Write payloads
// ============================================================================

/// Create/update body for a service area
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceArea {
    /// Exact postal code the area covers
    pub postal_code: String,
    /// Display name
    pub area_name: String,
}

/// Create/update body for a service type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceType {
    /// Display name
    pub name: String,
    /// Longer description
    pub description: String,
    /// Price before discounts and extras
    pub base_price: f64,
}

/// Create/update body for a frequency
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFrequency {
    /// Display label
    pub label: String,
    /// Percentage off the base price, in [0, 100]
    pub discount_percentage: f64,
}

/// Create/update body for an add-on option
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceOption {
    /// Display name
    pub name: String,
    /// Price per selected unit
    pub price_per_unit: f64,
    /// Service type the option belongs to
    pub service_type_id: ServiceTypeId,
}

/// The submission payload for a new booking.
///
/// Carries the draft's fields plus the price snapshot computed at
/// submission time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSubmission {
    /// Service postal code
    pub postal_code: String,
    /// Booked service type
    pub service_type_id: ServiceTypeId,
    /// Booked frequency
    pub frequency_id: FrequencyId,
    /// Requested service instant
    pub scheduled_at: DateTime<Utc>,
    /// Booked add-ons
    pub selected_extras: Vec<SelectedExtra>,
    /// Contact details
    pub contact: ContactInfo,
    /// Service address
    pub address: Address,
    /// Price snapshot, stored verbatim by the backend
    pub total_price: f64,
}

// ============================================================================
// The backend trait
// ============================================================================

/// Everything the engine asks of the remote booking service.
///
/// Implementations must be `Send + Sync`; the engine shares one instance
/// behind an `Arc<dyn BookingBackend>`.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    // --- Service areas ---

    /// Lists all serviceable areas.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn service_areas(&self) -> BackendResult<Vec<ServiceArea>>;

    /// Creates a service area.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn create_service_area(&self, area: NewServiceArea) -> BackendResult<ServiceArea>;

    /// Replaces a service area's fields.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn update_service_area(
        &self,
        id: &ServiceAreaId,
        area: NewServiceArea,
    ) -> BackendResult<ServiceArea>;

    /// Deletes a service area.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn delete_service_area(&self, id: &ServiceAreaId) -> BackendResult<()>;

    // --- Service types ---

    /// Lists all service types.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn service_types(&self) -> BackendResult<Vec<ServiceType>>;

    /// Creates a service type.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn create_service_type(&self, service_type: NewServiceType)
    -> BackendResult<ServiceType>;

    /// Replaces a service type's fields.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn update_service_type(
        &self,
        id: &ServiceTypeId,
        service_type: NewServiceType,
    ) -> BackendResult<ServiceType>;

    /// Deletes a service type.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn delete_service_type(&self, id: &ServiceTypeId) -> BackendResult<()>;

    // --- Frequencies ---

    /// Lists all frequencies.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn frequencies(&self) -> BackendResult<Vec<ServiceFrequency>>;

    /// Creates a frequency.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn create_frequency(&self, frequency: NewFrequency) -> BackendResult<ServiceFrequency>;

    /// Replaces a frequency's fields.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn update_frequency(
        &self,
        id: &FrequencyId,
        frequency: NewFrequency,
    ) -> BackendResult<ServiceFrequency>;

    /// Deletes a frequency.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn delete_frequency(&self, id: &FrequencyId) -> BackendResult<()>;

    // --- Add-on options ---

    /// Lists all add-on options.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn options(&self) -> BackendResult<Vec<ServiceOption>>;

    /// Creates an add-on option.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn create_option(&self, option: NewServiceOption) -> BackendResult<ServiceOption>;

    /// Replaces an add-on option's fields.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn update_option(
        &self,
        id: &OptionId,
        option: NewServiceOption,
    ) -> BackendResult<ServiceOption>;

    /// Deletes an add-on option.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn delete_option(&self, id: &OptionId) -> BackendResult<()>;

    // --- Bookings ---

    /// Lists all bookings.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn bookings(&self) -> BackendResult<Vec<BookingRecord>>;

    /// Lists the bookings assigned to one cleaner.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn assigned_bookings(&self, cleaner_id: &CleanerId)
    -> BackendResult<Vec<BookingRecord>>;

    /// Submits a new booking; the backend assigns the id and the
    /// `pending` status.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn submit_booking(&self, submission: BookingSubmission) -> BackendResult<BookingRecord>;

    /// Assigns or reassigns a cleaner.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn assign_booking(
        &self,
        id: &BookingId,
        cleaner_id: &CleanerId,
    ) -> BackendResult<BookingRecord>;

    /// Marks a booking paid, uploading the proof of payment as a
    /// multipart file.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn mark_booking_paid(
        &self,
        id: &BookingId,
        proof: ProofOfPayment,
    ) -> BackendResult<BookingRecord>;

    /// Confirms completion of a paid booking.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn complete_booking(&self, id: &BookingId) -> BackendResult<BookingRecord>;

    /// Cancels a booking.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn cancel_booking(&self, id: &BookingId) -> BackendResult<BookingRecord>;

    // --- Cleaners ---

    /// Lists the cleaner roster.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn cleaners(&self) -> BackendResult<Vec<Cleaner>>;

    // --- Calendar ---

    /// Fetches the authoritative blocked-date set.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn blocked_dates(&self) -> BackendResult<Vec<NaiveDate>>;

    /// Replaces the whole blocked-date set.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn replace_blocked_dates(&self, dates: Vec<NaiveDate>) -> BackendResult<()>;

    /// Unblocks a single date. Freeing a date that is not blocked is not
    /// an error at this level; the backend answers success either way.
    ///
    /// # Errors
    /// Fails with a [`BackendError`] when the call cannot complete.
    async fn free_blocked_date(&self, date: NaiveDate) -> BackendResult<()>;
}
