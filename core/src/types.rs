//! Domain types for the tidybook booking engine.
//!
//! Value objects and entities shared by every crate in the workspace:
//! catalog entities, booking drafts and records, cleaners and the
//! proof-of-payment artifact. Wire-visible structs serialize with the
//! backend's camelCase field names.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================
//
// All ids are backend-assigned opaque strings. They are newtyped so a
// `CleanerId` can never be passed where a `BookingId` is expected.

/// Unique identifier for a service area
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceAreaId(String);

impl ServiceAreaId {
    /// Wraps a backend-assigned id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceAreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a service type
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceTypeId(String);

impl ServiceTypeId {
    /// Wraps a backend-assigned id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a service frequency
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyId(String);

impl FrequencyId {
    /// Wraps a backend-assigned id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrequencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reserved id of the free-text "other" add-on sentinel.
///
/// It never appears in the catalog and never contributes to a price.
pub const OTHER_OPTION_ID: &str = "other";

/// Unique identifier for an add-on option
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(String);

impl OptionId {
    /// Wraps a backend-assigned id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved free-text sentinel id
    #[must_use]
    pub fn other() -> Self {
        Self(OTHER_OPTION_ID.to_string())
    }

    /// Whether this is the free-text sentinel
    #[must_use]
    pub fn is_other(&self) -> bool {
        self.0 == OTHER_OPTION_ID
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a booking
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    /// Wraps a backend-assigned id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a cleaner
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CleanerId(String);

impl CleanerId {
    /// Wraps a backend-assigned id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CleanerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// A serviceable postal code with its display name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceArea {
    /// Backend-assigned id
    pub id: ServiceAreaId,
    /// Exact postal code this area covers
    pub postal_code: String,
    /// Human-readable neighbourhood or city name
    pub area_name: String,
}

/// A bookable kind of cleaning with its base price
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceType {
    /// Backend-assigned id
    pub id: ServiceTypeId,
    /// Display name, e.g. "Deep cleaning"
    pub name: String,
    /// Longer marketing description
    pub description: String,
    /// Price before discounts and extras
    pub base_price: f64,
}

/// A recurrence choice with its percentage discount off the base price
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFrequency {
    /// Backend-assigned id
    pub id: FrequencyId,
    /// Display label, e.g. "Every week"
    pub label: String,
    /// Percentage of the base price taken off, expected in [0, 100].
    /// The bound is enforced on admin writes, never re-clamped when pricing.
    pub discount_percentage: f64,
}

/// An add-on option scoped to one service type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOption {
    /// Backend-assigned id
    pub id: OptionId,
    /// Display name, e.g. "Inside fridge"
    pub name: String,
    /// Price per selected unit
    pub price_per_unit: f64,
    /// The service type this option can be booked with
    pub service_type_id: ServiceTypeId,
}

/// The full service catalog as served by the backend.
///
/// Service areas are intentionally not part of the catalog; the postal
/// validator fetches them on its own cadence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// All bookable service types
    pub service_types: Vec<ServiceType>,
    /// All recurrence choices
    pub frequencies: Vec<ServiceFrequency>,
    /// All add-on options across service types
    pub options: Vec<ServiceOption>,
}

impl Catalog {
    /// Looks up a service type by id
    #[must_use]
    pub fn service_type(&self, id: &ServiceTypeId) -> Option<&ServiceType> {
        self.service_types.iter().find(|t| &t.id == id)
    }

    /// Looks up a frequency by id
    #[must_use]
    pub fn frequency(&self, id: &FrequencyId) -> Option<&ServiceFrequency> {
        self.frequencies.iter().find(|f| &f.id == id)
    }

    /// Looks up an add-on option by id
    #[must_use]
    pub fn option(&self, id: &OptionId) -> Option<&ServiceOption> {
        self.options.iter().find(|o| &o.id == id)
    }

    /// All options bookable with the given service type
    #[must_use]
    pub fn options_for(&self, service_type_id: &ServiceTypeId) -> Vec<&ServiceOption> {
        self.options
            .iter()
            .filter(|o| &o.service_type_id == service_type_id)
            .collect()
    }

    /// True when no catalog data has been loaded at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.service_types.is_empty() && self.frequencies.is_empty() && self.options.is_empty()
    }
}

// ============================================================================
// Extras
// ============================================================================

/// One add-on chosen on a draft, with its quantity.
///
/// An entry only exists while `quantity >= 1`; decrementing to zero removes
/// it. The `"other"` sentinel carries free text instead of a catalog price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedExtra {
    /// Catalog option id, or the `"other"` sentinel
    pub option_id: OptionId,
    /// Number of units, at least 1
    pub quantity: u32,
    /// Free text, only meaningful on the `"other"` sentinel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_text: Option<String>,
}

impl SelectedExtra {
    /// A regular catalog extra
    #[must_use]
    pub const fn new(option_id: OptionId, quantity: u32) -> Self {
        Self {
            option_id,
            quantity,
            custom_text: None,
        }
    }

    /// The free-text sentinel extra
    #[must_use]
    pub fn other(text: impl Into<String>) -> Self {
        Self {
            option_id: OptionId::other(),
            quantity: 1,
            custom_text: Some(text.into()),
        }
    }

    /// Whether this entry is the free-text sentinel
    #[must_use]
    pub fn is_other(&self) -> bool {
        self.option_id.is_other()
    }
}

// ============================================================================
// Booking draft
// ============================================================================

/// Contact details captured at the billing step
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    /// Customer first name
    pub first_name: String,
    /// Customer last name
    pub last_name: String,
    /// Customer email address
    pub email: String,
    /// Customer phone number, free-form; digit count is validated
    pub phone: String,
}

/// Service address captured at the billing step
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street and house number
    pub street: String,
    /// City name
    pub city: String,
    /// Postal code of the service address
    pub postal_code: String,
}

/// The client-owned accumulation of a booking in progress.
///
/// Lives only for the duration of one wizard session: merged into by each
/// step, validated as a whole at submission and discarded afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    /// Service postal code as typed by the customer
    pub postal_code: String,
    /// Chosen service type, if any yet
    pub service_type_id: Option<ServiceTypeId>,
    /// Chosen frequency, if any yet
    pub frequency_id: Option<FrequencyId>,
    /// Requested service instant, if any yet
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Chosen add-ons
    pub selected_extras: Vec<SelectedExtra>,
    /// Contact details
    pub contact: ContactInfo,
    /// Service address
    pub address: Address,
}

impl BookingDraft {
    /// Calendar day of the requested service, if a date was picked
    #[must_use]
    pub fn scheduled_day(&self) -> Option<NaiveDate> {
        self.scheduled_at.map(|at| at.date_naive())
    }
}

// ============================================================================
// Booking records
// ============================================================================

/// Lifecycle status of a stored booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Submitted, waiting for a cleaner
    Pending,
    /// A cleaner has been assigned
    Assigned,
    /// Payment proof received
    Paid,
    /// Work confirmed done
    Completed,
    /// Withdrawn before payment
    Cancelled,
}

impl BookingStatus {
    /// Terminal statuses admit no further transition
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Statuses that keep a cleaner occupied
    #[must_use]
    pub const fn occupies_cleaner(self) -> bool {
        matches!(self, Self::Assigned | Self::Paid)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::Paid => "paid",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

/// A booking as stored by the backend.
///
/// `total_price` is the snapshot computed at submission time; later catalog
/// edits never change it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    /// Backend-assigned id
    pub booking_id: BookingId,
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
    /// Price snapshot taken at submission
    pub total_price: f64,
    /// Current lifecycle status
    pub status: BookingStatus,
    /// Assigned cleaner, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_cleaner_id: Option<CleanerId>,
    /// Submission timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BookingRecord {
    /// Calendar day the service is scheduled on
    #[must_use]
    pub fn scheduled_day(&self) -> NaiveDate {
        self.scheduled_at.date_naive()
    }
}

// ============================================================================
// Cleaners
// ============================================================================

/// Availability of a cleaner.
///
/// `Available` and `Occupied` are derived from active assignments
/// (see [`crate::lifecycle::derived_cleaner_status`]); `Inactive` comes
/// from the roster record and always wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanerStatus {
    /// No active assignment
    Available,
    /// At least one booking in assigned or paid status
    Occupied,
    /// Not taking work, regardless of assignments
    Inactive,
}

impl fmt::Display for CleanerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Inactive => "inactive",
        };
        write!(f, "{name}")
    }
}

/// A member of the cleaning staff
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cleaner {
    /// Backend-assigned id
    pub id: CleanerId,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Work email
    pub email: String,
    /// Roster status as stored by the backend
    pub status: CleanerStatus,
}

// ============================================================================
// Proof of payment
// ============================================================================

/// The uploaded artifact that moves a booking from assigned to paid.
///
/// Travels as a multipart file part, never as JSON.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofOfPayment {
    /// Original file name
    pub file_name: String,
    /// MIME type of the upload
    pub content_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl ProofOfPayment {
    /// Builds a proof artifact from an uploaded file
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// A proof with no name or no contents cannot be accepted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_name.trim().is_empty() || self.bytes.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_transparently() {
        let id = BookingId::new("bk-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"bk-42\"");
    }

    #[test]
    fn wire_field_names_are_camel_case() {
        let area = ServiceArea {
            id: ServiceAreaId::new("a1"),
            postal_code: "10115".to_string(),
            area_name: "Mitte".to_string(),
        };
        let json = serde_json::to_value(&area).unwrap();
        assert!(json.get("postalCode").is_some());
        assert!(json.get("areaName").is_some());
    }

    #[test]
    fn booking_status_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&BookingStatus::Assigned).unwrap();
        assert_eq!(json, "\"assigned\"");
        let back: BookingStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, BookingStatus::Cancelled);
    }

    #[test]
    fn other_sentinel_is_recognized() {
        let extra = SelectedExtra::other("clean the balcony");
        assert!(extra.is_other());
        assert_eq!(extra.quantity, 1);
        assert!(!SelectedExtra::new(OptionId::new("opt-1"), 2).is_other());
    }

    #[test]
    fn catalog_lookups_scope_options_by_service_type() {
        let standard = ServiceTypeId::new("standard");
        let deep = ServiceTypeId::new("deep");
        let catalog = Catalog {
            service_types: vec![],
            frequencies: vec![],
            options: vec![
                ServiceOption {
                    id: OptionId::new("fridge"),
                    name: "Inside fridge".to_string(),
                    price_per_unit: 15.0,
                    service_type_id: standard.clone(),
                },
                ServiceOption {
                    id: OptionId::new("walls"),
                    name: "Wall washing".to_string(),
                    price_per_unit: 30.0,
                    service_type_id: deep,
                },
            ],
        };
        let scoped = catalog.options_for(&standard);
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id.as_str(), "fridge");
    }

    #[test]
    fn empty_proof_of_payment_is_detected() {
        assert!(ProofOfPayment::new("receipt.pdf", "application/pdf", vec![]).is_empty());
        assert!(ProofOfPayment::new("  ", "application/pdf", vec![1]).is_empty());
        assert!(!ProofOfPayment::new("receipt.pdf", "application/pdf", vec![1, 2]).is_empty());
    }
}
