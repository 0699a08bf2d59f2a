//! Draft validation.
//!
//! Everything a submission requires is checked here, synchronously and
//! without touching the network. Failures come back as a field-keyed map
//! so a form can place each message next to its input. Field keys and
//! message texts are part of the contract and covered by tests.

use crate::availability::BlockedDates;
use crate::backend::BookingSubmission;
use crate::postal::PostalMatch;
use crate::types::{BookingDraft, Catalog};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Longest accepted free text on the `"other"` add-on
pub const MAX_OTHER_TEXT_CHARS: usize = 500;
/// Fewest digits a phone number may carry
pub const MIN_PHONE_DIGITS: usize = 10;
/// Most digits a phone number may carry
pub const MAX_PHONE_DIGITS: usize = 15;

/// Field keys used in error maps.
///
/// They mirror the wire field names so a form can address its inputs
/// directly.
pub mod field {
    /// Service postal code input
    pub const POSTAL_CODE: &str = "postalCode";
    /// Service type selection
    pub const SERVICE_TYPE: &str = "serviceTypeId";
    /// Frequency selection
    pub const FREQUENCY: &str = "frequencyId";
    /// Requested service date
    pub const SCHEDULED_AT: &str = "scheduledAt";
    /// Add-on selection as a whole
    pub const EXTRAS: &str = "selectedExtras";
    /// Free text on the `"other"` add-on
    pub const OTHER_TEXT: &str = "customText";
    /// Contact first name
    pub const FIRST_NAME: &str = "firstName";
    /// Contact last name
    pub const LAST_NAME: &str = "lastName";
    /// Contact email
    pub const EMAIL: &str = "email";
    /// Contact phone
    pub const PHONE: &str = "phone";
    /// Address street line
    pub const STREET: &str = "street";
    /// Address city
    pub const CITY: &str = "city";
    /// Address postal code
    pub const ADDRESS_POSTAL_CODE: &str = "addressPostalCode";
    /// Proof-of-payment upload
    pub const PROOF_OF_PAYMENT: &str = "proofOfPayment";
    /// Display name of a catalog entry
    pub const NAME: &str = "name";
    /// Human label of a frequency
    pub const LABEL: &str = "label";
    /// Area name of a service area
    pub const AREA_NAME: &str = "areaName";
    /// Base price of a service type
    pub const BASE_PRICE: &str = "basePrice";
    /// Per-unit price of an add-on
    pub const PRICE_PER_UNIT: &str = "pricePerUnit";
    /// Discount percentage of a frequency
    pub const DISCOUNT_PERCENTAGE: &str = "discountPercentage";
    /// Add-on id in admin operations
    pub const OPTION_ID: &str = "optionId";
}

/// Field-keyed validation failures.
///
/// At most one message per field; the first recorded message wins, the
/// way a form shows one error under each input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    /// An empty map
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }

    /// Records a message for a field unless one is already present
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    /// Folds another map in, keeping existing messages
    pub fn merge(&mut self, other: Self) {
        for (field, message) in other.errors {
            self.errors.entry(field).or_insert(message);
        }
    }

    /// The message recorded for a field, if any
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Iterates `(field, message)` pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// Number of failing fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True when every check passed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    ///
    /// # Errors
    ///
    /// Returns the map itself when it holds at least one message.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: ")?;
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Everything the validators need besides the draft itself
#[derive(Clone, Copy, Debug)]
pub struct ValidationContext<'a> {
    /// Latest postal validation verdict
    pub postal: &'a PostalMatch,
    /// Catalog snapshot the extras are checked against
    pub catalog: &'a Catalog,
    /// Currently blocked days
    pub blocked: &'a BlockedDates,
    /// The current instant
    pub now: DateTime<Utc>,
}

/// Rules for the service selection step: postal coverage plus the three
/// required selections.
///
/// # Errors
///
/// Returns the field-keyed map when any rule fails.
pub fn validate_service_selection(
    draft: &BookingDraft,
    postal: &PostalMatch,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    collect_service_selection(draft, postal, &mut errors);
    errors.into_result()
}

/// Rules for the add-ons step: catalog scoping and the free-text cap.
///
/// # Errors
///
/// Returns the field-keyed map when any rule fails.
pub fn validate_extras(draft: &BookingDraft, catalog: &Catalog) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    collect_extras(draft, catalog, &mut errors);
    errors.into_result()
}

/// Rules for the billing step: contact and address fields.
///
/// # Errors
///
/// Returns the field-keyed map when any rule fails.
pub fn validate_billing(draft: &BookingDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    collect_billing(draft, &mut errors);
    errors.into_result()
}

/// Date rules checked at submission: not in the past, not blocked.
/// Both compare at calendar-day granularity.
///
/// # Errors
///
/// Returns the field-keyed map when any rule fails.
pub fn validate_schedule(
    draft: &BookingDraft,
    blocked: &BlockedDates,
    now: DateTime<Utc>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    collect_schedule(draft, blocked, now, &mut errors);
    errors.into_result()
}

/// Every submission rule at once, evaluated synchronously.
///
/// # Errors
///
/// Returns the combined field-keyed map when any rule fails; an `Err`
/// here means no network call may be made.
pub fn validate_draft(
    draft: &BookingDraft,
    ctx: &ValidationContext<'_>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    collect_service_selection(draft, ctx.postal, &mut errors);
    collect_schedule(draft, ctx.blocked, ctx.now, &mut errors);
    collect_extras(draft, ctx.catalog, &mut errors);
    collect_billing(draft, &mut errors);
    errors.into_result()
}

/// Validates the complete draft and assembles the wire payload, with
/// `total_price` as the stored price snapshot.
///
/// # Errors
///
/// Returns the combined field-keyed map when any rule fails.
pub fn submission_payload(
    draft: &BookingDraft,
    ctx: &ValidationContext<'_>,
    total_price: f64,
) -> Result<BookingSubmission, ValidationErrors> {
    validate_draft(draft, ctx)?;
    match (
        &draft.service_type_id,
        &draft.frequency_id,
        draft.scheduled_at,
    ) {
        (Some(service_type_id), Some(frequency_id), Some(scheduled_at)) => Ok(BookingSubmission {
            postal_code: draft.postal_code.clone(),
            service_type_id: service_type_id.clone(),
            frequency_id: frequency_id.clone(),
            scheduled_at,
            selected_extras: draft.selected_extras.clone(),
            contact: draft.contact.clone(),
            address: draft.address.clone(),
            total_price,
        }),
        _ => {
            // validate_draft reports the missing selections before this
            // arm can be reached
            let mut errors = ValidationErrors::new();
            errors.push(field::SERVICE_TYPE, "Select a service type");
            Err(errors)
        }
    }
}

fn collect_service_selection(
    draft: &BookingDraft,
    postal: &PostalMatch,
    errors: &mut ValidationErrors,
) {
    if draft.postal_code.trim().is_empty() {
        errors.push(field::POSTAL_CODE, "Postal code is required");
    } else {
        match postal {
            PostalMatch::Covered { .. } => {}
            PostalMatch::Unchecked => {
                errors.push(field::POSTAL_CODE, "Postal code has not been checked yet");
            }
            PostalMatch::OutOfArea => {
                errors.push(field::POSTAL_CODE, "Postal code is outside our service area");
            }
        }
    }
    if draft.service_type_id.is_none() {
        errors.push(field::SERVICE_TYPE, "Select a service type");
    }
    if draft.frequency_id.is_none() {
        errors.push(field::FREQUENCY, "Select a cleaning frequency");
    }
    if draft.scheduled_at.is_none() {
        errors.push(field::SCHEDULED_AT, "Pick a service date");
    }
}

fn collect_schedule(
    draft: &BookingDraft,
    blocked: &BlockedDates,
    now: DateTime<Utc>,
    errors: &mut ValidationErrors,
) {
    let Some(day) = draft.scheduled_day() else {
        return;
    };
    if day < now.date_naive() {
        errors.push(field::SCHEDULED_AT, "Scheduled date cannot be in the past");
    } else if blocked.is_blocked(day) {
        errors.push(field::SCHEDULED_AT, "Selected date is unavailable");
    }
}

fn collect_extras(draft: &BookingDraft, catalog: &Catalog, errors: &mut ValidationErrors) {
    for extra in &draft.selected_extras {
        if extra.quantity == 0 {
            errors.push(field::EXTRAS, "Add-on quantity must be at least 1");
            continue;
        }
        if extra.is_other() {
            let text_len = extra
                .custom_text
                .as_ref()
                .map_or(0, |text| text.chars().count());
            if text_len > MAX_OTHER_TEXT_CHARS {
                errors.push(
                    field::OTHER_TEXT,
                    "Custom request must be 500 characters or fewer",
                );
            }
            continue;
        }
        let scoped = draft.service_type_id.as_ref().is_some_and(|selected| {
            catalog
                .option(&extra.option_id)
                .is_some_and(|option| &option.service_type_id == selected)
        });
        if !scoped {
            errors.push(
                field::EXTRAS,
                "Selected add-ons are not available for this service",
            );
        }
    }
}

fn collect_billing(draft: &BookingDraft, errors: &mut ValidationErrors) {
    let contact = &draft.contact;
    if contact.first_name.trim().is_empty() {
        errors.push(field::FIRST_NAME, "First name is required");
    }
    if contact.last_name.trim().is_empty() {
        errors.push(field::LAST_NAME, "Last name is required");
    }
    if contact.email.trim().is_empty() {
        errors.push(field::EMAIL, "Email is required");
    } else if !is_basic_email(contact.email.trim()) {
        errors.push(field::EMAIL, "Enter a valid email address");
    }
    if contact.phone.trim().is_empty() {
        errors.push(field::PHONE, "Phone number is required");
    } else {
        let digits = contact.phone.chars().filter(char::is_ascii_digit).count();
        if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
            errors.push(field::PHONE, "Phone number must contain 10 to 15 digits");
        }
    }
    let address = &draft.address;
    if address.street.trim().is_empty() {
        errors.push(field::STREET, "Street address is required");
    }
    if address.city.trim().is_empty() {
        errors.push(field::CITY, "City is required");
    }
    if address.postal_code.trim().is_empty() {
        errors.push(field::ADDRESS_POSTAL_CODE, "Postal code is required");
    }
}

/// Shape check for `local@domain.tld`; nothing more ambitious.
fn is_basic_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{
        Address, ContactInfo, FrequencyId, OptionId, SelectedExtra, ServiceFrequency,
        ServiceOption, ServiceType, ServiceTypeId,
    };
    use chrono::{NaiveDate, TimeZone, Utc};

    fn catalog() -> Catalog {
        Catalog {
            service_types: vec![ServiceType {
                id: ServiceTypeId::new("standard"),
                name: "Standard cleaning".to_string(),
                description: String::new(),
                base_price: 100.0,
            }],
            frequencies: vec![ServiceFrequency {
                id: FrequencyId::new("weekly"),
                label: "Every week".to_string(),
                discount_percentage: 15.0,
            }],
            options: vec![ServiceOption {
                id: OptionId::new("fridge"),
                name: "Inside fridge".to_string(),
                price_per_unit: 20.0,
                service_type_id: ServiceTypeId::new("standard"),
            }],
        }
    }

    fn complete_draft() -> BookingDraft {
        BookingDraft {
            postal_code: "10115".to_string(),
            service_type_id: Some(ServiceTypeId::new("standard")),
            frequency_id: Some(FrequencyId::new("weekly")),
            scheduled_at: Some(Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap()),
            selected_extras: vec![SelectedExtra::new(OptionId::new("fridge"), 2)],
            contact: ContactInfo {
                first_name: "Ada".to_string(),
                last_name: "Krause".to_string(),
                email: "ada@example.com".to_string(),
                phone: "+49 30 1234 5678".to_string(),
            },
            address: Address {
                street: "Invalidenstr. 12".to_string(),
                city: "Berlin".to_string(),
                postal_code: "10115".to_string(),
            },
        }
    }

    fn covered() -> PostalMatch {
        PostalMatch::Covered {
            area_name: "Mitte".to_string(),
        }
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn complete_draft_passes_every_rule() {
        let draft = complete_draft();
        let postal = covered();
        let blocked = BlockedDates::new();
        let ctx = ValidationContext {
            postal: &postal,
            catalog: &catalog(),
            blocked: &blocked,
            now: now(),
        };
        assert!(validate_draft(&draft, &ctx).is_ok());
    }

    #[test]
    fn submission_payload_carries_the_draft_and_the_snapshot() {
        let draft = complete_draft();
        let postal = covered();
        let blocked = BlockedDates::new();
        let ctx = ValidationContext {
            postal: &postal,
            catalog: &catalog(),
            blocked: &blocked,
            now: now(),
        };

        let payload = submission_payload(&draft, &ctx, 154.0).unwrap();

        assert_eq!(payload.postal_code, "10115");
        assert_eq!(payload.service_type_id, ServiceTypeId::new("standard"));
        assert_eq!(payload.frequency_id, FrequencyId::new("weekly"));
        assert_eq!(payload.selected_extras, draft.selected_extras);
        assert!((payload.total_price - 154.0).abs() < 1e-9);
    }

    #[test]
    fn submission_payload_refuses_an_incomplete_draft() {
        let postal = covered();
        let blocked = BlockedDates::new();
        let ctx = ValidationContext {
            postal: &postal,
            catalog: &catalog(),
            blocked: &blocked,
            now: now(),
        };

        let mut draft = complete_draft();
        draft.frequency_id = None;
        let errors = submission_payload(&draft, &ctx, 0.0).unwrap_err();

        assert_eq!(
            errors.get(field::FREQUENCY),
            Some("Select a cleaning frequency")
        );
    }

    #[test]
    fn every_missing_field_is_reported_at_once() {
        let draft = BookingDraft::default();
        let postal = PostalMatch::Unchecked;
        let blocked = BlockedDates::new();
        let ctx = ValidationContext {
            postal: &postal,
            catalog: &catalog(),
            blocked: &blocked,
            now: now(),
        };
        let errors = validate_draft(&draft, &ctx).unwrap_err();
        assert_eq!(errors.get(field::POSTAL_CODE), Some("Postal code is required"));
        assert_eq!(errors.get(field::SERVICE_TYPE), Some("Select a service type"));
        assert_eq!(errors.get(field::FREQUENCY), Some("Select a cleaning frequency"));
        assert_eq!(errors.get(field::SCHEDULED_AT), Some("Pick a service date"));
        assert_eq!(errors.get(field::FIRST_NAME), Some("First name is required"));
        assert_eq!(errors.get(field::EMAIL), Some("Email is required"));
        assert_eq!(errors.get(field::STREET), Some("Street address is required"));
        assert!(errors.len() >= 8);
    }

    #[test]
    fn out_of_area_postal_code_is_a_field_error() {
        let draft = complete_draft();
        let errors = validate_service_selection(&draft, &PostalMatch::OutOfArea).unwrap_err();
        assert_eq!(
            errors.get(field::POSTAL_CODE),
            Some("Postal code is outside our service area")
        );
    }

    #[test]
    fn unchecked_postal_code_blocks_submission() {
        let draft = complete_draft();
        let errors = validate_service_selection(&draft, &PostalMatch::Unchecked).unwrap_err();
        assert_eq!(
            errors.get(field::POSTAL_CODE),
            Some("Postal code has not been checked yet")
        );
    }

    #[test]
    fn past_dates_are_rejected_at_day_granularity() {
        let mut draft = complete_draft();
        // Earlier on the same calendar day is not "in the past"
        draft.scheduled_at = Some(Utc.with_ymd_and_hms(2025, 6, 1, 6, 0, 0).unwrap());
        assert!(validate_schedule(&draft, &BlockedDates::new(), now()).is_ok());

        draft.scheduled_at = Some(Utc.with_ymd_and_hms(2025, 5, 31, 23, 0, 0).unwrap());
        let errors = validate_schedule(&draft, &BlockedDates::new(), now()).unwrap_err();
        assert_eq!(
            errors.get(field::SCHEDULED_AT),
            Some("Scheduled date cannot be in the past")
        );
    }

    #[test]
    fn blocked_dates_are_rejected() {
        let draft = complete_draft();
        let blocked =
            BlockedDates::from_dates([NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()]);
        let errors = validate_schedule(&draft, &blocked, now()).unwrap_err();
        assert_eq!(
            errors.get(field::SCHEDULED_AT),
            Some("Selected date is unavailable")
        );
    }

    #[test]
    fn extras_must_be_scoped_to_the_selected_service_type() {
        let mut draft = complete_draft();
        draft.selected_extras = vec![SelectedExtra::new(OptionId::new("walls"), 1)];
        let errors = validate_extras(&draft, &catalog()).unwrap_err();
        assert_eq!(
            errors.get(field::EXTRAS),
            Some("Selected add-ons are not available for this service")
        );
    }

    #[test]
    fn other_note_longer_than_the_cap_is_rejected() {
        let mut draft = complete_draft();
        draft.selected_extras = vec![SelectedExtra::other("x".repeat(MAX_OTHER_TEXT_CHARS + 1))];
        let errors = validate_extras(&draft, &catalog()).unwrap_err();
        assert_eq!(
            errors.get(field::OTHER_TEXT),
            Some("Custom request must be 500 characters or fewer")
        );

        draft.selected_extras = vec![SelectedExtra::other("x".repeat(MAX_OTHER_TEXT_CHARS))];
        assert!(validate_extras(&draft, &catalog()).is_ok());
    }

    #[test]
    fn email_shape_is_checked() {
        for bad in ["not-an-email", "a@b", "a@b.", "@b.c", "a b@c.d", "a@@b.c"] {
            let mut draft = complete_draft();
            draft.contact.email = bad.to_string();
            let errors = validate_billing(&draft).unwrap_err();
            assert_eq!(
                errors.get(field::EMAIL),
                Some("Enter a valid email address"),
                "expected rejection for {bad}"
            );
        }
        let mut draft = complete_draft();
        draft.contact.email = "first.last@mail.example.org".to_string();
        assert!(validate_billing(&draft).is_ok());
    }

    #[test]
    fn phone_digit_count_bounds_are_enforced() {
        let mut draft = complete_draft();
        draft.contact.phone = "123-456".to_string();
        let errors = validate_billing(&draft).unwrap_err();
        assert_eq!(
            errors.get(field::PHONE),
            Some("Phone number must contain 10 to 15 digits")
        );

        draft.contact.phone = "+49 (30) 1234-5678".to_string();
        assert!(validate_billing(&draft).is_ok());

        draft.contact.phone = "1".repeat(16);
        assert!(validate_billing(&draft).is_err());
    }

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.push(field::EMAIL, "first");
        errors.push(field::EMAIL, "second");
        assert_eq!(errors.get(field::EMAIL), Some("first"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn display_lists_fields_and_messages() {
        let mut errors = ValidationErrors::new();
        errors.push(field::CITY, "City is required");
        let text = errors.to_string();
        assert!(text.contains("city: City is required"));
    }
}
