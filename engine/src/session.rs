//! One customer's booking flow, wired to the shared caches.
//!
//! A session owns a [`DraftWizard`] and borrows handles to the engine's
//! catalog, postal and availability state. Setters merge into the draft;
//! advancing and submitting assemble a [`ValidationContext`] from the
//! current snapshots, so the rules always see what the customer sees.
//! The priced total is captured into the submission at the moment of
//! submit and never re-derived afterwards.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tidybook_core::backend::BookingBackend;
use tidybook_core::clock::Clock;
use tidybook_core::postal::PostalMatch;
use tidybook_core::pricing::{self, PriceQuote};
use tidybook_core::types::{
    Address, BookingDraft, BookingRecord, ContactInfo, FrequencyId, OptionId, ServiceTypeId,
};
use tidybook_core::validate::{self, ValidationContext, ValidationErrors};
use tidybook_core::wizard::{DraftWizard, WizardStep};

use crate::availability::AvailabilityManager;
use crate::catalog::CatalogCache;
use crate::error::EngineResult;
use crate::postal::{PostalValidation, PostalValidator};

/// A single booking flow from postal code to submitted record.
///
/// Minted by [`Engine::new_session`](crate::Engine::new_session). Holding
/// `&mut self` on the mutating methods keeps each flow single-writer; the
/// shared caches behind the handles stay live across sessions.
#[derive(Clone)]
pub struct BookingSession {
    wizard: DraftWizard,
    backend: Arc<dyn BookingBackend>,
    catalog: CatalogCache,
    postal: PostalValidator,
    availability: AvailabilityManager,
    clock: Arc<dyn Clock>,
    tax_rate: f64,
}

impl BookingSession {
    pub(crate) fn new(
        backend: Arc<dyn BookingBackend>,
        catalog: CatalogCache,
        postal: PostalValidator,
        availability: AvailabilityManager,
        clock: Arc<dyn Clock>,
        tax_rate: f64,
    ) -> Self {
        Self {
            wizard: DraftWizard::new(),
            backend,
            catalog,
            postal,
            availability,
            clock,
            tax_rate,
        }
    }

    /// The wizard step the customer is on
    #[must_use]
    pub const fn step(&self) -> WizardStep {
        self.wizard.step()
    }

    /// Read access to the accumulated draft
    #[must_use]
    pub const fn draft(&self) -> &BookingDraft {
        self.wizard.draft()
    }

    // ------------------------------------------------------------------
    // Draft edits
    // ------------------------------------------------------------------

    /// Stores the code on the draft and kicks off the debounced area
    /// lookup.
    pub async fn set_postal_code(&mut self, raw: &str) {
        self.wizard.set_postal_code(raw);
        self.postal.input_changed(raw).await;
    }

    /// The debounced lookup state for the typed code
    pub async fn postal_state(&self) -> PostalValidation {
        self.postal.current().await
    }

    /// Checks the draft's postal code immediately, skipping the quiet
    /// period.
    pub async fn check_postal_code(&self) -> PostalMatch {
        let code = self.wizard.draft().postal_code.clone();
        self.postal.validate_now(&code).await
    }

    /// Selects the service type; switching types clears chosen extras
    pub fn select_service_type(&mut self, id: ServiceTypeId) {
        self.wizard.select_service_type(id);
    }

    /// Selects the frequency
    pub fn select_frequency(&mut self, id: FrequencyId) {
        self.wizard.select_frequency(id);
    }

    /// Sets the requested service instant
    pub fn set_scheduled_at(&mut self, at: DateTime<Utc>) {
        self.wizard.set_scheduled_at(at);
    }

    /// Replaces the contact details
    pub fn set_contact(&mut self, contact: ContactInfo) {
        self.wizard.set_contact(contact);
    }

    /// Replaces the service address
    pub fn set_address(&mut self, address: Address) {
        self.wizard.set_address(address);
    }

    /// Adds an extra at quantity 1
    pub fn add_extra(&mut self, option_id: OptionId) {
        self.wizard.add_extra(option_id);
    }

    /// Bumps an extra's quantity, selecting it first if needed
    pub fn increment_extra(&mut self, option_id: &OptionId) {
        self.wizard.increment_extra(option_id);
    }

    /// Lowers an extra's quantity; zero removes the entry
    pub fn decrement_extra(&mut self, option_id: &OptionId) {
        self.wizard.decrement_extra(option_id);
    }

    /// Attaches free text to the `"other"` add-on
    pub fn set_other_note(&mut self, text: impl Into<String>) {
        self.wizard.set_other_note(text);
    }

    // ------------------------------------------------------------------
    // Pricing and navigation
    // ------------------------------------------------------------------

    /// Prices the current draft against the cached catalog
    pub async fn quote(&self) -> PriceQuote {
        let catalog = self.catalog.snapshot().await;
        pricing::quote(self.wizard.draft(), &catalog, self.tax_rate)
    }

    /// Moves forward one step if the current step's rules pass.
    ///
    /// # Errors
    ///
    /// Returns the field-keyed map of the current step's failures; the
    /// step does not change.
    pub async fn try_advance(&mut self) -> Result<WizardStep, ValidationErrors> {
        let postal = self.postal.current().await.result;
        let catalog = self.catalog.snapshot().await;
        let blocked = self.availability.snapshot().await;
        let ctx = ValidationContext {
            postal: &postal,
            catalog: &catalog,
            blocked: &blocked,
            now: self.clock.now(),
        };
        self.wizard.try_advance(&ctx)
    }

    /// Moves back one step, keeping all entered data
    pub fn back(&mut self) -> WizardStep {
        self.wizard.back()
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Runs the full rule set, prices the draft and submits it.
    ///
    /// The rounded grand total is frozen into the submission, so later
    /// catalog edits cannot change what this booking costs. On success
    /// the wizard resets for the next booking; on failure the draft is
    /// left untouched for correction.
    ///
    /// # Errors
    ///
    /// [`EngineError::Validation`](crate::EngineError::Validation) when
    /// any rule fails (nothing is sent), or the backend error when the
    /// submission round-trip fails.
    pub async fn submit(&mut self) -> EngineResult<BookingRecord> {
        let postal = self.postal.current().await.result;
        let catalog = self.catalog.snapshot().await;
        let blocked = self.availability.snapshot().await;
        let ctx = ValidationContext {
            postal: &postal,
            catalog: &catalog,
            blocked: &blocked,
            now: self.clock.now(),
        };
        let total = pricing::quote(self.wizard.draft(), &catalog, self.tax_rate)
            .rounded()
            .grand_total;
        let submission = validate::submission_payload(self.wizard.draft(), &ctx, total)?;

        let record = self.backend.submit_booking(submission).await?;

        self.wizard = DraftWizard::new();
        self.postal.input_changed("").await;
        Ok(record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use tidybook_core::validate::field;
    use tidybook_testing::fixtures::{scheduled_instant, seeded_backend};
    use tidybook_testing::{InMemoryBackend, test_clock};

    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(20);

    async fn session_over(backend: InMemoryBackend) -> (BookingSession, Arc<InMemoryBackend>) {
        let backend = Arc::new(backend);
        let shared: Arc<dyn BookingBackend> = backend.clone();
        let clock = Arc::new(test_clock());
        let catalog = CatalogCache::new(shared.clone(), clock.clone());
        catalog.refresh().await;
        let availability = AvailabilityManager::new(shared.clone());
        availability.refresh().await;
        let postal = PostalValidator::new(shared.clone(), DEBOUNCE);
        let session = BookingSession::new(
            shared,
            catalog,
            postal,
            availability,
            clock,
            pricing::DEFAULT_TAX_RATE,
        );
        (session, backend)
    }

    fn billing_details() -> (ContactInfo, Address) {
        (
            ContactInfo {
                first_name: "Lena".to_string(),
                last_name: "Vogel".to_string(),
                email: "lena@example.com".to_string(),
                phone: "030 1234 5678".to_string(),
            },
            Address {
                street: "Invalidenstr. 12".to_string(),
                city: "Berlin".to_string(),
                postal_code: "10115".to_string(),
            },
        )
    }

    async fn walk_to_confirmation(session: &mut BookingSession) {
        session.set_postal_code("10115").await;
        session.check_postal_code().await;
        session.select_service_type(ServiceTypeId::new("standard"));
        session.select_frequency(FrequencyId::new("weekly"));
        session.set_scheduled_at(scheduled_instant());
        assert_eq!(session.try_advance().await.unwrap(), WizardStep::AddOns);

        session.add_extra(OptionId::new("fridge"));
        session.increment_extra(&OptionId::new("fridge"));
        session.add_extra(OptionId::new("oven"));
        assert_eq!(session.try_advance().await.unwrap(), WizardStep::Billing);

        let (contact, address) = billing_details();
        session.set_contact(contact);
        session.set_address(address);
        assert_eq!(
            session.try_advance().await.unwrap(),
            WizardStep::Confirmation
        );
    }

    #[tokio::test]
    async fn a_full_walk_submits_and_resets_the_wizard() {
        let (mut session, backend) = session_over(seeded_backend()).await;
        walk_to_confirmation(&mut session).await;

        let quote = session.quote().await.rounded();
        assert!((quote.grand_total - 154.0).abs() < 1e-9);

        let record = session.submit().await.unwrap();
        assert!((record.total_price - 154.0).abs() < 1e-9);
        assert_eq!(record.postal_code, "10115");

        // Fresh flow for the next booking
        assert_eq!(session.step(), WizardStep::ServiceSelection);
        assert!(session.draft().postal_code.is_empty());
        assert_eq!(backend.write_call_count(), 1);
    }

    #[tokio::test]
    async fn an_unchecked_postal_code_never_reaches_the_backend() {
        let (mut session, backend) = session_over(seeded_backend()).await;

        // Type the code but submit before the debounced lookup resolves
        session.set_postal_code("10115").await;
        session.select_service_type(ServiceTypeId::new("standard"));
        session.select_frequency(FrequencyId::new("weekly"));
        session.set_scheduled_at(scheduled_instant());
        let (contact, address) = billing_details();
        session.set_contact(contact);
        session.set_address(address);

        let error = session.submit().await.unwrap_err();
        let errors = error.as_validation().unwrap();
        assert!(errors.get(field::POSTAL_CODE).is_some());
        assert_eq!(backend.write_call_count(), 0);
    }

    #[tokio::test]
    async fn a_failed_submission_keeps_the_draft_for_correction() {
        let (mut session, backend) = session_over(seeded_backend()).await;
        walk_to_confirmation(&mut session).await;

        backend.set_offline(true);
        let error = session.submit().await.unwrap_err();
        assert!(!error.is_validation());

        assert_eq!(session.step(), WizardStep::Confirmation);
        assert_eq!(session.draft().postal_code, "10115");
        assert_eq!(session.draft().selected_extras.len(), 2);
    }

    #[tokio::test]
    async fn a_blocked_date_is_rejected_at_submission_time() {
        let backend =
            seeded_backend().with_blocked_dates([scheduled_instant().date_naive()]);
        let (mut session, backend_handle) = session_over(backend).await;
        walk_to_confirmation(&mut session).await;

        let error = session.submit().await.unwrap_err();
        let errors = error.as_validation().unwrap();
        assert!(errors.get(field::SCHEDULED_AT).is_some());
        assert_eq!(backend_handle.write_call_count(), 0);
    }

    #[tokio::test]
    async fn switching_the_service_type_reprices_the_quote() {
        let (mut session, _backend) = session_over(seeded_backend()).await;
        session.select_service_type(ServiceTypeId::new("standard"));
        session.select_frequency(FrequencyId::new("weekly"));
        session.add_extra(OptionId::new("fridge"));

        let standard = session.quote().await.rounded();
        assert!((standard.subtotal - 105.0).abs() < 1e-9);

        session.select_service_type(ServiceTypeId::new("deep"));
        let deep = session.quote().await.rounded();
        // Extras were scoped to the previous type and are gone
        assert!(deep.extras_total.abs() < 1e-9);
        assert!((deep.subtotal - 153.0).abs() < 1e-9);
    }
}
