//! The four-step booking wizard.
//!
//! `ServiceSelection → AddOns → Billing → Confirmation`, strictly linear.
//! One [`BookingDraft`] accumulates across the steps: every setter merges
//! into it, so navigating backwards never loses data. Advancing runs the
//! step's own rules; the full rule set runs again at submission.

use crate::types::{
    Address, BookingDraft, ContactInfo, FrequencyId, OptionId, SelectedExtra, ServiceTypeId,
};
use crate::validate::{
    ValidationContext, ValidationErrors, validate_billing, validate_draft, validate_extras,
    validate_service_selection,
};
use chrono::{DateTime, Utc};
use std::fmt;

/// The wizard's steps, in order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    /// Postal code, service type, frequency and date
    ServiceSelection,
    /// Optional add-ons
    AddOns,
    /// Contact and address details
    Billing,
    /// Review and submit
    Confirmation,
}

impl WizardStep {
    /// The following step, if any
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::ServiceSelection => Some(Self::AddOns),
            Self::AddOns => Some(Self::Billing),
            Self::Billing => Some(Self::Confirmation),
            Self::Confirmation => None,
        }
    }

    /// The preceding step, if any
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::ServiceSelection => None,
            Self::AddOns => Some(Self::ServiceSelection),
            Self::Billing => Some(Self::AddOns),
            Self::Confirmation => Some(Self::Billing),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ServiceSelection => "service selection",
            Self::AddOns => "add-ons",
            Self::Billing => "billing",
            Self::Confirmation => "confirmation",
        };
        write!(f, "{name}")
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::ServiceSelection
    }
}

/// Owns the draft and the current step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DraftWizard {
    step: WizardStep,
    draft: BookingDraft,
}

impl DraftWizard {
    /// A fresh wizard at the service selection step
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current step
    #[must_use]
    pub const fn step(&self) -> WizardStep {
        self.step
    }

    /// Read access to the accumulated draft
    #[must_use]
    pub const fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    /// Consumes the wizard, yielding the draft
    #[must_use]
    pub fn into_draft(self) -> BookingDraft {
        self.draft
    }

    // ------------------------------------------------------------------
    // Merge setters
    // ------------------------------------------------------------------

    /// Stores the postal code as typed
    pub fn set_postal_code(&mut self, raw: impl Into<String>) {
        self.draft.postal_code = raw.into();
    }

    /// Selects the service type.
    ///
    /// Options are scoped per service type, so changing the selection
    /// discards any extras chosen for the previous one.
    pub fn select_service_type(&mut self, id: ServiceTypeId) {
        if self.draft.service_type_id.as_ref() != Some(&id) {
            self.draft.selected_extras.clear();
        }
        self.draft.service_type_id = Some(id);
    }

    /// Selects the frequency
    pub fn select_frequency(&mut self, id: FrequencyId) {
        self.draft.frequency_id = Some(id);
    }

    /// Sets the requested service instant
    pub fn set_scheduled_at(&mut self, at: DateTime<Utc>) {
        self.draft.scheduled_at = Some(at);
    }

    /// Replaces the contact details
    pub fn set_contact(&mut self, contact: ContactInfo) {
        self.draft.contact = contact;
    }

    /// Replaces the service address
    pub fn set_address(&mut self, address: Address) {
        self.draft.address = address;
    }

    // ------------------------------------------------------------------
    // Extras editing
    // ------------------------------------------------------------------

    /// Adds an extra at quantity 1; adding an already-selected extra
    /// changes nothing.
    pub fn add_extra(&mut self, option_id: OptionId) {
        let exists = self
            .draft
            .selected_extras
            .iter()
            .any(|extra| extra.option_id == option_id);
        if !exists {
            self.draft
                .selected_extras
                .push(SelectedExtra::new(option_id, 1));
        }
    }

    /// Bumps an extra's quantity, selecting it first if needed
    pub fn increment_extra(&mut self, option_id: &OptionId) {
        match self
            .draft
            .selected_extras
            .iter_mut()
            .find(|extra| &extra.option_id == option_id)
        {
            Some(extra) => extra.quantity += 1,
            None => self.add_extra(option_id.clone()),
        }
    }

    /// Lowers an extra's quantity; reaching zero removes the entry and
    /// decrementing an absent extra is a no-op.
    pub fn decrement_extra(&mut self, option_id: &OptionId) {
        if let Some(index) = self
            .draft
            .selected_extras
            .iter()
            .position(|extra| &extra.option_id == option_id)
        {
            let extra = &mut self.draft.selected_extras[index];
            if extra.quantity <= 1 {
                self.draft.selected_extras.remove(index);
            } else {
                extra.quantity -= 1;
            }
        }
    }

    /// Attaches free text to the `"other"` sentinel, selecting it if
    /// needed; empty text removes the sentinel.
    pub fn set_other_note(&mut self, text: impl Into<String>) {
        let text = text.into();
        let position = self
            .draft
            .selected_extras
            .iter()
            .position(SelectedExtra::is_other);
        if text.is_empty() {
            if let Some(index) = position {
                self.draft.selected_extras.remove(index);
            }
            return;
        }
        match position {
            Some(index) => self.draft.selected_extras[index].custom_text = Some(text),
            None => self.draft.selected_extras.push(SelectedExtra::other(text)),
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Moves forward one step if the current step's rules pass.
    /// Advancing from the confirmation step is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the field-keyed map of the current step's failures; the
    /// step does not change.
    pub fn try_advance(
        &mut self,
        ctx: &ValidationContext<'_>,
    ) -> Result<WizardStep, ValidationErrors> {
        match self.step {
            WizardStep::ServiceSelection => validate_service_selection(&self.draft, ctx.postal)?,
            WizardStep::AddOns => validate_extras(&self.draft, ctx.catalog)?,
            WizardStep::Billing => validate_billing(&self.draft)?,
            WizardStep::Confirmation => {}
        }
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Moves back one step, keeping all entered data. Going back from the
    /// first step is a no-op.
    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Runs the full submission rule set against the accumulated draft.
    ///
    /// # Errors
    ///
    /// Returns the combined field-keyed map when any rule fails.
    pub fn validate_for_submission(
        &self,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), ValidationErrors> {
        validate_draft(&self.draft, ctx)
    }
}
