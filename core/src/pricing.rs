//! Pure price computation.
//!
//! `grand_total = base − base × discount% + extras, plus tax on that
//! subtotal`. All amounts are `f64`: the backend serves prices as JSON
//! numbers and the stored totals are snapshots, so binary floating point
//! is used end to end and only *display* values are rounded to cents.
//! Accumulated sub-cent error over many extras is a known, accepted
//! property of the representation.
//!
//! The functions here never touch the network and never mutate anything;
//! the same draft and catalog always price to the same quote.

use crate::types::{BookingDraft, Catalog, SelectedExtra};

/// Tax rate applied when the caller does not configure one
pub const DEFAULT_TAX_RATE: f64 = 0.10;

/// An itemized price for one draft.
///
/// `subtotal` is intentionally not clamped at zero: a discount percentage
/// above 100 (possible through direct catalog edits) produces a negative
/// subtotal and a negative total. Admin-side validation keeps discounts in
/// [0, 100]; pricing reports whatever the data says.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PriceQuote {
    /// Base price of the chosen service type, 0 while unresolved
    pub base_price: f64,
    /// Absolute discount amount derived from the frequency percentage
    pub frequency_discount: f64,
    /// Sum of all priced add-ons
    pub extras_total: f64,
    /// `base_price - frequency_discount + extras_total`
    pub subtotal: f64,
    /// `subtotal * tax_rate`
    pub tax: f64,
    /// `subtotal + tax`
    pub grand_total: f64,
}

impl PriceQuote {
    /// A copy with every amount rounded to cents, for display
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            base_price: round_to_cents(self.base_price),
            frequency_discount: round_to_cents(self.frequency_discount),
            extras_total: round_to_cents(self.extras_total),
            subtotal: round_to_cents(self.subtotal),
            tax: round_to_cents(self.tax),
            grand_total: round_to_cents(self.grand_total),
        }
    }
}

/// Rounds an amount to two decimal places for display.
///
/// This is presentation rounding only; intermediate math keeps the full
/// `f64` precision.
#[must_use]
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Sum of the priced add-ons on a draft.
///
/// The `"other"` sentinel and option ids missing from the catalog
/// contribute zero.
#[must_use]
pub fn extras_total(extras: &[SelectedExtra], catalog: &Catalog) -> f64 {
    extras
        .iter()
        .filter(|extra| !extra.is_other())
        .filter_map(|extra| {
            catalog
                .option(&extra.option_id)
                .map(|option| option.price_per_unit * f64::from(extra.quantity))
        })
        .sum()
}

/// Prices a draft against a catalog snapshot.
///
/// Unresolved service type or frequency ids contribute zero rather than
/// failing; the caller decides whether an incomplete draft is acceptable.
#[must_use]
pub fn quote(draft: &BookingDraft, catalog: &Catalog, tax_rate: f64) -> PriceQuote {
    let base_price = draft
        .service_type_id
        .as_ref()
        .and_then(|id| catalog.service_type(id))
        .map_or(0.0, |service_type| service_type.base_price);

    let frequency_discount = draft
        .frequency_id
        .as_ref()
        .and_then(|id| catalog.frequency(id))
        .map_or(0.0, |frequency| {
            base_price * frequency.discount_percentage / 100.0
        });

    let extras_total = extras_total(&draft.selected_extras, catalog);
    let subtotal = base_price - frequency_discount + extras_total;
    let tax = subtotal * tax_rate;

    PriceQuote {
        base_price,
        frequency_discount,
        extras_total,
        subtotal,
        tax,
        grand_total: subtotal + tax,
    }
}
