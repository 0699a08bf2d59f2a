//! Postal code matching against the serviceable areas.
//!
//! Matching is exact string equality after trimming surrounding
//! whitespace. No case folding, no punctuation stripping: the area list is
//! authoritative and the customer's input has to match one of its entries.

use crate::types::ServiceArea;

/// Outcome of checking a postal code against the service areas.
///
/// `Unchecked` is the neutral state for empty input or input that has not
/// been validated yet; it is distinct from a rejection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PostalMatch {
    /// Nothing to check yet, or the check has not run
    #[default]
    Unchecked,
    /// The code matched no serviceable area
    OutOfArea,
    /// The code is covered; carries the matched area's display name
    Covered {
        /// Display name of the matched area
        area_name: String,
    },
}

impl PostalMatch {
    /// True only for a covered postal code
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Covered { .. })
    }

    /// The matched area name, when covered
    #[must_use]
    pub fn area_name(&self) -> Option<&str> {
        match self {
            Self::Covered { area_name } => Some(area_name.as_str()),
            _ => None,
        }
    }

    /// True while no validation has produced a verdict
    #[must_use]
    pub const fn is_unchecked(&self) -> bool {
        matches!(self, Self::Unchecked)
    }
}

/// Matches a raw postal code input against the service areas.
///
/// Whitespace-only input yields [`PostalMatch::Unchecked`]; the same input
/// always yields the same outcome for the same area list.
#[must_use]
pub fn match_postal_code(input: &str, areas: &[ServiceArea]) -> PostalMatch {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return PostalMatch::Unchecked;
    }
    areas
        .iter()
        .find(|area| area.postal_code == trimmed)
        .map_or(PostalMatch::OutOfArea, |area| PostalMatch::Covered {
            area_name: area.area_name.clone(),
        })
}
