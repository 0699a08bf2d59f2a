//! Engine-facing error type.
//!
//! Callers see four kinds of failure: the input was invalid (nothing
//! was sent anywhere), the requested status change is illegal, the
//! booking id is unknown, or the backend call itself went wrong. The
//! `Display` text tells them apart so a caller can show the message
//! as-is.

use thiserror::Error;
use tidybook_core::backend::BackendError;
use tidybook_core::lifecycle::InvalidTransition;
use tidybook_core::types::BookingId;
use tidybook_core::validate::ValidationErrors;

/// Result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Why an engine operation failed
#[derive(Debug, Error)]
pub enum EngineError {
    /// Local rules rejected the input before any request was made
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The status change is not allowed from the booking's current status
    #[error(transparent)]
    Transition(#[from] InvalidTransition),

    /// The booking id is not known locally
    #[error("no booking with id {0}")]
    UnknownBooking(BookingId),

    /// The backend call failed
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl EngineError {
    /// True when local validation rejected the input
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True when the lifecycle rules rejected the status change
    #[must_use]
    pub const fn is_transition(&self) -> bool {
        matches!(self, Self::Transition(_))
    }

    /// The field-keyed failures, when local validation rejected the input
    #[must_use]
    pub const fn as_validation(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_keep_their_field_map() {
        let mut errors = ValidationErrors::new();
        errors.push("email", "Enter a valid email address");
        let error = EngineError::from(errors);

        assert!(error.is_validation());
        let map = error.as_validation().unwrap();
        assert_eq!(map.get("email"), Some("Enter a valid email address"));
    }

    #[test]
    fn display_distinguishes_the_failure_kinds() {
        let mut errors = ValidationErrors::new();
        errors.push("phone", "Phone number is required");
        let validation = EngineError::from(errors);
        assert!(validation.to_string().starts_with("validation failed"));

        let unknown = EngineError::UnknownBooking(BookingId::new("bk-404"));
        assert_eq!(unknown.to_string(), "no booking with id bk-404");
    }
}
