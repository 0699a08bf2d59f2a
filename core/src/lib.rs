//! # Tidybook Core
//!
//! Domain model and pure business rules for the tidybook booking engine.
//!
//! Everything in this crate is synchronous, deterministic and free of
//! I/O, with one deliberate exception: the [`backend::BookingBackend`]
//! trait, which *describes* the remote booking service so the stateful
//! engine crate and the test doubles can share one seam.
//!
//! ## Layout
//!
//! - [`types`]: ids, catalog entities, drafts, records, cleaners
//! - [`pricing`]: quote math over a draft and a catalog snapshot
//! - [`postal`]: postal code matching against the service areas
//! - [`validate`]: the field-keyed submission rules
//! - [`wizard`]: the four-step draft state machine
//! - [`availability`]: blocked-date set and calendar-day annotations
//! - [`lifecycle`]: booking status transitions and cleaner occupancy
//! - [`clock`]: time injection
//! - [`backend`]: the remote service trait and its error type

pub mod availability;
pub mod backend;
pub mod clock;
pub mod lifecycle;
pub mod postal;
pub mod pricing;
pub mod types;
pub mod validate;
pub mod wizard;

// Re-export the types almost every consumer touches
pub use backend::{BackendError, BackendResult, BookingBackend, BookingSubmission};
pub use clock::{Clock, SystemClock};
pub use postal::PostalMatch;
pub use pricing::PriceQuote;
pub use types::{
    BookingDraft, BookingRecord, BookingStatus, Catalog, Cleaner, CleanerStatus, ProofOfPayment,
};
pub use validate::{ValidationContext, ValidationErrors};
pub use wizard::{DraftWizard, WizardStep};
