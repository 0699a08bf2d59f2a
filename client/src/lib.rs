//! # Tidybook Client
//!
//! reqwest implementation of
//! [`tidybook_core::backend::BookingBackend`] against the booking
//! service's bearer-token REST API. The engine consumes it behind
//! `Arc<dyn BookingBackend>`, interchangeably with the in-memory test
//! double.
//!
//! ## Example
//!
//! ```no_run
//! use tidybook_client::{ApiConfig, BookingApiClient};
//! use tidybook_core::backend::BookingBackend;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig::new("https://api.tidybook.example", "secret-token");
//! let client = BookingApiClient::new(config)?;
//! let areas = client.service_areas().await?;
//! println!("serving {} areas", areas.len());
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::{ApiConfig, BookingApiClient};
