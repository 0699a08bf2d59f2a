//! # Tidybook Engine
//!
//! The stateful, async layer over [`tidybook_core`]: live caches for the
//! service catalog and blocked dates, the debounced postal validator,
//! the booking lifecycle manager, the admin write surface and the
//! per-customer booking session.
//!
//! All state lives behind shared handles, so the engine and every
//! session it mints observe the same caches. The remote service is
//! reached only through the [`tidybook_core::backend::BookingBackend`]
//! trait; the HTTP client and the in-memory test double plug in the
//! same way.
//!
//! Reads degrade gracefully: a failed refresh logs a warning and keeps
//! the last known data. Writes surface their errors to the caller and
//! are never retried behind the scenes.
//!
//! ```ignore
//! let backend: Arc<dyn BookingBackend> = Arc::new(client);
//! let engine = Engine::init(EngineConfig::from_env(), backend, Arc::new(SystemClock)).await;
//! let mut session = engine.new_session();
//! session.set_postal_code("10115").await;
//! ```

pub mod admin;
pub mod availability;
pub mod catalog;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod postal;
pub mod session;

pub use admin::CatalogAdmin;
pub use availability::{AvailabilityManager, FreeOutcome};
pub use catalog::{CatalogCache, CatalogSource};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use lifecycle::{CleanerOverview, LifecycleManager};
pub use postal::{PostalValidation, PostalValidator};
pub use session::BookingSession;

use std::sync::Arc;

use tidybook_core::backend::BookingBackend;
use tidybook_core::clock::Clock;

/// The assembled engine: one handle per concern over a shared backend.
///
/// Cloning is cheap and every clone shares the same caches.
#[derive(Clone)]
pub struct Engine {
    config: EngineConfig,
    backend: Arc<dyn BookingBackend>,
    clock: Arc<dyn Clock>,
    catalog: CatalogCache,
    postal: PostalValidator,
    availability: AvailabilityManager,
    lifecycle: LifecycleManager,
    admin: CatalogAdmin,
}

impl Engine {
    /// Wires the managers over the backend without performing any I/O.
    ///
    /// The catalog starts on its built-in fallback and the other caches
    /// start empty until [`Engine::refresh_all`] runs.
    #[must_use]
    pub fn new(
        config: EngineConfig,
        backend: Arc<dyn BookingBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let catalog = CatalogCache::new(backend.clone(), clock.clone());
        let postal = PostalValidator::new(backend.clone(), config.postal_debounce);
        let availability = AvailabilityManager::new(backend.clone());
        let lifecycle = LifecycleManager::new(backend.clone());
        let admin = CatalogAdmin::new(backend.clone(), catalog.clone());
        Self {
            config,
            backend,
            clock,
            catalog,
            postal,
            availability,
            lifecycle,
            admin,
        }
    }

    /// Wires the managers and runs the initial refresh round.
    pub async fn init(
        config: EngineConfig,
        backend: Arc<dyn BookingBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let engine = Self::new(config, backend, clock);
        engine.refresh_all().await;
        engine
    }

    /// Refreshes every read-through cache. Individual failures are
    /// logged by the owning manager and leave its last known data in
    /// place, so this never fails as a whole.
    pub async fn refresh_all(&self) {
        self.catalog.refresh().await;
        self.availability.refresh().await;
        self.lifecycle.refresh().await;
    }

    /// The engine configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The catalog cache
    #[must_use]
    pub const fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// The debounced postal validator
    #[must_use]
    pub const fn postal(&self) -> &PostalValidator {
        &self.postal
    }

    /// The blocked-date manager
    #[must_use]
    pub const fn availability(&self) -> &AvailabilityManager {
        &self.availability
    }

    /// The booking lifecycle manager
    #[must_use]
    pub const fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    /// The catalog and service-area admin surface
    #[must_use]
    pub const fn admin(&self) -> &CatalogAdmin {
        &self.admin
    }

    /// Starts a booking flow over the engine's shared caches
    #[must_use]
    pub fn new_session(&self) -> BookingSession {
        BookingSession::new(
            self.backend.clone(),
            self.catalog.clone(),
            self.postal.clone(),
            self.availability.clone(),
            self.clock.clone(),
            self.config.tax_rate,
        )
    }

    /// Cancels any in-flight postal lookup
    pub async fn dispose(&self) {
        self.postal.dispose().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tidybook_testing::fixtures::seeded_backend;
    use tidybook_testing::{FailingBackend, test_clock};

    use super::*;

    #[tokio::test]
    async fn init_primes_every_cache() {
        let engine = Engine::init(
            EngineConfig::default(),
            Arc::new(seeded_backend()),
            Arc::new(test_clock()),
        )
        .await;

        assert_eq!(engine.catalog().source().await, CatalogSource::Remote);
        assert_eq!(engine.lifecycle().cleaners().await.len(), 3);
        assert!(engine.availability().snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn an_unreachable_backend_still_yields_a_usable_engine() {
        let engine = Engine::init(
            EngineConfig::default(),
            Arc::new(FailingBackend::unreachable()),
            Arc::new(test_clock()),
        )
        .await;

        assert!(engine.catalog().using_fallback().await);
        assert!(!engine.catalog().snapshot().await.service_types.is_empty());
    }

    #[tokio::test]
    async fn sessions_observe_the_engine_postal_state() {
        let engine = Engine::init(
            EngineConfig::default(),
            Arc::new(seeded_backend()),
            Arc::new(test_clock()),
        )
        .await;
        let session = engine.new_session();

        engine.postal().validate_now("10115").await;
        let state = session.postal_state().await;
        assert_eq!(state.result.area_name(), Some("Mitte"));
    }
}
