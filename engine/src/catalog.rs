//! Catalog cache with a built-in offline fallback.
//!
//! The engine keeps one catalog snapshot in memory and replaces it on
//! explicit [`CatalogCache::refresh`] calls. When a refresh fails the
//! previous snapshot stays in place; before any fetch has succeeded a
//! built-in default offering is served, so the booking form renders even
//! with the service unreachable. Callers read the [`CatalogSource`] to
//! decide whether to show a "prices may be outdated" notice.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tidybook_core::backend::{BackendResult, BookingBackend};
use tidybook_core::clock::Clock;
use tidybook_core::types::{
    Catalog, FrequencyId, OptionId, ServiceFrequency, ServiceOption, ServiceType, ServiceTypeId,
};
use tokio::sync::RwLock;

/// Where the catalog snapshot currently in memory came from
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CatalogSource {
    /// The latest refresh fetched it from the booking service
    Remote,
    /// An earlier successful fetch, kept after a refresh failed
    StaleCache,
    /// The built-in offering; no fetch has succeeded yet
    BuiltinFallback,
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Remote => "remote",
            Self::StaleCache => "stale cache",
            Self::BuiltinFallback => "built-in fallback",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug)]
struct CatalogState {
    catalog: Catalog,
    source: CatalogSource,
    last_refreshed: Option<DateTime<Utc>>,
}

/// Shared, refreshable catalog snapshot
#[derive(Clone)]
pub struct CatalogCache {
    backend: Arc<dyn BookingBackend>,
    clock: Arc<dyn Clock>,
    state: Arc<RwLock<CatalogState>>,
}

impl CatalogCache {
    /// A cache seeded with the built-in offering
    #[must_use]
    pub fn new(backend: Arc<dyn BookingBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            state: Arc::new(RwLock::new(CatalogState {
                catalog: builtin_catalog(),
                source: CatalogSource::BuiltinFallback,
                last_refreshed: None,
            })),
        }
    }

    /// Fetches the catalog lists and replaces the snapshot.
    ///
    /// Never fails: when the backend is unreachable the current snapshot
    /// stays, a remote one downgraded to [`CatalogSource::StaleCache`].
    /// Returns the source the snapshot has after the attempt.
    pub async fn refresh(&self) -> CatalogSource {
        let fetched = self.fetch_catalog().await;
        let mut state = self.state.write().await;
        match fetched {
            Ok(catalog) => {
                state.catalog = catalog;
                state.source = CatalogSource::Remote;
                state.last_refreshed = Some(self.clock.now());
            }
            Err(err) => {
                if state.source == CatalogSource::Remote {
                    state.source = CatalogSource::StaleCache;
                }
                tracing::warn!(
                    error = %err,
                    source = ?state.source,
                    "catalog refresh failed, serving the cached offering"
                );
            }
        }
        state.source
    }

    async fn fetch_catalog(&self) -> BackendResult<Catalog> {
        let service_types = self.backend.service_types().await?;
        let frequencies = self.backend.frequencies().await?;
        let options = self.backend.options().await?;
        Ok(Catalog {
            service_types,
            frequencies,
            options,
        })
    }

    /// A copy of the current catalog
    pub async fn snapshot(&self) -> Catalog {
        self.state.read().await.catalog.clone()
    }

    /// Where the current snapshot came from
    pub async fn source(&self) -> CatalogSource {
        self.state.read().await.source
    }

    /// True while no fetch has ever succeeded
    pub async fn using_fallback(&self) -> bool {
        matches!(
            self.state.read().await.source,
            CatalogSource::BuiltinFallback
        )
    }

    /// When the last successful refresh happened
    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_refreshed
    }
}

/// The default offering served before the first successful fetch
#[must_use]
pub fn builtin_catalog() -> Catalog {
    Catalog {
        service_types: vec![
            ServiceType {
                id: ServiceTypeId::new("standard"),
                name: "Standard cleaning".to_string(),
                description: "Regular upkeep of the whole home".to_string(),
                base_price: 100.0,
            },
            ServiceType {
                id: ServiceTypeId::new("deep"),
                name: "Deep cleaning".to_string(),
                description: "Top-to-bottom scrub including baseboards".to_string(),
                base_price: 180.0,
            },
            ServiceType {
                id: ServiceTypeId::new("move-out"),
                name: "Move-out cleaning".to_string(),
                description: "Empty-home cleaning for handover day".to_string(),
                base_price: 220.0,
            },
        ],
        frequencies: vec![
            ServiceFrequency {
                id: FrequencyId::new("once"),
                label: "One time".to_string(),
                discount_percentage: 0.0,
            },
            ServiceFrequency {
                id: FrequencyId::new("weekly"),
                label: "Every week".to_string(),
                discount_percentage: 15.0,
            },
            ServiceFrequency {
                id: FrequencyId::new("biweekly"),
                label: "Every two weeks".to_string(),
                discount_percentage: 10.0,
            },
            ServiceFrequency {
                id: FrequencyId::new("monthly"),
                label: "Every month".to_string(),
                discount_percentage: 5.0,
            },
        ],
        options: vec![
            ServiceOption {
                id: OptionId::new("fridge"),
                name: "Inside fridge".to_string(),
                price_per_unit: 20.0,
                service_type_id: ServiceTypeId::new("standard"),
            },
            ServiceOption {
                id: OptionId::new("oven"),
                name: "Inside oven".to_string(),
                price_per_unit: 15.0,
                service_type_id: ServiceTypeId::new("standard"),
            },
            ServiceOption {
                id: OptionId::new("windows"),
                name: "Interior windows".to_string(),
                price_per_unit: 10.0,
                service_type_id: ServiceTypeId::new("standard"),
            },
            ServiceOption {
                id: OptionId::new("walls"),
                name: "Wall washing".to_string(),
                price_per_unit: 30.0,
                service_type_id: ServiceTypeId::new("deep"),
            },
            ServiceOption {
                id: OptionId::new("cabinets"),
                name: "Inside cabinets".to_string(),
                price_per_unit: 25.0,
                service_type_id: ServiceTypeId::new("move-out"),
            },
        ],
    }
}
