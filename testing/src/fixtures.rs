//! Canonical test data.
//!
//! One small cleaning-business world shared by the engine and client
//! tests: two service types, four frequencies, a handful of add-ons,
//! three served postal codes and three cleaners. The numbers are chosen
//! so a standard weekly booking with two fridge units and one oven unit
//! prices to a 140.00 subtotal and a 154.00 total at the default tax
//! rate.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Test utilities document panics where critical

use chrono::{DateTime, TimeZone, Utc};
use tidybook_core::types::{
    Address, BookingDraft, BookingId, BookingRecord, BookingStatus, Catalog, Cleaner, CleanerId,
    CleanerStatus, ContactInfo, FrequencyId, OptionId, SelectedExtra, ServiceArea, ServiceAreaId,
    ServiceFrequency, ServiceOption, ServiceType, ServiceTypeId,
};

/// The instant "now" is pinned to in tests: 2025-06-01 12:00:00 UTC
#[must_use]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// A valid service instant nine days after [`test_now`]
#[must_use]
pub fn scheduled_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap()
}

/// The canonical catalog
#[must_use]
pub fn sample_catalog() -> Catalog {
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
        ],
    }
}

/// The served postal codes
#[must_use]
pub fn sample_areas() -> Vec<ServiceArea> {
    vec![
        ServiceArea {
            id: ServiceAreaId::new("area-1"),
            postal_code: "10115".to_string(),
            area_name: "Mitte".to_string(),
        },
        ServiceArea {
            id: ServiceAreaId::new("area-2"),
            postal_code: "10245".to_string(),
            area_name: "Friedrichshain".to_string(),
        },
        ServiceArea {
            id: ServiceAreaId::new("area-3"),
            postal_code: "10437".to_string(),
            area_name: "Prenzlauer Berg".to_string(),
        },
    ]
}

/// The cleaner roster: two active, one inactive
#[must_use]
pub fn sample_cleaners() -> Vec<Cleaner> {
    vec![
        Cleaner {
            id: CleanerId::new("cl-1"),
            first_name: "Ada".to_string(),
            last_name: "Krause".to_string(),
            email: "ada@tidybook.example".to_string(),
            status: CleanerStatus::Available,
        },
        Cleaner {
            id: CleanerId::new("cl-2"),
            first_name: "Ben".to_string(),
            last_name: "Okafor".to_string(),
            email: "ben@tidybook.example".to_string(),
            status: CleanerStatus::Available,
        },
        Cleaner {
            id: CleanerId::new("cl-3"),
            first_name: "Mia".to_string(),
            last_name: "Larsen".to_string(),
            email: "mia@tidybook.example".to_string(),
            status: CleanerStatus::Inactive,
        },
    ]
}

/// A draft that passes every submission rule against the sample world
#[must_use]
pub fn complete_draft() -> BookingDraft {
    BookingDraft {
        postal_code: "10115".to_string(),
        service_type_id: Some(ServiceTypeId::new("standard")),
        frequency_id: Some(FrequencyId::new("weekly")),
        scheduled_at: Some(scheduled_instant()),
        selected_extras: vec![
            SelectedExtra::new(OptionId::new("fridge"), 2),
            SelectedExtra::new(OptionId::new("oven"), 1),
        ],
        contact: ContactInfo {
            first_name: "Lena".to_string(),
            last_name: "Vogel".to_string(),
            email: "lena.vogel@example.com".to_string(),
            phone: "+49 30 1234 5678".to_string(),
        },
        address: Address {
            street: "Invalidenstr. 12".to_string(),
            city: "Berlin".to_string(),
            postal_code: "10115".to_string(),
        },
    }
}

/// A stored booking in the given status, optionally assigned
#[must_use]
pub fn booking_with_status(
    id: &str,
    status: BookingStatus,
    cleaner: Option<&str>,
) -> BookingRecord {
    BookingRecord {
        booking_id: BookingId::new(id),
        postal_code: "10115".to_string(),
        service_type_id: ServiceTypeId::new("standard"),
        frequency_id: FrequencyId::new("weekly"),
        scheduled_at: scheduled_instant(),
        selected_extras: vec![SelectedExtra::new(OptionId::new("fridge"), 2)],
        contact: ContactInfo {
            first_name: "Lena".to_string(),
            last_name: "Vogel".to_string(),
            email: "lena.vogel@example.com".to_string(),
            phone: "+49 30 1234 5678".to_string(),
        },
        address: Address {
            street: "Invalidenstr. 12".to_string(),
            city: "Berlin".to_string(),
            postal_code: "10115".to_string(),
        },
        total_price: 154.0,
        status,
        assigned_cleaner_id: cleaner.map(CleanerId::new),
        created_at: test_now(),
        updated_at: None,
    }
}

/// An [`crate::mocks::InMemoryBackend`] with the whole sample world
/// seeded
#[must_use]
pub fn seeded_backend() -> crate::mocks::InMemoryBackend {
    crate::mocks::InMemoryBackend::new()
        .with_catalog(sample_catalog())
        .with_areas(sample_areas())
        .with_cleaners(sample_cleaners())
}
