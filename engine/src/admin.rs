//! Validated catalog administration.
//!
//! Thin write wrappers for the staff dashboard: every mutation checks its
//! field bounds locally and only then calls the backend, so a bad form
//! never produces network traffic. Catalog mutations refresh the shared
//! [`CatalogCache`] snapshot on success.

use std::sync::Arc;

use tidybook_core::backend::{
    BookingBackend, NewFrequency, NewServiceArea, NewServiceOption, NewServiceType,
};
use tidybook_core::types::{
    FrequencyId, OptionId, ServiceArea, ServiceAreaId, ServiceFrequency, ServiceOption,
    ServiceType, ServiceTypeId,
};
use tidybook_core::validate::{ValidationErrors, field};

use crate::catalog::CatalogCache;
use crate::error::EngineResult;

/// Validated create, update and delete operations for the offering
#[derive(Clone)]
pub struct CatalogAdmin {
    backend: Arc<dyn BookingBackend>,
    catalog: CatalogCache,
}

impl CatalogAdmin {
    /// An admin surface writing through to `backend` and refreshing
    /// `catalog` after successful mutations
    #[must_use]
    pub const fn new(backend: Arc<dyn BookingBackend>, catalog: CatalogCache) -> Self {
        Self { backend, catalog }
    }

    // ------------------------------------------------------------------
    // Service areas
    // ------------------------------------------------------------------

    /// Creates a service area.
    ///
    /// # Errors
    ///
    /// Field-keyed [`ValidationErrors`] for empty postal code or area
    /// name, or the backend failure.
    pub async fn create_service_area(&self, area: NewServiceArea) -> EngineResult<ServiceArea> {
        check_area(&area)?;
        Ok(self.backend.create_service_area(area).await?)
    }

    /// Replaces a service area's fields.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CatalogAdmin::create_service_area`].
    pub async fn update_service_area(
        &self,
        id: &ServiceAreaId,
        area: NewServiceArea,
    ) -> EngineResult<ServiceArea> {
        check_area(&area)?;
        Ok(self.backend.update_service_area(id, area).await?)
    }

    /// Deletes a service area.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn delete_service_area(&self, id: &ServiceAreaId) -> EngineResult<()> {
        Ok(self.backend.delete_service_area(id).await?)
    }

    // ------------------------------------------------------------------
    // Service types
    // ------------------------------------------------------------------

    /// Creates a service type and refreshes the catalog snapshot.
    ///
    /// # Errors
    ///
    /// Field-keyed [`ValidationErrors`] for an empty name or a negative
    /// or non-finite base price, or the backend failure.
    pub async fn create_service_type(
        &self,
        service_type: NewServiceType,
    ) -> EngineResult<ServiceType> {
        check_service_type(&service_type)?;
        let created = self.backend.create_service_type(service_type).await?;
        self.catalog.refresh().await;
        Ok(created)
    }

    /// Replaces a service type's fields and refreshes the catalog
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CatalogAdmin::create_service_type`].
    pub async fn update_service_type(
        &self,
        id: &ServiceTypeId,
        service_type: NewServiceType,
    ) -> EngineResult<ServiceType> {
        check_service_type(&service_type)?;
        let updated = self.backend.update_service_type(id, service_type).await?;
        self.catalog.refresh().await;
        Ok(updated)
    }

    /// Deletes a service type and refreshes the catalog snapshot.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn delete_service_type(&self, id: &ServiceTypeId) -> EngineResult<()> {
        self.backend.delete_service_type(id).await?;
        self.catalog.refresh().await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Frequencies
    // ------------------------------------------------------------------

    /// Creates a frequency and refreshes the catalog snapshot.
    ///
    /// # Errors
    ///
    /// Field-keyed [`ValidationErrors`] for an empty label or a discount
    /// outside 0 to 100, or the backend failure.
    pub async fn create_frequency(
        &self,
        frequency: NewFrequency,
    ) -> EngineResult<ServiceFrequency> {
        check_frequency(&frequency)?;
        let created = self.backend.create_frequency(frequency).await?;
        self.catalog.refresh().await;
        Ok(created)
    }

    /// Replaces a frequency's fields and refreshes the catalog snapshot.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CatalogAdmin::create_frequency`].
    pub async fn update_frequency(
        &self,
        id: &FrequencyId,
        frequency: NewFrequency,
    ) -> EngineResult<ServiceFrequency> {
        check_frequency(&frequency)?;
        let updated = self.backend.update_frequency(id, frequency).await?;
        self.catalog.refresh().await;
        Ok(updated)
    }

    /// Deletes a frequency and refreshes the catalog snapshot.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn delete_frequency(&self, id: &FrequencyId) -> EngineResult<()> {
        self.backend.delete_frequency(id).await?;
        self.catalog.refresh().await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Add-on options
    // ------------------------------------------------------------------

    /// Creates an add-on option and refreshes the catalog snapshot.
    ///
    /// # Errors
    ///
    /// Field-keyed [`ValidationErrors`] for an empty name, a negative or
    /// non-finite unit price, or a service type the current snapshot does
    /// not know; or the backend failure.
    pub async fn create_option(&self, option: NewServiceOption) -> EngineResult<ServiceOption> {
        self.check_option(&option).await?;
        let created = self.backend.create_option(option).await?;
        self.catalog.refresh().await;
        Ok(created)
    }

    /// Replaces an add-on option's fields and refreshes the catalog
    /// snapshot.
    ///
    /// # Errors
    ///
    /// The failure modes of [`CatalogAdmin::create_option`], plus a
    /// rejection for the reserved `"other"` id.
    pub async fn update_option(
        &self,
        id: &OptionId,
        option: NewServiceOption,
    ) -> EngineResult<ServiceOption> {
        check_not_reserved(id)?;
        self.check_option(&option).await?;
        let updated = self.backend.update_option(id, option).await?;
        self.catalog.refresh().await;
        Ok(updated)
    }

    /// Deletes an add-on option and refreshes the catalog snapshot.
    ///
    /// # Errors
    ///
    /// A rejection for the reserved `"other"` id, or the backend failure.
    pub async fn delete_option(&self, id: &OptionId) -> EngineResult<()> {
        check_not_reserved(id)?;
        self.backend.delete_option(id).await?;
        self.catalog.refresh().await;
        Ok(())
    }

    async fn check_option(&self, option: &NewServiceOption) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if option.name.trim().is_empty() {
            errors.push(field::NAME, "Name is required");
        }
        if !option.price_per_unit.is_finite() || option.price_per_unit < 0.0 {
            errors.push(
                field::PRICE_PER_UNIT,
                "Price per unit must be a non-negative number",
            );
        }
        let snapshot = self.catalog.snapshot().await;
        if snapshot.service_type(&option.service_type_id).is_none() {
            errors.push(field::SERVICE_TYPE, "Unknown service type for this add-on");
        }
        errors.into_result()
    }
}

fn check_area(area: &NewServiceArea) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if area.postal_code.trim().is_empty() {
        errors.push(field::POSTAL_CODE, "Postal code is required");
    }
    if area.area_name.trim().is_empty() {
        errors.push(field::AREA_NAME, "Area name is required");
    }
    errors.into_result()
}

fn check_service_type(service_type: &NewServiceType) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if service_type.name.trim().is_empty() {
        errors.push(field::NAME, "Name is required");
    }
    if !service_type.base_price.is_finite() || service_type.base_price < 0.0 {
        errors.push(
            field::BASE_PRICE,
            "Base price must be a non-negative number",
        );
    }
    errors.into_result()
}

fn check_frequency(frequency: &NewFrequency) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if frequency.label.trim().is_empty() {
        errors.push(field::LABEL, "Label is required");
    }
    if !frequency.discount_percentage.is_finite()
        || !(0.0..=100.0).contains(&frequency.discount_percentage)
    {
        errors.push(
            field::DISCOUNT_PERCENTAGE,
            "Discount must be between 0 and 100",
        );
    }
    errors.into_result()
}

fn check_not_reserved(id: &OptionId) -> Result<(), ValidationErrors> {
    if id.is_other() {
        let mut errors = ValidationErrors::new();
        errors.push(field::OPTION_ID, "The \"other\" add-on is managed automatically");
        return Err(errors);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tidybook_testing::fixtures;
    use tidybook_testing::mocks::{InMemoryBackend, test_clock};

    fn admin_over(backend: &InMemoryBackend) -> CatalogAdmin {
        let shared: Arc<dyn BookingBackend> = Arc::new(backend.clone());
        let catalog = CatalogCache::new(Arc::clone(&shared), Arc::new(test_clock()));
        CatalogAdmin::new(shared, catalog)
    }

    #[tokio::test]
    async fn invalid_service_type_never_reaches_the_backend() {
        let backend = fixtures::seeded_backend();
        let admin = admin_over(&backend);

        let result = admin
            .create_service_type(NewServiceType {
                name: "  ".to_string(),
                description: String::new(),
                base_price: -5.0,
            })
            .await;

        let error = result.unwrap_err();
        let errors = error.as_validation().unwrap();
        assert_eq!(errors.get(field::NAME), Some("Name is required"));
        assert_eq!(
            errors.get(field::BASE_PRICE),
            Some("Base price must be a non-negative number")
        );
        assert_eq!(backend.write_call_count(), 0);
    }

    #[tokio::test]
    async fn valid_service_type_lands_and_refreshes_the_snapshot() {
        let backend = fixtures::seeded_backend();
        let admin = admin_over(&backend);

        let created = admin
            .create_service_type(NewServiceType {
                name: "Office cleaning".to_string(),
                description: "Desks, kitchens and meeting rooms".to_string(),
                base_price: 150.0,
            })
            .await
            .unwrap();

        assert_eq!(created.name, "Office cleaning");
        let snapshot = admin.catalog.snapshot().await;
        assert!(snapshot.service_type(&created.id).is_some());
    }

    #[tokio::test]
    async fn discount_outside_the_percentage_range_is_rejected() {
        let backend = fixtures::seeded_backend();
        let admin = admin_over(&backend);

        let result = admin
            .create_frequency(NewFrequency {
                label: "Twice a day".to_string(),
                discount_percentage: 120.0,
            })
            .await;

        let error = result.unwrap_err();
        assert_eq!(
            error.as_validation().unwrap().get(field::DISCOUNT_PERCENTAGE),
            Some("Discount must be between 0 and 100")
        );
        assert_eq!(backend.write_call_count(), 0);
    }

    #[tokio::test]
    async fn option_must_reference_a_known_service_type() {
        let backend = fixtures::seeded_backend();
        let admin = admin_over(&backend);
        admin.catalog.refresh().await;

        let result = admin
            .create_option(NewServiceOption {
                name: "Balcony".to_string(),
                price_per_unit: 12.0,
                service_type_id: ServiceTypeId::new("garden"),
            })
            .await;

        let error = result.unwrap_err();
        assert_eq!(
            error.as_validation().unwrap().get(field::SERVICE_TYPE),
            Some("Unknown service type for this add-on")
        );
    }

    #[tokio::test]
    async fn the_other_add_on_cannot_be_edited() {
        let backend = fixtures::seeded_backend();
        let admin = admin_over(&backend);

        let result = admin.delete_option(&OptionId::other()).await;

        let error = result.unwrap_err();
        assert!(error.is_validation());
        assert_eq!(backend.write_call_count(), 0);
    }

    #[tokio::test]
    async fn area_writes_validate_but_skip_the_catalog_refresh() {
        let backend = fixtures::seeded_backend();
        let admin = admin_over(&backend);
        let before = admin.catalog.last_refreshed().await;

        admin
            .create_service_area(NewServiceArea {
                postal_code: "20095".to_string(),
                area_name: "Hamburg-Altstadt".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(admin.catalog.last_refreshed().await, before);
        assert_eq!(backend.write_call_count(), 1);
    }
}
