//! reqwest implementation of the booking backend.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Response, StatusCode, multipart};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tidybook_core::backend::{
    BackendError, BackendResult, BookingBackend, BookingSubmission, NewFrequency, NewServiceArea,
    NewServiceOption, NewServiceType,
};
use tidybook_core::types::{
    BookingId, BookingRecord, Cleaner, CleanerId, FrequencyId, OptionId, ProofOfPayment,
    ServiceArea, ServiceAreaId, ServiceFrequency, ServiceOption, ServiceType, ServiceTypeId,
};

/// Connection settings for [`BookingApiClient`]
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Base URL of the booking service
    pub base_url: String,
    /// Bearer token attached to every request
    pub bearer_token: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            bearer_token: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl ApiConfig {
    /// Settings for the given service URL and token
    #[must_use]
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: bearer_token.into(),
            ..Self::default()
        }
    }

    /// Replaces the per-request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignBody<'a> {
    cleaner_id: &'a CleanerId,
}

#[derive(Serialize, Deserialize)]
struct DatesBody {
    dates: Vec<NaiveDate>,
}

#[derive(Serialize)]
struct DateBody {
    date: NaiveDate,
}

/// Bearer-authenticated HTTP client for the booking service REST API.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Clone)]
pub struct BookingApiClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl BookingApiClient {
    /// Builds a client from the connection settings.
    ///
    /// # Errors
    ///
    /// [`BackendError::InvalidConfig`] when the underlying HTTP client
    /// cannot be constructed from them.
    pub fn new(config: ApiConfig) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> BackendResult<Response> {
        let response = request
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        check_status(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let response = self.execute(self.http.get(self.url(path))).await?;
        read_json(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> BackendResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.http.post(self.url(path)).json(body))
            .await?;
        read_json(response).await
    }

    async fn post_and_drop<B: Serialize + Sync>(&self, path: &str, body: &B) -> BackendResult<()> {
        self.execute(self.http.post(self.url(path)).json(body))
            .await?;
        Ok(())
    }

    async fn post_action<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let response = self.execute(self.http.post(self.url(path))).await?;
        read_json(response).await
    }

    async fn post_drop(&self, path: &str) -> BackendResult<()> {
        self.execute(self.http.post(self.url(path))).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> BackendResult<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(BackendError::Unauthorized),
        status => {
            let message = response.text().await.unwrap_or_default();
            Err(BackendError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| BackendError::Decode(e.to_string()))
}

#[async_trait]
impl BookingBackend for BookingApiClient {
    async fn service_areas(&self) -> BackendResult<Vec<ServiceArea>> {
        self.get("/service-areas").await
    }

    async fn create_service_area(&self, area: NewServiceArea) -> BackendResult<ServiceArea> {
        self.post("/service-areas", &area).await
    }

    async fn update_service_area(
        &self,
        id: &ServiceAreaId,
        area: NewServiceArea,
    ) -> BackendResult<ServiceArea> {
        self.post(&format!("/service-areas/edit/{id}"), &area).await
    }

    async fn delete_service_area(&self, id: &ServiceAreaId) -> BackendResult<()> {
        self.post_drop(&format!("/service-areas/delete/{id}")).await
    }

    async fn service_types(&self) -> BackendResult<Vec<ServiceType>> {
        self.get("/service-types").await
    }

    async fn create_service_type(
        &self,
        service_type: NewServiceType,
    ) -> BackendResult<ServiceType> {
        self.post("/service-types", &service_type).await
    }

    async fn update_service_type(
        &self,
        id: &ServiceTypeId,
        service_type: NewServiceType,
    ) -> BackendResult<ServiceType> {
        self.post(&format!("/service-types/edit/{id}"), &service_type)
            .await
    }

    async fn delete_service_type(&self, id: &ServiceTypeId) -> BackendResult<()> {
        self.post_drop(&format!("/service-types/delete/{id}")).await
    }

    async fn frequencies(&self) -> BackendResult<Vec<ServiceFrequency>> {
        self.get("/service-frequencies").await
    }

    async fn create_frequency(&self, frequency: NewFrequency) -> BackendResult<ServiceFrequency> {
        self.post("/service-frequencies", &frequency).await
    }

    async fn update_frequency(
        &self,
        id: &FrequencyId,
        frequency: NewFrequency,
    ) -> BackendResult<ServiceFrequency> {
        self.post(&format!("/service-frequencies/edit/{id}"), &frequency)
            .await
    }

    async fn delete_frequency(&self, id: &FrequencyId) -> BackendResult<()> {
        self.post_drop(&format!("/service-frequencies/delete/{id}"))
            .await
    }

    async fn options(&self) -> BackendResult<Vec<ServiceOption>> {
        self.get("/service-options").await
    }

    async fn create_option(&self, option: NewServiceOption) -> BackendResult<ServiceOption> {
        self.post("/service-options", &option).await
    }

    async fn update_option(
        &self,
        id: &OptionId,
        option: NewServiceOption,
    ) -> BackendResult<ServiceOption> {
        self.post(&format!("/service-options/edit/{id}"), &option)
            .await
    }

    async fn delete_option(&self, id: &OptionId) -> BackendResult<()> {
        self.post_drop(&format!("/service-options/delete/{id}"))
            .await
    }

    async fn bookings(&self) -> BackendResult<Vec<BookingRecord>> {
        self.get("/bookings").await
    }

    async fn assigned_bookings(
        &self,
        cleaner_id: &CleanerId,
    ) -> BackendResult<Vec<BookingRecord>> {
        let request = self
            .http
            .get(self.url("/bookings/assigned"))
            .query(&[("cleanerId", cleaner_id.as_str())]);
        let response = self.execute(request).await?;
        read_json(response).await
    }

    async fn submit_booking(&self, submission: BookingSubmission) -> BackendResult<BookingRecord> {
        self.post("/bookings", &submission).await
    }

    async fn assign_booking(
        &self,
        id: &BookingId,
        cleaner_id: &CleanerId,
    ) -> BackendResult<BookingRecord> {
        self.post(&format!("/bookings/{id}/assign"), &AssignBody { cleaner_id })
            .await
    }

    async fn mark_booking_paid(
        &self,
        id: &BookingId,
        proof: ProofOfPayment,
    ) -> BackendResult<BookingRecord> {
        let part = multipart::Part::bytes(proof.bytes)
            .file_name(proof.file_name)
            .mime_str(&proof.content_type)
            .map_err(|e| BackendError::InvalidConfig(format!("unusable proof part: {e}")))?;
        let form = multipart::Form::new().part("proof", part);
        let request = self
            .http
            .post(self.url(&format!("/bookings/{id}/mark-paid")))
            .multipart(form);
        let response = self.execute(request).await?;
        read_json(response).await
    }

    async fn complete_booking(&self, id: &BookingId) -> BackendResult<BookingRecord> {
        self.post_action(&format!("/bookings/{id}/complete")).await
    }

    async fn cancel_booking(&self, id: &BookingId) -> BackendResult<BookingRecord> {
        self.post_action(&format!("/bookings/{id}/cancel")).await
    }

    async fn cleaners(&self) -> BackendResult<Vec<Cleaner>> {
        self.get("/cleaners").await
    }

    async fn blocked_dates(&self) -> BackendResult<Vec<NaiveDate>> {
        let body: DatesBody = self.get("/calendar/blocked-dates").await?;
        Ok(body.dates)
    }

    async fn replace_blocked_dates(&self, dates: Vec<NaiveDate>) -> BackendResult<()> {
        self.post_and_drop("/calendar/blocked-dates", &DatesBody { dates })
            .await
    }

    async fn free_blocked_date(&self, date: NaiveDate) -> BackendResult<()> {
        let request = self
            .http
            .delete(self.url("/calendar/blocked-dates"))
            .json(&DateBody { date });
        self.execute(request).await?;
        Ok(())
    }
}
