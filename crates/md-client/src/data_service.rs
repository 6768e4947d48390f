//! Data access for the web client
//!
//! Jobs, customers, stock, colors and documents go to the REST API. The
//! remaining screens read the cached mock dataset (see [`crate::mock`]).

use std::sync::Arc;

use md_core::config::ClientConfig;
use md_core::types::{now_iso, now_millis};
use md_models::{
    ApprovalStart, AssemblyCompleteRequest, AssemblyScheduleRequest, Color, ColorInput, Customer,
    CustomerInput, Document, FinanceClose, Job, JobCreate, JobLog, JobLogInput, JobRole,
    JobRoleInput, MeasureUpdate, MovementInput, OfferUpdate, ProductionUpdate, PurchaseOrder,
    Reservation, StatusUpdate, StockItem, StockItemInput, StockLine, StockMovement, StockUpdate,
};
use reqwest::{multipart, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::local::ReservationOptions;
use crate::mock::{keys, MockCache, MockData};

/// Name given to a job role created without one
const DEFAULT_ROLE_NAME: &str = "Yeni İş Kolu";

/// Answer to a manual stock movement
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MovementResult {
    pub item: StockItem,
    pub movement: StockMovement,
}

/// File sent to `/documents/upload`
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct DataService {
    base: String,
    http: reqwest::Client,
    mock: Arc<MockCache>,
}

impl DataService {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Self::with_urls(&config.api_url, &config.mock_data_url())
    }

    pub fn with_urls(api_url: &str, mock_data_url: &str) -> ClientResult<Self> {
        Url::parse(api_url)?;
        let http = reqwest::Client::new();
        Ok(Self {
            base: api_url.trim_end_matches('/').to_string(),
            mock: Arc::new(MockCache::new(http.clone(), mock_data_url)),
            http,
        })
    }

    /// Use an already loaded dataset instead of fetching one
    pub fn with_mock(mut self, data: MockData) -> Self {
        self.mock = Arc::new(MockCache::preloaded(data));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn mock(&self) -> &MockCache {
        &self.mock
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Send a request and decode the JSON answer
    #[instrument(skip(self, body), fields(base = %self.base))]
    pub async fn fetch_json<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self
            .http
            .request(method, self.url(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.fetch_json::<T, ()>(Method::GET, path, None).await
    }

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.fetch_json(method, path, Some(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.fetch_json::<T, ()>(Method::DELETE, path, None).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let detail = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("detail").cloned())
            .and_then(|detail| match detail {
                Value::String(text) if !text.is_empty() => Some(text),
                Value::Null | Value::String(_) => None,
                other => Some(other.to_string()),
            });
        let message = detail.unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string())
        });
        debug!(status = status.as_u16(), %message, "API request failed");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // Jobs

    pub async fn get_jobs(&self) -> ClientResult<Vec<Job>> {
        self.get("/jobs").await
    }

    pub async fn get_job(&self, id: &str) -> ClientResult<Job> {
        self.get(&format!("/jobs/{}", id)).await
    }

    pub async fn create_job(&self, payload: &JobCreate) -> ClientResult<Job> {
        self.send(Method::POST, "/jobs", payload).await
    }

    pub async fn update_job_measure(&self, id: &str, payload: &MeasureUpdate) -> ClientResult<Job> {
        self.send(Method::PUT, &format!("/jobs/{}/measure", id), payload)
            .await
    }

    pub async fn update_job_offer(&self, id: &str, payload: &OfferUpdate) -> ClientResult<Job> {
        self.send(Method::PUT, &format!("/jobs/{}/offer", id), payload)
            .await
    }

    pub async fn start_job_approval(&self, id: &str, payload: &ApprovalStart) -> ClientResult<Job> {
        self.send(Method::POST, &format!("/jobs/{}/approval/start", id), payload)
            .await
    }

    pub async fn update_stock_status(&self, id: &str, payload: &StockUpdate) -> ClientResult<Job> {
        self.send(Method::PUT, &format!("/jobs/{}/stock", id), payload)
            .await
    }

    pub async fn update_production_status(
        &self,
        id: &str,
        payload: &ProductionUpdate,
    ) -> ClientResult<Job> {
        self.send(Method::PUT, &format!("/jobs/{}/production", id), payload)
            .await
    }

    pub async fn schedule_assembly(
        &self,
        id: &str,
        payload: &AssemblyScheduleRequest,
    ) -> ClientResult<Job> {
        self.send(Method::PUT, &format!("/jobs/{}/assembly/schedule", id), payload)
            .await
    }

    pub async fn complete_assembly(
        &self,
        id: &str,
        payload: &AssemblyCompleteRequest,
    ) -> ClientResult<Job> {
        self.send(Method::PUT, &format!("/jobs/{}/assembly/complete", id), payload)
            .await
    }

    pub async fn close_finance(&self, id: &str, payload: &FinanceClose) -> ClientResult<Job> {
        self.send(Method::PUT, &format!("/jobs/{}/finance/close", id), payload)
            .await
    }

    pub async fn update_job_status(&self, id: &str, payload: &StatusUpdate) -> ClientResult<Job> {
        self.send(Method::PUT, &format!("/jobs/{}/status", id), payload)
            .await
    }

    // Customers

    pub async fn get_customers(&self) -> ClientResult<Vec<Customer>> {
        self.get("/customers").await
    }

    pub async fn create_customer(&self, payload: &CustomerInput) -> ClientResult<Customer> {
        self.send(Method::POST, "/customers", payload).await
    }

    pub async fn update_customer(&self, id: &str, payload: &CustomerInput) -> ClientResult<Customer> {
        self.send(Method::PUT, &format!("/customers/{}", id), payload)
            .await
    }

    /// Returns `{id, deleted}`
    pub async fn soft_delete_customer(&self, id: &str) -> ClientResult<Value> {
        self.delete(&format!("/customers/{}", id)).await
    }

    // Stock

    /// Stock items from the API, or from the mock dataset when the API fails
    pub async fn get_stock_items(&self) -> ClientResult<Vec<StockItem>> {
        match self.get("/stock/items").await {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!(error = %e, "API stock items failed, falling back to mock data");
                Ok(self.mock.load().await?.collection(keys::STOCK_ITEMS))
            }
        }
    }

    pub async fn create_stock_item(&self, payload: &StockItemInput) -> ClientResult<StockItem> {
        self.send(Method::POST, "/stock/items", payload).await
    }

    pub async fn update_stock_item(&self, id: &str, payload: &StockItemInput) -> ClientResult<StockItem> {
        self.send(Method::PUT, &format!("/stock/items/{}", id), payload)
            .await
    }

    /// Returns `{success, id}`
    pub async fn delete_stock_item(&self, id: &str) -> ClientResult<Value> {
        self.delete(&format!("/stock/items/{}", id)).await
    }

    pub async fn create_stock_movement(&self, payload: &MovementInput) -> ClientResult<MovementResult> {
        self.send(Method::POST, "/stock/movements", payload).await
    }

    /// Movement ledger from the API, or from the mock dataset when the API fails
    pub async fn get_stock_movements(&self) -> ClientResult<Vec<StockMovement>> {
        match self.get("/stock/movements").await {
            Ok(movements) => Ok(movements),
            Err(e) => {
                warn!(error = %e, "API stock movements failed, falling back to mock data");
                Ok(self.mock.load().await?.collection(keys::STOCK_MOVEMENTS))
            }
        }
    }

    // Colors

    pub async fn get_colors(&self) -> ClientResult<Vec<Color>> {
        self.get("/colors/").await
    }

    pub async fn create_color(&self, payload: &ColorInput) -> ClientResult<Color> {
        self.send(Method::POST, "/colors/", payload).await
    }

    pub async fn update_color(&self, id: &str, payload: &ColorInput) -> ClientResult<Color> {
        self.send(Method::PUT, &format!("/colors/{}", id), payload)
            .await
    }

    pub async fn delete_color(&self, id: &str) -> ClientResult<Value> {
        self.delete(&format!("/colors/{}", id)).await
    }

    // Documents

    pub async fn get_documents(
        &self,
        job_id: Option<&str>,
        doc_type: Option<&str>,
    ) -> ClientResult<Vec<Document>> {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(job_id) = job_id.filter(|v| !v.is_empty()) {
            query.append_pair("job_id", job_id);
        }
        if let Some(doc_type) = doc_type.filter(|v| !v.is_empty()) {
            query.append_pair("doc_type", doc_type);
        }
        let query = query.finish();
        if query.is_empty() {
            self.get("/documents").await
        } else {
            self.get(&format!("/documents?{}", query)).await
        }
    }

    pub async fn get_job_documents(&self, job_id: &str) -> ClientResult<Vec<Document>> {
        self.get(&format!("/documents/job/{}", job_id)).await
    }

    #[instrument(skip(self, file), fields(file = %file.name, size = file.data.len()))]
    pub async fn upload_document(
        &self,
        file: UploadFile,
        job_id: &str,
        doc_type: &str,
        description: Option<&str>,
    ) -> ClientResult<Document> {
        let mut part = multipart::Part::bytes(file.data).file_name(file.name);
        if let Some(content_type) = file.content_type {
            part = part.mime_str(&content_type)?;
        }
        let mut form = multipart::Form::new()
            .part("file", part)
            .text("jobId", job_id.to_string())
            .text("docType", doc_type.to_string());
        if let Some(description) = description.filter(|d| !d.is_empty()) {
            form = form.text("description", description.to_string());
        }

        let response = self
            .http
            .post(self.url("/documents/upload"))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Returns `{success, id}`
    pub async fn delete_document(&self, id: &str) -> ClientResult<Value> {
        self.delete(&format!("/documents/{}", id)).await
    }

    pub fn document_download_url(&self, id: &str) -> String {
        self.url(&format!("/documents/{}/download", id))
    }

    // Mock-backed screens

    pub async fn get_dashboard_data(&self) -> ClientResult<Value> {
        Ok(self.mock.load().await?.dashboard())
    }

    pub async fn get_tasks(&self) -> ClientResult<Vec<Value>> {
        self.mock_list(keys::TASKS).await
    }

    pub async fn get_planning_events(&self) -> ClientResult<Vec<Value>> {
        self.mock_list(keys::PLANNING_EVENTS).await
    }

    pub async fn get_reservations(&self) -> ClientResult<Vec<Reservation>> {
        Ok(self.mock.load().await?.collection(keys::RESERVATIONS))
    }

    pub async fn get_purchase_orders(&self) -> ClientResult<Vec<PurchaseOrder>> {
        Ok(self.mock.load().await?.collection(keys::PURCHASE_ORDERS))
    }

    pub async fn get_suppliers(&self) -> ClientResult<Vec<Value>> {
        self.mock_list(keys::SUPPLIERS).await
    }

    pub async fn get_requests(&self) -> ClientResult<Vec<Value>> {
        self.mock_list(keys::REQUESTS).await
    }

    pub async fn get_invoices(&self) -> ClientResult<Vec<Value>> {
        self.mock_list(keys::INVOICES).await
    }

    pub async fn get_payments(&self) -> ClientResult<Vec<Value>> {
        self.mock_list(keys::PAYMENTS).await
    }

    pub async fn get_archive_files(&self) -> ClientResult<Vec<Value>> {
        self.mock_list(keys::ARCHIVE_FILES).await
    }

    pub async fn get_reports(&self) -> ClientResult<Vec<Value>> {
        self.mock_list(keys::REPORTS).await
    }

    pub async fn get_settings(&self) -> ClientResult<Vec<Value>> {
        self.mock_list(keys::SETTINGS).await
    }

    async fn mock_list(&self, key: &str) -> ClientResult<Vec<Value>> {
        Ok(self.mock.load().await?.list(key))
    }

    // Job activity log

    pub async fn get_job_logs(&self, job_id: &str) -> ClientResult<Vec<JobLog>> {
        let logs: Vec<JobLog> = self.mock.load().await?.collection(keys::JOB_LOGS);
        Ok(logs.into_iter().filter(|log| log.job_id == job_id).collect())
    }

    /// Prepend an entry to the job log
    pub async fn add_job_log(&self, input: JobLogInput) -> ClientResult<JobLog> {
        let entry = JobLog {
            id: input
                .id
                .unwrap_or_else(|| format!("LOG-{}", now_millis())),
            job_id: input.job_id,
            action: input.action.unwrap_or_else(|| "log".to_string()),
            detail: input.detail.unwrap_or_default(),
            created_at: input.created_at.unwrap_or_else(now_iso),
            meta: input.meta.unwrap_or_else(|| Value::Object(Map::new())),
        };

        self.mock
            .update(|data| data.prepend(keys::JOB_LOGS, &entry))
            .await?;
        Ok(entry)
    }

    // Job roles

    pub async fn get_job_roles(&self) -> ClientResult<Vec<JobRole>> {
        Ok(self.mock.load().await?.collection(keys::JOB_ROLES))
    }

    pub async fn create_job_role(&self, input: JobRoleInput) -> ClientResult<JobRole> {
        let role = JobRole {
            id: input
                .id
                .unwrap_or_else(|| format!("ROLE-{}", now_millis())),
            name: input
                .name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_ROLE_NAME.to_string()),
            description: input.description.unwrap_or_default(),
        };

        self.mock
            .update(|data| data.prepend(keys::JOB_ROLES, &role))
            .await?;
        Ok(role)
    }

    /// Update name and/or description; `None` when no role has `id`
    pub async fn update_job_role(&self, id: &str, input: JobRoleInput) -> ClientResult<Option<JobRole>> {
        self.mock
            .update(|data| {
                data.update_entry(keys::JOB_ROLES, id, |role: &mut JobRole| {
                    if let Some(name) = input.name {
                        role.name = name;
                    }
                    if let Some(description) = input.description {
                        role.description = description;
                    }
                })
            })
            .await
    }

    pub async fn delete_job_role(&self, id: &str) -> ClientResult<bool> {
        self.mock
            .update(|data| {
                data.remove_entry(keys::JOB_ROLES, id);
                true
            })
            .await
    }

    // Local reconciliation; all of these do nothing until the dataset is cached

    pub fn apply_local_stock_reservation(&self, lines: &[StockLine], options: &ReservationOptions) {
        self.mock
            .with_loaded(|data| data.apply_stock_reservation(lines, options));
    }

    pub fn apply_local_job_patch(&self, job_id: &str, patch: &Map<String, Value>) {
        self.mock.with_loaded(|data| data.patch_job(job_id, patch));
    }

    pub fn create_local_purchase_orders(
        &self,
        job_id: &str,
        lines: &[StockLine],
    ) -> Option<PurchaseOrder> {
        self.mock
            .with_loaded(|data| data.add_purchase_order(job_id, lines))
    }
}
