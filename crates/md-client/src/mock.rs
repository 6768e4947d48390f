//! Mock dataset
//!
//! Screens the REST API does not serve yet read from one JSON document
//! (`mockData.json`). It is fetched once per [`MockCache`] and then edited in
//! place by the local helpers.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

pub mod keys {
    pub const JOBS: &str = "jobs";
    pub const JOB_LOGS: &str = "jobLogs";
    pub const JOB_ROLES: &str = "jobRoles";
    pub const STOCK_ITEMS: &str = "stockItems";
    pub const STOCK_MOVEMENTS: &str = "stockMovements";
    pub const RESERVATIONS: &str = "reservations";
    pub const PURCHASE_ORDERS: &str = "purchaseOrders";
    pub const SUPPLIERS: &str = "suppliers";
    pub const REQUESTS: &str = "requests";
    pub const INVOICES: &str = "invoices";
    pub const PAYMENTS: &str = "payments";
    pub const ARCHIVE_FILES: &str = "archiveFiles";
    pub const REPORTS: &str = "reports";
    pub const SETTINGS: &str = "settings";
    pub const TASKS: &str = "tasks";
    pub const PLANNING_EVENTS: &str = "planningEvents";

    /// Keys that make up the dashboard view
    pub const DASHBOARD: [&str; 6] = [
        "stats",
        "activities",
        "priorityJobs",
        "weekOverview",
        "paymentStatus",
        "teamStatus",
    ];
}

/// The dataset as a JSON object keyed by collection name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockData {
    root: Map<String, Value>,
}

impl MockData {
    pub fn new(root: Map<String, Value>) -> Self {
        Self { root }
    }

    pub fn from_value(value: Value) -> ClientResult<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(ClientError::MockData(format!(
                "expected a JSON object, got {}",
                type_name(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Raw collection; missing or non-array keys read as empty
    pub fn list(&self, key: &str) -> Vec<Value> {
        match self.root.get(key) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// Typed collection; entries that do not decode are skipped
    pub fn collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.list(key)
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(key, error = %e, "Skipping malformed mock entry");
                    None
                }
            })
            .collect()
    }

    pub fn set_value(&mut self, key: &str, value: Value) {
        self.root.insert(key.to_string(), value);
    }

    /// Insert `record` at the front of a collection, leaving the other
    /// entries as they are. Returns false when the record does not encode.
    pub fn prepend<T: Serialize>(&mut self, key: &str, record: &T) -> bool {
        let entry = match serde_json::to_value(record) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "Could not encode mock entry");
                return false;
            }
        };
        let mut entries = self.list(key);
        entries.insert(0, entry);
        self.set_value(key, Value::Array(entries));
        true
    }

    /// Apply `edit` to the entry whose `id` matches and return it.
    ///
    /// Only that entry is decoded; the fields `T` writes back are merged
    /// over the stored ones so fields `T` does not model are kept.
    pub fn update_entry<T, F>(&mut self, key: &str, id: &str, edit: F) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let mut entries = self.list(key);
        let slot = entries.iter_mut().find(|entry| entry_id(entry) == Some(id))?;

        let mut record: T = match serde_json::from_value(slot.clone()) {
            Ok(record) => record,
            Err(e) => {
                warn!(key, id, error = %e, "Mock entry does not decode; leaving it as is");
                return None;
            }
        };
        edit(&mut record);

        match (serde_json::to_value(&record), slot) {
            (Ok(Value::Object(fields)), Value::Object(stored)) => stored.extend(fields),
            (Ok(_), _) => return None,
            (Err(e), _) => {
                warn!(key, id, error = %e, "Could not encode mock entry");
                return None;
            }
        }
        self.set_value(key, Value::Array(entries));
        Some(record)
    }

    /// Drop entries whose `id` matches; returns how many were removed
    pub fn remove_entry(&mut self, key: &str, id: &str) -> usize {
        let mut entries = self.list(key);
        let before = entries.len();
        entries.retain(|entry| entry_id(entry) != Some(id));
        let removed = before - entries.len();
        if removed > 0 {
            self.set_value(key, Value::Array(entries));
        }
        removed
    }

    /// The dashboard keys, `null` where absent
    pub fn dashboard(&self) -> Value {
        let map = keys::DASHBOARD
            .iter()
            .map(|key| {
                (
                    key.to_string(),
                    self.root.get(*key).cloned().unwrap_or(Value::Null),
                )
            })
            .collect();
        Value::Object(map)
    }
}

pub(crate) fn entry_id(entry: &Value) -> Option<&str> {
    entry.get("id").and_then(Value::as_str)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Lazily loaded, shared copy of the mock dataset.
///
/// Concurrent first loads wait on one fetch; a failed fetch is not cached so
/// the next call tries again.
pub struct MockCache {
    url: String,
    http: reqwest::Client,
    data: RwLock<Option<MockData>>,
    loading: Mutex<()>,
}

impl MockCache {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http,
            data: RwLock::new(None),
            loading: Mutex::new(()),
        }
    }

    /// Cache seeded with a dataset, mainly for tests and offline use
    pub fn preloaded(data: MockData) -> Self {
        let cache = Self::new(reqwest::Client::new(), String::new());
        *cache.data.write() = Some(data);
        cache
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_loaded(&self) -> bool {
        self.data.read().is_some()
    }

    fn cached(&self) -> Option<MockData> {
        self.data.read().clone()
    }

    /// Snapshot of the dataset, fetching it on first use
    pub async fn load(&self) -> ClientResult<MockData> {
        if let Some(data) = self.cached() {
            return Ok(data);
        }

        let _loading = self.loading.lock().await;
        if let Some(data) = self.cached() {
            return Ok(data);
        }

        debug!(url = %self.url, "Fetching mock data");
        let data = self.fetch().await?;
        *self.data.write() = Some(data.clone());
        Ok(data)
    }

    async fn fetch(&self) -> ClientResult<MockData> {
        let response = self.http.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::MockData(format!(
                "{} answered {}",
                self.url,
                response.status()
            )));
        }
        MockData::from_value(response.json().await?)
    }

    /// Edit the dataset after making sure it is loaded
    pub async fn update<R>(&self, edit: impl FnOnce(&mut MockData) -> R) -> ClientResult<R> {
        self.load().await?;
        self.with_loaded(edit)
            .ok_or_else(|| ClientError::MockData("dataset was dropped".into()))
    }

    /// Edit the dataset only if it is already cached
    pub fn with_loaded<R>(&self, edit: impl FnOnce(&mut MockData) -> R) -> Option<R> {
        self.data.write().as_mut().map(edit)
    }

    pub fn clear(&self) {
        *self.data.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_collections() {
        let mut data = MockData::from_value(json!({
            "jobRoles": [{"id": "ROLE-1", "name": "Montaj"}, {"broken": true}],
            "stats": {"openJobs": 4}
        }))
        .unwrap();

        let roles: Vec<md_models::JobRole> = data.collection(keys::JOB_ROLES);
        assert_eq!(roles.len(), 1);
        assert!(data.list(keys::TASKS).is_empty());

        data.set_value(keys::TASKS, json!([{"id": "T-1"}]));
        assert_eq!(data.list(keys::TASKS).len(), 1);

        let dashboard = data.dashboard();
        assert_eq!(dashboard["stats"]["openJobs"], 4);
        assert!(dashboard["teamStatus"].is_null());
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(MockData::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn test_entry_edits_leave_other_entries_alone() {
        let mut data = MockData::from_value(json!({
            "jobRoles": [
                {"id": "ROLE-1", "name": "Montaj", "color": "blue"},
                {"broken": true},
                {"id": "ROLE-2", "name": 42}
            ]
        }))
        .unwrap();

        let role = md_models::JobRole {
            id: "ROLE-3".into(),
            name: "Kesim".into(),
            description: String::new(),
        };
        assert!(data.prepend(keys::JOB_ROLES, &role));

        let updated: Option<md_models::JobRole> =
            data.update_entry(keys::JOB_ROLES, "ROLE-1", |r: &mut md_models::JobRole| {
                r.name = "Montaj Ekibi".into()
            });
        assert_eq!(updated.unwrap().name, "Montaj Ekibi");

        let undecodable: Option<md_models::JobRole> =
            data.update_entry(keys::JOB_ROLES, "ROLE-2", |r: &mut md_models::JobRole| {
                r.name = "x".into()
            });
        assert!(undecodable.is_none());

        let roles = data.list(keys::JOB_ROLES);
        assert_eq!(roles.len(), 4);
        assert_eq!(roles[0]["id"], "ROLE-3");
        assert_eq!(roles[1]["name"], "Montaj Ekibi");
        assert_eq!(roles[1]["color"], "blue");
        assert_eq!(roles[2], json!({"broken": true}));
        assert_eq!(roles[3], json!({"id": "ROLE-2", "name": 42}));

        assert_eq!(data.remove_entry(keys::JOB_ROLES, "ROLE-1"), 1);
        assert_eq!(data.remove_entry(keys::JOB_ROLES, "ROLE-404"), 0);
        assert_eq!(data.list(keys::JOB_ROLES).len(), 3);
    }

    #[tokio::test]
    async fn test_load_once() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/data/mockData.json");
            then.status(200).json_body(json!({"tasks": [{"id": "T-1"}]}));
        });

        let cache = MockCache::new(reqwest::Client::new(), server.url("/data/mockData.json"));
        let (a, b) = tokio::join!(cache.load(), cache.load());
        assert_eq!(a.unwrap(), b.unwrap());
        cache.load().await.unwrap();
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let server = MockServer::start();
        let mut failing = server.mock(|when, then| {
            when.method(GET).path("/data/mockData.json");
            then.status(500);
        });

        let cache = MockCache::new(reqwest::Client::new(), server.url("/data/mockData.json"));
        assert!(cache.load().await.is_err());
        assert!(!cache.is_loaded());
        failing.delete();

        server.mock(|when, then| {
            when.method(GET).path("/data/mockData.json");
            then.status(200).json_body(json!({}));
        });
        assert!(cache.load().await.is_ok());
        assert!(cache.is_loaded());
    }
}
