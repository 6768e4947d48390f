//! Health checks
//!
//! The service has two things that can break underneath it: the data
//! directory holding the JSON collections and the document storage root.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use md_store::DataDir;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl ComponentHealth {
    fn from_result(name: &str, started: Instant, result: Result<(), String>) -> Self {
        let (status, message) = match result {
            Ok(()) => (HealthStatus::Healthy, None),
            Err(message) => (HealthStatus::Unhealthy, Some(message)),
        };
        Self {
            name: name.to_string(),
            status,
            message,
            response_time_ms: started.elapsed().as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

struct CachedHealth {
    report: HealthReport,
    cached_at: Instant,
}

pub struct HealthChecker {
    data: DataDir,
    documents_root: PathBuf,
    cache_duration: Duration,
    start_time: Instant,
    cache: RwLock<Option<CachedHealth>>,
}

impl HealthChecker {
    pub fn new(data: DataDir, documents_root: impl Into<PathBuf>) -> Self {
        Self {
            data,
            documents_root: documents_root.into(),
            cache_duration: Duration::from_secs(5),
            start_time: Instant::now(),
            cache: RwLock::new(None),
        }
    }

    /// Cached report, refreshed once it is older than the cache duration
    pub async fn check(&self) -> HealthReport {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.cached_at.elapsed() < self.cache_duration {
                    debug!("Returning cached health report");
                    return cached.report.clone();
                }
            }
        }

        let report = self.perform_checks().await;
        if report.status == HealthStatus::Unhealthy {
            warn!(?report.components, "Health check failed");
        }

        let mut cache = self.cache.write().await;
        *cache = Some(CachedHealth {
            report: report.clone(),
            cached_at: Instant::now(),
        });
        report
    }

    async fn perform_checks(&self) -> HealthReport {
        let components = vec![self.check_data_dir().await, self.check_documents().await];
        let status = if components
            .iter()
            .all(|c| c.status == HealthStatus::Healthy)
        {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        HealthReport {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components,
            timestamp: chrono::Utc::now(),
        }
    }

    async fn check_data_dir(&self) -> ComponentHealth {
        let started = Instant::now();
        let result = self.data.ping().await.map_err(|e| e.to_string());
        ComponentHealth::from_result("data", started, result)
    }

    async fn check_documents(&self) -> ComponentHealth {
        let started = Instant::now();
        // The root is created on first upload, so a missing one is fine
        let result = match tokio::fs::metadata(&self.documents_root).await {
            Ok(meta) if !meta.is_dir() => Err(format!(
                "{} is not a directory",
                self.documents_root.display()
            )),
            _ => Ok(()),
        };
        ComponentHealth::from_result("documents", started, result)
    }
}

/// GET /health
pub async fn health(State(checker): State<Arc<HealthChecker>>) -> impl IntoResponse {
    let report = checker.check().await;
    let status = match report.status {
        HealthStatus::Healthy => "ok",
        HealthStatus::Unhealthy => "unavailable",
    };
    (report.http_status(), Json(serde_json::json!({ "status": status })))
}

/// GET /health/live
pub async fn liveness() -> &'static str {
    "OK"
}

/// GET /health/ready
pub async fn readiness(State(checker): State<Arc<HealthChecker>>) -> impl IntoResponse {
    let report = checker.check().await;
    (report.http_status(), Json(report))
}
