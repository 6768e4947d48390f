//! Activity log and job roles kept by the data-access layer

use md_core::traits::Identifiable;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client-side activity entry shown in a job's history
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobLog {
    pub id: String,
    pub job_id: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub meta: Value,
}

impl Identifiable for JobLog {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Trade a job needs (joinery, paint, glass, ...)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct JobRole {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Identifiable for JobRole {
    fn id(&self) -> &str {
        &self.id
    }
}
