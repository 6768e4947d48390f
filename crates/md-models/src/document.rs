//! Document archive model

use md_core::traits::Identifiable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of document attached to a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Measurement draft
    Olcu,
    /// Technical drawing
    Teknik,
    /// Contract
    Sozlesme,
    /// Offer
    Teklif,
    Diger,
}

impl DocumentType {
    pub const ALL: [DocumentType; 5] = [
        DocumentType::Olcu,
        DocumentType::Teknik,
        DocumentType::Sozlesme,
        DocumentType::Teklif,
        DocumentType::Diger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Olcu => "olcu",
            DocumentType::Teknik => "teknik",
            DocumentType::Sozlesme => "sozlesme",
            DocumentType::Teklif => "teklif",
            DocumentType::Diger => "diger",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata of an uploaded file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub job_id: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    /// Stored file name
    pub filename: String,
    pub original_name: String,
    /// Path relative to the documents root (`documents/olcu/DOC-..._...pdf`)
    pub path: String,
    pub mime_type: String,
    pub size: u64,
    pub uploaded_by: String,
    pub uploaded_at: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Identifiable for Document {
    fn id(&self) -> &str {
        &self.id
    }
}
