//! Document Service
//!
//! Stores uploaded files through a [`Storage`] backend and keeps their
//! metadata in `documents.json`, newest first.

use std::sync::Arc;

use bytes::Bytes;
use md_core::error::{MdError, ValidationErrors};
use md_core::types::{now_iso, prefixed_id};
use md_models::{Document, DocumentType};
use md_store::{DocumentRepository, RepositoryError};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::storage::{Storage, StorageError};

/// MIME types accepted for upload and the extension stored files get
pub const ALLOWED_MIME_TYPES: [(&str, &str); 6] = [
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
    ("application/pdf", ".pdf"),
    ("application/msword", ".doc"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".docx",
    ),
];

/// Name recorded as the uploader
const UPLOADED_BY: &str = "Kullanıcı";

/// Service errors
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document not found")]
    NotFound(String),
    #[error("File not found")]
    FileMissing(String),
    #[error("Invalid document type: {0}")]
    InvalidType(String),
    #[error("Unsupported file type: {0}. Supported: JPEG, PNG, GIF, PDF, DOC, DOCX")]
    UnsupportedMime(String),
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },
    #[error("jobId is required")]
    MissingJob,
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

impl From<DocumentError> for MdError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound(id) => MdError::not_found("Document", id),
            DocumentError::FileMissing(key) => MdError::not_found("File", key),
            DocumentError::MissingJob => {
                let mut errors = ValidationErrors::new();
                errors.add("jobId", "is required");
                MdError::Validation(errors)
            }
            DocumentError::Repository(e) => e.into(),
            DocumentError::Storage(e) => MdError::Storage(e.to_string()),
            other => MdError::business(other.to_string()),
        }
    }
}

/// Extension for an accepted MIME type. Parameters such as `; charset=`
/// are ignored.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let parsed: mime::Mime = content_type.trim().parse().ok()?;
    let essence = parsed.essence_str();
    ALLOWED_MIME_TYPES
        .iter()
        .find(|(allowed, _)| *allowed == essence)
        .map(|(_, ext)| *ext)
}

/// Everything known about a file except its bytes
#[derive(Debug, Clone, Default)]
pub struct UploadParams {
    pub job_id: String,
    pub doc_type: String,
    pub original_name: String,
    /// Declared content type; guessed from the file name when absent
    pub content_type: Option<String>,
    pub description: Option<String>,
}

impl UploadParams {
    pub fn new(
        job_id: impl Into<String>,
        doc_type: impl Into<String>,
        original_name: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            doc_type: doc_type.into(),
            original_name: original_name.into(),
            ..Default::default()
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn resolved_content_type(&self) -> String {
        match &self.content_type {
            Some(ct) if !ct.trim().is_empty() => ct.trim().to_string(),
            _ => mime_guess::from_path(&self.original_name)
                .first_or_octet_stream()
                .to_string(),
        }
    }
}

/// Listing filters
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub job_id: Option<String>,
    pub doc_type: Option<String>,
}

impl DocumentFilter {
    fn matches(&self, doc: &Document) -> bool {
        let job_ok = self
            .job_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map_or(true, |id| doc.job_id == id);
        let type_ok = self
            .doc_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .map_or(true, |t| doc.doc_type.as_str() == t);
        job_ok && type_ok
    }
}

/// A file ready to be sent back to the client
#[derive(Debug, Clone)]
pub struct Download {
    pub document: Document,
    pub data: Bytes,
}

impl Download {
    /// Name offered to the browser
    pub fn filename(&self) -> &str {
        if self.document.original_name.is_empty() {
            &self.document.filename
        } else {
            &self.document.original_name
        }
    }

    pub fn content_type(&self) -> &str {
        if self.document.mime_type.is_empty() {
            "application/octet-stream"
        } else {
            &self.document.mime_type
        }
    }
}

/// Document archive operations
#[derive(Clone)]
pub struct DocumentService {
    repo: DocumentRepository,
    storage: Arc<dyn Storage>,
    max_upload_bytes: u64,
}

impl DocumentService {
    pub fn new(repo: DocumentRepository, storage: Arc<dyn Storage>) -> Self {
        Self {
            repo,
            storage,
            max_upload_bytes: u64::MAX,
        }
    }

    pub fn with_max_upload_bytes(mut self, max: u64) -> Self {
        self.max_upload_bytes = max;
        self
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: &DocumentFilter) -> DocumentResult<Vec<Document>> {
        let docs = self.repo.find_all().await?;
        Ok(docs.into_iter().filter(|d| filter.matches(d)).collect())
    }

    pub async fn job_documents(&self, job_id: &str) -> DocumentResult<Vec<Document>> {
        self.list(&DocumentFilter {
            job_id: Some(job_id.to_string()),
            doc_type: None,
        })
        .await
    }

    pub async fn get(&self, id: &str) -> DocumentResult<Document> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DocumentError::NotFound(id.to_string()))
    }

    /// Validate, store the file and record its metadata
    #[instrument(skip(self, data), fields(size = data.len(), storage = self.storage.name()))]
    pub async fn upload(&self, params: UploadParams, data: Bytes) -> DocumentResult<Document> {
        if params.job_id.trim().is_empty() {
            return Err(DocumentError::MissingJob);
        }
        let doc_type = DocumentType::parse(&params.doc_type)
            .ok_or_else(|| DocumentError::InvalidType(params.doc_type.clone()))?;

        let content_type = params.resolved_content_type();
        let ext = extension_for(&content_type)
            .ok_or_else(|| DocumentError::UnsupportedMime(content_type.clone()))?;

        let size = data.len() as u64;
        if size > self.max_upload_bytes {
            return Err(DocumentError::FileTooLarge {
                size,
                max: self.max_upload_bytes,
            });
        }

        let id = prefixed_id("DOC");
        let filename = format!(
            "{}_{}{}",
            id,
            chrono::Utc::now().format("%Y%m%d%H%M%S"),
            ext
        );
        let path = format!("documents/{}/{}", doc_type, filename);
        let stored = self.storage.put(&path, data).await?;

        let document = Document {
            id,
            job_id: params.job_id,
            doc_type,
            filename,
            original_name: params.original_name,
            path,
            mime_type: content_type,
            size: stored.size,
            uploaded_by: UPLOADED_BY.to_string(),
            uploaded_at: now_iso(),
            description: params.description.filter(|d| !d.is_empty()),
        };

        if let Err(e) = self.repo.insert(document.clone()).await {
            if let Err(cleanup) = self.storage.delete(&document.path).await {
                warn!(path = %document.path, error = %cleanup, "Could not remove orphaned file");
            }
            return Err(e.into());
        }

        info!(id = %document.id, job_id = %document.job_id, digest = %stored.digest, "Document uploaded");
        Ok(document)
    }

    #[instrument(skip(self))]
    pub async fn download(&self, id: &str) -> DocumentResult<Download> {
        let document = self.get(id).await?;
        let data = match self.storage.get(&document.path).await {
            Ok(data) => data,
            Err(StorageError::NotFound(key)) => return Err(DocumentError::FileMissing(key)),
            Err(e) => return Err(e.into()),
        };
        Ok(Download { document, data })
    }

    /// Remove the metadata; the stored file is removed on a best-effort basis
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> DocumentResult<Document> {
        let document = self.get(id).await?;
        if let Err(e) = self.storage.delete(&document.path).await {
            warn!(path = %document.path, error = %e, "Could not remove document file");
        }
        let removed = self.repo.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound { id, .. } => DocumentError::NotFound(id),
            other => other.into(),
        })?;
        info!(id = %removed.id, "Document deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use md_store::DataDir;

    async fn service() -> (tempfile::TempDir, DocumentService, Arc<MemoryStorage>) {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::open(tmp.path()).await.unwrap();
        let storage = Arc::new(MemoryStorage::new());
        let service = DocumentService::new(DocumentRepository::new(dir), storage.clone());
        (tmp, service, storage)
    }

    fn pdf(job: &str, doc_type: &str) -> UploadParams {
        UploadParams::new(job, doc_type, "olcu-plani.pdf").content_type("application/pdf")
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/jpeg"), Some(".jpg"));
        assert_eq!(extension_for("application/pdf; charset=binary"), Some(".pdf"));
        assert_eq!(extension_for("text/plain"), None);
        assert_eq!(extension_for("not a mime"), None);
    }

    #[tokio::test]
    async fn test_upload_records_metadata() {
        let (_tmp, service, storage) = service().await;

        let doc = service
            .upload(pdf("JOB-1", "olcu").description("ilk ölçü"), Bytes::from_static(b"%PDF-1.4"))
            .await
            .unwrap();

        assert!(doc.id.starts_with("DOC-"));
        assert!(doc.filename.starts_with(&doc.id));
        assert!(doc.filename.ends_with(".pdf"));
        assert_eq!(doc.path, format!("documents/olcu/{}", doc.filename));
        assert_eq!(doc.size, 8);
        assert_eq!(doc.uploaded_by, "Kullanıcı");
        assert_eq!(doc.original_name, "olcu-plani.pdf");
        assert!(storage.exists(&doc.path).await.unwrap());
    }

    #[tokio::test]
    async fn test_upload_guesses_content_type() {
        let (_tmp, service, _) = service().await;
        let doc = service
            .upload(UploadParams::new("JOB-1", "teknik", "cizim.png"), Bytes::from_static(b"png"))
            .await
            .unwrap();
        assert_eq!(doc.mime_type, "image/png");
        assert!(doc.filename.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let (_tmp, service, storage) = service().await;

        let err = service.upload(pdf("JOB-1", "fatura"), Bytes::new()).await.unwrap_err();
        assert!(matches!(err, DocumentError::InvalidType(_)));
        assert_eq!(MdError::from(err).status_code(), 400);

        let params = UploadParams::new("JOB-1", "olcu", "notes.txt").content_type("text/plain");
        let err = service.upload(params, Bytes::new()).await.unwrap_err();
        assert!(err.to_string().starts_with("Unsupported file type: text/plain"));

        let err = service.upload(pdf("", "olcu"), Bytes::new()).await.unwrap_err();
        assert_eq!(MdError::from(err).status_code(), 422);

        let small = service.clone().with_max_upload_bytes(4);
        let err = small.upload(pdf("JOB-1", "olcu"), Bytes::from_static(b"12345")).await.unwrap_err();
        assert!(matches!(err, DocumentError::FileTooLarge { size: 5, max: 4 }));

        assert_eq!(storage.len().await, 0);
    }

    #[tokio::test]
    async fn test_list_filters_newest_first() {
        let (_tmp, service, _) = service().await;
        let first = service.upload(pdf("JOB-1", "olcu"), Bytes::new()).await.unwrap();
        let second = service.upload(pdf("JOB-1", "teklif"), Bytes::new()).await.unwrap();
        service.upload(pdf("JOB-2", "olcu"), Bytes::new()).await.unwrap();

        let all = service.list(&DocumentFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let job1 = service.job_documents("JOB-1").await.unwrap();
        assert_eq!(
            job1.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            vec![second.id.as_str(), first.id.as_str()]
        );

        let filter = DocumentFilter {
            job_id: Some("JOB-1".into()),
            doc_type: Some("olcu".into()),
        };
        let only = service.list(&filter).await.unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].id, first.id);
    }

    #[tokio::test]
    async fn test_download_and_delete() {
        let (_tmp, service, storage) = service().await;
        let doc = service
            .upload(pdf("JOB-1", "sozlesme"), Bytes::from_static(b"contract"))
            .await
            .unwrap();

        let download = service.download(&doc.id).await.unwrap();
        assert_eq!(download.data, Bytes::from_static(b"contract"));
        assert_eq!(download.filename(), "olcu-plani.pdf");
        assert_eq!(download.content_type(), "application/pdf");

        storage.delete(&doc.path).await.unwrap();
        let err = service.download(&doc.id).await.unwrap_err();
        assert!(matches!(err, DocumentError::FileMissing(_)));

        // Missing file does not block metadata removal
        let removed = service.delete(&doc.id).await.unwrap();
        assert_eq!(removed.id, doc.id);
        assert!(matches!(
            service.get(&doc.id).await,
            Err(DocumentError::NotFound(_))
        ));
        assert_eq!(
            MdError::from(service.delete(&doc.id).await.unwrap_err()).status_code(),
            404
        );
    }
}
