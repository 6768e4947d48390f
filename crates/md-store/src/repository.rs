//! Repository trait and the JSON collection implementation

use md_core::error::MdError;
use md_core::traits::Identifiable;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::Path;

use crate::data_dir::DataDir;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Data file not found: {0}")]
    FileNotFound(String),

    #[error("Cannot decode {file}: {message}")]
    Decode { file: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl RepositoryError {
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        RepositoryError::Io(format!("{}: {}", path.display(), err))
    }
}

impl From<RepositoryError> for MdError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => MdError::not_found(entity, id),
            RepositoryError::Conflict(message) => MdError::conflict(message),
            other => MdError::Storage(other.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// A record stored as one element of a JSON array file
pub trait Record: Serialize + DeserializeOwned + Identifiable + Clone + Send + Sync + 'static {
    /// File name inside the data directory
    const FILE: &'static str;
    /// Name used in "not found" messages
    const ENTITY: &'static str;
    /// New records go to the front of the file instead of the back
    const NEWEST_FIRST: bool = false;
}

/// Typed CRUD over one collection file
pub struct JsonRepository<T> {
    dir: DataDir,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonRepository<T> {
    fn clone(&self) -> Self {
        Self {
            dir: self.dir.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> JsonRepository<T> {
    pub fn new(dir: DataDir) -> Self {
        Self {
            dir,
            _record: PhantomData,
        }
    }

    pub fn dir(&self) -> &DataDir {
        &self.dir
    }

    fn not_found(id: &str) -> RepositoryError {
        RepositoryError::NotFound {
            entity: T::ENTITY,
            id: id.to_string(),
        }
    }

    /// All records in file order
    pub async fn find_all(&self) -> RepositoryResult<Vec<T>> {
        self.dir.read_collection(T::FILE).await
    }

    pub async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<T>> {
        Ok(self.find_all().await?.into_iter().find(|r| r.id() == id))
    }

    /// Like [`find_by_id`](Self::find_by_id) but missing records are an error
    pub async fn get(&self, id: &str) -> RepositoryResult<T> {
        self.find_by_id(id).await?.ok_or_else(|| Self::not_found(id))
    }

    pub async fn exists(&self, id: &str) -> RepositoryResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    /// Store a new record
    pub async fn insert(&self, record: T) -> RepositoryResult<T> {
        self.mutate(|records| {
            if T::NEWEST_FIRST {
                records.insert(0, record.clone());
            } else {
                records.push(record.clone());
            }
            Ok::<_, RepositoryError>(record)
        })
        .await
    }

    /// Change one record in place.
    ///
    /// `apply` works on a copy; when it fails nothing is written.
    pub async fn modify<F, E>(&self, id: &str, apply: F) -> Result<T, E>
    where
        F: FnOnce(&mut T) -> Result<(), E>,
        E: From<RepositoryError>,
    {
        self.mutate(|records| {
            let slot = records
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or_else(|| Self::not_found(id))?;
            let mut updated = slot.clone();
            apply(&mut updated)?;
            *slot = updated.clone();
            Ok(updated)
        })
        .await
    }

    /// Remove a record and return it
    pub async fn delete(&self, id: &str) -> RepositoryResult<T> {
        self.mutate(|records| {
            let idx = records
                .iter()
                .position(|r| r.id() == id)
                .ok_or_else(|| Self::not_found(id))?;
            Ok(records.remove(idx))
        })
        .await
    }

    /// Run `f` over the whole collection under the write gate and save the
    /// result when it succeeds.
    pub async fn mutate<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, E>,
        E: From<RepositoryError>,
    {
        let _gate = self.dir.lock().await;
        let mut records: Vec<T> = self.dir.read_collection(T::FILE).await?;
        let out = f(&mut records)?;
        self.dir.write(T::FILE, &records).await?;
        Ok(out)
    }
}
