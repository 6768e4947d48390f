//! Data directory access
//!
//! Files are read with an encoding fallback (UTF-8, UTF-8 with BOM, UTF-16,
//! Latin-1) since some collections are edited by hand on Windows machines.
//! Writes go through a temporary file and a rename, and read-modify-write
//! sequences hold the directory's write gate.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::repository::{RepositoryError, RepositoryResult};

#[derive(Clone)]
pub struct DataDir {
    root: PathBuf,
    gate: Arc<Mutex<()>>,
}

impl std::fmt::Debug for DataDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataDir").field("root", &self.root).finish()
    }
}

impl DataDir {
    /// Open a data directory, creating it when missing
    pub async fn open(root: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| RepositoryError::io(&root, e))?;
        tracing::info!(path = %root.display(), "Data directory ready");
        Ok(Self {
            root,
            gate: Arc::new(Mutex::new(())),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Hold this while loading, changing and saving a collection
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }

    pub async fn exists(&self, file: &str) -> bool {
        tokio::fs::try_exists(self.path(file)).await.unwrap_or(false)
    }

    /// Load a file as raw JSON
    pub async fn read_value(&self, file: &str) -> RepositoryResult<Value> {
        let path = self.path(file);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepositoryError::FileNotFound(file.to_string()))
            }
            Err(e) => return Err(RepositoryError::io(&path, e)),
        };
        decode_json(&bytes).ok_or_else(|| RepositoryError::Decode {
            file: file.to_string(),
            message: "no supported encoding produced valid JSON".to_string(),
        })
    }

    /// Load and deserialize a file
    pub async fn read<T: DeserializeOwned>(&self, file: &str) -> RepositoryResult<T> {
        let value = self.read_value(file).await?;
        serde_json::from_value(value).map_err(|e| RepositoryError::Decode {
            file: file.to_string(),
            message: e.to_string(),
        })
    }

    /// Load a collection; a missing file reads as empty
    pub async fn read_collection<T: DeserializeOwned>(&self, file: &str) -> RepositoryResult<Vec<T>> {
        match self.read(file).await {
            Err(RepositoryError::FileNotFound(_)) => Ok(Vec::new()),
            other => other,
        }
    }

    /// Serialize and write a file as pretty UTF-8 JSON
    pub async fn write<T: Serialize + ?Sized>(&self, file: &str, data: &T) -> RepositoryResult<()> {
        let path = self.path(file);
        let body = serde_json::to_vec_pretty(data).map_err(|e| RepositoryError::Decode {
            file: file.to_string(),
            message: e.to_string(),
        })?;

        let tmp = self.path(&format!(".{}.tmp", file));
        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|e| RepositoryError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| RepositoryError::io(&path, e))?;

        tracing::debug!(file, bytes = body.len(), "Saved data file");
        Ok(())
    }

    /// Check the directory is still there
    pub async fn ping(&self) -> RepositoryResult<()> {
        let meta = tokio::fs::metadata(&self.root)
            .await
            .map_err(|e| RepositoryError::io(&self.root, e))?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(RepositoryError::Io(format!(
                "{} is not a directory",
                self.root.display()
            )))
        }
    }
}

/// Try each supported encoding until one yields valid JSON
fn decode_json(bytes: &[u8]) -> Option<Value> {
    let attempts: [fn(&[u8]) -> Option<String>; 4] =
        [decode_utf8, decode_utf8_bom, decode_utf16, decode_latin1];
    attempts
        .iter()
        .filter_map(|decode| decode(bytes))
        .find_map(|text| serde_json::from_str(&text).ok())
}

fn decode_utf8(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes).ok().map(str::to_owned)
}

fn decode_utf8_bom(bytes: &[u8]) -> Option<String> {
    bytes
        .strip_prefix(&[0xEF, 0xBB, 0xBF])
        .and_then(|rest| std::str::from_utf8(rest).ok())
        .map(str::to_owned)
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (body, big_endian) = match bytes {
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        _ => (bytes, false),
    };
    if body.len() % 2 != 0 {
        return None;
    }
    let units = body.chunks_exact(2).map(|pair| {
        if big_endian {
            u16::from_be_bytes([pair[0], pair[1]])
        } else {
            u16::from_le_bytes([pair[0], pair[1]])
        }
    });
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

fn decode_latin1(bytes: &[u8]) -> Option<String> {
    Some(bytes.iter().map(|&b| b as char).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("[{\"name\":\"Çam\"}]".as_bytes());
        assert_eq!(decode_json(&bytes), Some(json!([{"name": "Çam"}])));
    }

    #[test]
    fn test_decode_utf16_le() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "{\"ok\":true}".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_json(&bytes), Some(json!({"ok": true})));
    }

    #[test]
    fn test_decode_latin1() {
        // 0xE9 is "é" in Latin-1 and invalid UTF-8
        let bytes = [b'"', b'c', b'a', b'f', 0xE9, b'"'];
        assert_eq!(decode_json(&bytes), Some(json!("café")));
    }

    #[test]
    fn test_decode_garbage() {
        assert_eq!(decode_json(b"{not json"), None);
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::open(tmp.path().join("data")).await.unwrap();

        dir.write("colors.json", &json!([{"id": "CLR-1"}])).await.unwrap();
        let value = dir.read_value("colors.json").await.unwrap();
        assert_eq!(value[0]["id"], "CLR-1");
        assert!(!dir.exists(".colors.json.tmp").await);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::open(tmp.path()).await.unwrap();

        let err = dir.read_value("tasks.json").await.unwrap_err();
        assert!(matches!(err, RepositoryError::FileNotFound(_)));

        let empty: Vec<Value> = dir.read_collection("tasks.json").await.unwrap();
        assert!(empty.is_empty());
        assert!(dir.ping().await.is_ok());
    }
}
