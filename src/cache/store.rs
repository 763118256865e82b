//! Cache storage implementation.
//!
//! A store is bound to one (namespace, directory) pair and backed by a
//! single file holding a JSON object that maps URLs to records.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::record::CacheRecord;
use crate::error::{AssetCacheError, Result};

/// Durable key/value persistence for cache records.
pub trait Store: Sized {
    /// Open the store named `namespace` inside `dir`.
    ///
    /// Opening is idempotent; a missing backing file yields an empty store.
    fn open(namespace: &str, dir: &Path) -> Result<Self>;

    /// Look up the record for a key.
    fn get(&self, key: &str) -> Option<&CacheRecord>;

    /// Replace the record for a key.
    fn put(&mut self, key: &str, record: CacheRecord);

    /// Durably write pending changes.
    fn persist(&mut self) -> Result<()>;
}

/// Store kept in a single JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: BTreeMap<String, CacheRecord>,
}

impl JsonFileStore {
    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keys currently held, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn io_error(&self, source: std::io::Error) -> AssetCacheError {
        AssetCacheError::StoreIo {
            path: self.path.clone(),
            source,
        }
    }
}

impl Store for JsonFileStore {
    fn open(namespace: &str, dir: &Path) -> Result<Self> {
        let path = dir.join(namespace);

        let records = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|source| AssetCacheError::StoreCorrupt {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(AssetCacheError::StoreIo { path, source }),
        };

        debug!("Opened cache store {:?} ({} records)", path, records.len());
        Ok(Self { path, records })
    }

    fn get(&self, key: &str) -> Option<&CacheRecord> {
        self.records.get(key)
    }

    fn put(&mut self, key: &str, record: CacheRecord) {
        self.records.insert(key.to_string(), record);
    }

    /// Write to a uniquely named temporary file beside the store, sync it,
    /// rename it over the store file, then sync the directory.
    ///
    /// The temporary file is removed on every failure path.
    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_vec(&self.records).map_err(|e| AssetCacheError::Other(e.into()))?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| AssetCacheError::StoreIo {
            path: dir.to_path_buf(),
            source,
        })?;
        if let Err(source) = write_synced(&mut tmp, &json) {
            return Err(AssetCacheError::StoreIo {
                path: tmp.path().to_path_buf(),
                source,
            });
        }
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        sync_dir(dir)?;

        debug!("Persisted cache store {:?}", self.path);
        Ok(())
    }
}

fn write_synced(tmp: &mut NamedTempFile, bytes: &[u8]) -> std::io::Result<()> {
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()
}

/// Flush the directory entry so a completed rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    fs::File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|source| AssetCacheError::StoreIo {
            path: dir.to_path_buf(),
            source,
        })
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
