// # File Resource Store
//
// File-based implementation of ResourceStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good state
// - Recovery: Falls back to backup if corruption detected
//
// Every mutation is written through immediately, so a generated idempotency
// token is on disk before the create call that uses it goes out.
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "zones": {
//     "example": { "name": "example", "spec": { "name": "example.com" } }
//   },
//   "recordSets": {
//     "www": {
//       "name": "www",
//       "spec": { "name": "www.example.com", "type": "A", "records": ["1.2.3.4"], "zoneId": "Z1" }
//     }
//   }
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::StoreConfig;
use crate::model::{RecordSet, Zone};
use crate::traits::state_store::{ResourceStore, ResourceStoreFactory};

/// Store file format version
const STORE_FILE_VERSION: &str = "1.0";

/// File-based resource store with crash recovery
///
/// # Example
///
/// ```rust,no_run
/// use zonewright_core::state::FileResourceStore;
/// use zonewright_core::traits::ResourceStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileResourceStore::new("/var/lib/zonewright/resources.json").await?;
///     for zone in store.list_zones().await? {
///         println!("{} -> {:?}", zone.name, zone.external_name);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileResourceStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

#[derive(Debug)]
struct FileState {
    contents: StoreFileFormat,
    dirty: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFileFormat {
    version: String,
    #[serde(default)]
    zones: BTreeMap<String, Zone>,
    #[serde(default)]
    record_sets: BTreeMap<String, RecordSet>,
}

impl StoreFileFormat {
    fn empty() -> Self {
        Self {
            version: STORE_FILE_VERSION.to_string(),
            ..Self::default()
        }
    }
}

impl FileResourceStore {
    /// Create or load a file resource store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Try to load the existing store file
    /// 3. If it is corrupted, try to load from backup
    /// 4. If both fail, start empty
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!("Failed to create store directory {}: {}", parent.display(), e))
            })?;
        }

        let contents = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState { contents, dirty: false })),
        })
    }

    /// Load the store file, falling back to the backup when the main file
    /// does not parse
    async fn load_with_recovery(path: &Path) -> Result<StoreFileFormat, Error> {
        let err = match Self::load(path).await {
            Ok(contents) => {
                tracing::debug!(
                    zones = contents.zones.len(),
                    record_sets = contents.record_sets.len(),
                    "Loaded resource store"
                );
                return Ok(contents);
            }
            Err(Error::Json(e)) => e,
            Err(e) => return Err(e),
        };

        tracing::warn!("Store file appears corrupted: {}. Attempting recovery from backup.", err);

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            tracing::warn!("No backup file found. Starting with an empty store.");
            return Ok(StoreFileFormat::empty());
        }

        match Self::load(&backup_path).await {
            Ok(contents) => {
                tracing::info!(
                    zones = contents.zones.len(),
                    record_sets = contents.record_sets.len(),
                    "Recovered store from backup"
                );
                if let Err(restore_err) = fs::copy(&backup_path, path).await {
                    tracing::error!("Failed to restore store file from backup: {}", restore_err);
                }
                Ok(contents)
            }
            Err(backup_err) => {
                tracing::error!("Backup also corrupted: {}. Starting with an empty store.", backup_err);
                Ok(StoreFileFormat::empty())
            }
        }
    }

    async fn load(path: &Path) -> Result<StoreFileFormat, Error> {
        if !path.exists() {
            tracing::debug!("Store file does not exist: {}", path.display());
            return Ok(StoreFileFormat::empty());
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::state_store(format!("Failed to read store file {}: {}", path.display(), e)))?;

        let contents: StoreFileFormat = serde_json::from_str(&content)?;

        if contents.version != STORE_FILE_VERSION {
            tracing::warn!(
                "Store file version mismatch: expected {}, got {}. Attempting to load anyway.",
                STORE_FILE_VERSION,
                contents.version
            );
        }

        Ok(contents)
    }

    /// Write the store atomically: temp file, backup of the current file,
    /// then rename over it
    async fn write(&self) -> Result<(), Error> {
        let mut guard = self.state.write().await;

        let json = serde_json::to_string_pretty(&guard.contents)
            .map_err(|e| Error::state_store(format!("Failed to serialize store: {}", e)))?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!("Failed to create temp file {}: {}", temp_path.display(), e))
            })?;
            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::state_store(format!("Failed to write temp file {}: {}", temp_path.display(), e))
            })?;
            file.flush().await.map_err(|e| {
                Error::state_store(format!("Failed to flush temp file {}: {}", temp_path.display(), e))
            })?;
        }

        if self.path.exists()
            && let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await
        {
            tracing::warn!("Failed to create backup: {}", e);
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        guard.dirty = false;
        tracing::trace!("Store written to {}", self.path.display());
        Ok(())
    }

    async fn mutate(&self, f: impl FnOnce(&mut StoreFileFormat)) -> Result<(), Error> {
        {
            let mut guard = self.state.write().await;
            f(&mut guard.contents);
            guard.dirty = true;
        }
        self.write().await
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }

    /// Path of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResourceStore for FileResourceStore {
    async fn list_zones(&self) -> Result<Vec<Zone>, Error> {
        Ok(self.state.read().await.contents.zones.values().cloned().collect())
    }

    async fn get_zone(&self, name: &str) -> Result<Option<Zone>, Error> {
        Ok(self.state.read().await.contents.zones.get(name).cloned())
    }

    async fn save_zone(&self, zone: &Zone) -> Result<(), Error> {
        self.mutate(|c| {
            c.zones.insert(zone.name.clone(), zone.clone());
        })
        .await
    }

    async fn remove_zone(&self, name: &str) -> Result<(), Error> {
        self.mutate(|c| {
            c.zones.remove(name);
        })
        .await
    }

    async fn list_record_sets(&self) -> Result<Vec<RecordSet>, Error> {
        Ok(self.state.read().await.contents.record_sets.values().cloned().collect())
    }

    async fn get_record_set(&self, name: &str) -> Result<Option<RecordSet>, Error> {
        Ok(self.state.read().await.contents.record_sets.get(name).cloned())
    }

    async fn save_record_set(&self, record_set: &RecordSet) -> Result<(), Error> {
        self.mutate(|c| {
            c.record_sets.insert(record_set.name.clone(), record_set.clone());
        })
        .await
    }

    async fn remove_record_set(&self, name: &str) -> Result<(), Error> {
        self.mutate(|c| {
            c.record_sets.remove(name);
        })
        .await
    }

    async fn flush(&self) -> Result<(), Error> {
        if self.state.read().await.dirty {
            self.write().await
        } else {
            Ok(())
        }
    }
}

/// Factory for [`FileResourceStore`]
pub struct FileResourceStoreFactory;

#[async_trait]
impl ResourceStoreFactory for FileResourceStoreFactory {
    async fn create(&self, config: &StoreConfig) -> Result<Box<dyn ResourceStore>, Error> {
        match config {
            StoreConfig::File { path } => Ok(Box::new(FileResourceStore::new(path).await?)),
            other => Err(Error::config(format!(
                "File store factory cannot build a {} store",
                other.type_name()
            ))),
        }
    }
}
