//! This module provides a local cache for fetched event data
//!
//! The connection to the remote may be slow, and an app usually wants to show
//! something immediately on startup. The cache keeps the last completed
//! [`DatasetSnapshot`] (and, best-effort, the category lookup) in JSON files,
//! one set per dataset identity.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::category::CategoryMap;
use crate::error::{Error, PantryResult};
use crate::snapshot::DatasetSnapshot;

/// Write `bytes` to `path` through a temp file in the same directory, renamed
/// over the target once it is complete. Readers either see the previous version
/// or the new one, never a half-written file.
pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp_path = path.to_path_buf();
    let tmp_name = match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => format!("{}.tmp", name),
        None => String::from("pantry.tmp"),
    };
    tmp_path.set_file_name(tmp_name);

    let mut file = std::fs::File::create(&tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&tmp_path, path)
}

/// The local store for one dataset's snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Cache {
    snapshot_file: PathBuf,
    categories_file: PathBuf,
}

impl Cache {
    /// A cache living in `folder`, its file names derived from the dataset
    /// identity. The folder is created on the first save.
    pub fn new(folder: &Path, dataset_id: &str) -> Self {
        let stem = sanitize_filename::sanitize(dataset_id);
        Self {
            snapshot_file: folder.join(format!("{}.events.json", stem)),
            categories_file: folder.join(format!("{}.categories.json", stem)),
        }
    }

    /// Where the snapshot is persisted
    pub fn snapshot_file(&self) -> &Path {
        &self.snapshot_file
    }

    /// Restore the last saved snapshot.
    ///
    /// Fails soft: a missing, unreadable or unparsable backing file is logged
    /// and counts as "no cache yet".
    pub fn load(&self) -> Option<DatasetSnapshot> {
        match self.try_load() {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                log::warn!("{}", err);
                None
            }
        }
    }

    fn try_load(&self) -> PantryResult<DatasetSnapshot> {
        let file = std::fs::File::open(&self.snapshot_file)
            .map_err(|err| Error::CacheRead(format!("{:?}: {}", self.snapshot_file, err)))?;
        serde_json::from_reader(file)
            .map_err(|err| Error::CacheRead(format!("{:?}: {}", self.snapshot_file, err)))
    }

    /// Persist a snapshot, overwriting the previous one wholesale.
    ///
    /// Only internally consistent snapshots belong here, i.e. completed
    /// fetches; the caller enforces that.
    pub fn save(&self, snapshot: &DatasetSnapshot) -> PantryResult<()> {
        let json = serde_json::to_vec(snapshot)
            .map_err(|err| Error::CacheWrite(err.to_string()))?;
        self.write_file(&self.snapshot_file, &json)
    }

    /// Restore the category lookup saved alongside the snapshot, if any
    pub fn load_categories(&self) -> Option<CategoryMap> {
        let file = std::fs::File::open(&self.categories_file).ok()?;
        match serde_json::from_reader(file) {
            Ok(map) => Some(map),
            Err(err) => {
                log::warn!("Discarding unparsable category cache {:?}: {}", self.categories_file, err);
                None
            }
        }
    }

    /// Persist the category lookup next to the snapshot
    pub fn save_categories(&self, categories: &CategoryMap) -> PantryResult<()> {
        let json = serde_json::to_vec(categories)
            .map_err(|err| Error::CacheWrite(err.to_string()))?;
        self.write_file(&self.categories_file, &json)
    }

    /// Delete both backing files. Missing files are fine.
    pub fn clear(&self) -> PantryResult<()> {
        for path in [&self.snapshot_file, &self.categories_file].iter() {
            if let Err(err) = std::fs::remove_file(path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    return Err(Error::CacheWrite(format!("{:?}: {}", path, err)));
                }
            }
        }
        Ok(())
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> PantryResult<()> {
        if let Some(folder) = path.parent() {
            std::fs::create_dir_all(folder)
                .map_err(|err| Error::CacheWrite(format!("{:?}: {}", folder, err)))?;
        }
        atomic_write(path, bytes).map_err(|err| Error::CacheWrite(format!("{:?}: {}", path, err)))
    }
}
