// SPDX-License-Identifier: MIT

//! Filesystem-backed `SpoolStore`: one `{id}.json` file per spool.
//!
//! Writes go through a write-temp/fsync/rename sequence so a crash mid-write
//! never leaves a half-written record behind, and a corrupt file found
//! during a scan is quarantined rather than failing the whole listing — the
//! same pattern a per-record breadcrumb writer uses, applied here to spools
//! instead of jobs.

use crate::SpoolStore;
use chrono::{DateTime, Local};
use spindle_core::{Spool, SpoolError, SpoolId};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One-file-per-spool JSON store rooted at `<root>/spools/`.
pub struct JsonSpoolStore {
    spools_dir: PathBuf,
}

impl JsonSpoolStore {
    /// Open (creating if necessary) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, SpoolError> {
        let spools_dir = root.as_ref().join("spools");
        fs::create_dir_all(&spools_dir)?;
        Ok(Self { spools_dir })
    }

    fn path_for(&self, id: &SpoolId) -> PathBuf {
        self.spools_dir.join(format!("{}.json", id.as_str()))
    }

    fn quarantine(&self, path: &Path) {
        let bad = path.with_extension("json.bad");
        if let Err(e) = fs::rename(path, &bad) {
            tracing::error!(error = %e, path = %path.display(), "failed to quarantine corrupt spool record");
        } else {
            tracing::error!(path = %bad.display(), "quarantined corrupt spool record");
        }
    }

    fn write_atomic(&self, id: &SpoolId, spool: &Spool) -> Result<(), SpoolError> {
        let final_path = self.path_for(id);
        let tmp_path = self.spools_dir.join(format!("{}.json.tmp", id.as_str()));
        let bytes = serde_json::to_vec_pretty(spool)?;

        let mut file = File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Option<Spool>, SpoolError> {
        let bytes = fs::read(path)?;
        match serde_json::from_slice::<Spool>(&bytes) {
            Ok(spool) => Ok(Some(spool)),
            Err(e) => {
                tracing::error!(error = %e, path = %path.display(), "corrupt spool record");
                self.quarantine(path);
                Ok(None)
            }
        }
    }
}

impl SpoolStore for JsonSpoolStore {
    fn put(&self, spool: &Spool) -> Result<(), SpoolError> {
        self.write_atomic(&spool.id, spool)
    }

    fn get(&self, id: &SpoolId) -> Result<Spool, SpoolError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(SpoolError::NotFound(id.to_string()));
        }
        self.read(&path)?
            .ok_or_else(|| SpoolError::Corrupt(id.to_string()))
    }

    fn update(
        &self,
        id: &SpoolId,
        mutator: &mut dyn FnMut(&mut Spool),
    ) -> Result<Spool, SpoolError> {
        let mut spool = self.get(id)?;
        mutator(&mut spool);
        self.write_atomic(id, &spool)?;
        Ok(spool)
    }

    fn list(&self) -> Result<Vec<Spool>, SpoolError> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.spools_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(spool) = self.read(&path)? {
                out.push(spool);
            }
        }
        Ok(out)
    }

    fn sweep(&self, before: DateTime<Local>) -> Result<usize, SpoolError> {
        let mut removed = 0;
        for spool in self.list()? {
            let eligible = spool.status.is_terminal()
                && spool.completed_at.map(|c| c < before).unwrap_or(false);
            if eligible {
                let path = self.path_for(&spool.id);
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "json_store_tests.rs"]
mod tests;
