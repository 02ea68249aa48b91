use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::streaks::CompanyRecord;

pub const DEFAULT_STORE_PATH: &str = "data/companies.json";

/// Read the store. `None` when it has never been written.
pub fn load(path: &Path) -> Result<Option<Vec<CompanyRecord>>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let records: Vec<CompanyRecord> =
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(Some(records))
}

/// Read the stored records, or seed the store with `current` on first run.
///
/// The flag is `true` when the store did not exist yet.
pub fn load_or_init(
    path: &Path,
    current: Vec<CompanyRecord>,
) -> Result<(Vec<CompanyRecord>, bool), StoreError> {
    match load(path)? {
        Some(stored) => Ok((stored, false)),
        None => {
            info!("No store at {}, seeding with {} records", path.display(), current.len());
            save(path, &current)?;
            Ok((current, true))
        }
    }
}

/// Replace the whole store. Writes a sibling temp file and renames it over
/// the target so readers never see a partial file.
pub fn save(path: &Path, records: &[CompanyRecord]) -> Result<(), StoreError> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let json = serde_json::to_string(records).map_err(StoreError::Encode)?;
    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(write_err)?;

    debug!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

// ── Stats ──

pub struct Stats {
    pub total: usize,
    pub longest: Option<(String, u32)>,
    pub newest: Option<NaiveDateTime>,
    pub oldest: Option<NaiveDateTime>,
}

pub fn get_stats(records: &[CompanyRecord]) -> Stats {
    // First record wins ties so the answer is stable across runs
    let longest = records
        .iter()
        .fold(None::<&CompanyRecord>, |best, r| match best {
            Some(b) if b.count >= r.count => Some(b),
            _ => Some(r),
        })
        .map(|r| (r.company.clone(), r.count));

    Stats {
        total: records.len(),
        longest,
        newest: records.iter().map(|r| r.date).max(),
        oldest: records.iter().map(|r| r.date).min(),
    }
}
