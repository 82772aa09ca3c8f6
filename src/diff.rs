//! Two-file comparison.
use crate::fileinfo::{format_timestamp, mode_string};
use crate::hash::{calculate_hashes, HashInfo};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct FileSide {
    pub path: PathBuf,
    pub size: u64,
    pub permissions: String,
    pub modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashes: Option<HashInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Identical,
    DifferentContentSameSize,
    Different,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileComparison {
    pub first: FileSide,
    pub second: FileSide,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
}

impl FileComparison {
    pub fn same_size(&self) -> bool {
        self.first.size == self.second.size
    }

    pub fn same_permissions(&self) -> bool {
        self.first.permissions == self.second.permissions
    }

    pub fn same_modified(&self) -> bool {
        self.first.modified == self.second.modified
    }

    /// Both hash sets, when both files could be hashed.
    pub fn hash_pair(&self) -> Option<(&HashInfo, &HashInfo)> {
        self.first.hashes.as_ref().zip(self.second.hashes.as_ref())
    }
}

/// Stat and hash both files. Stat failures are fatal, hash failures are not.
pub fn compare_files(first: &Path, second: &Path) -> Result<FileComparison> {
    let first = side(first)?;
    let second = side(second)?;
    let verdict = first
        .hashes
        .as_ref()
        .zip(second.hashes.as_ref())
        .map(|(a, b)| judge(a, b, first.size == second.size));
    Ok(FileComparison {
        first,
        second,
        verdict,
    })
}

fn side(path: &Path) -> Result<FileSide> {
    let metadata = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    let hashes = match calculate_hashes(path) {
        Ok(hashes) => Some(hashes),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "checksum comparison skipped");
            None
        }
    };
    Ok(FileSide {
        path: path.to_path_buf(),
        size: metadata.len(),
        permissions: mode_string(&metadata),
        modified: metadata.modified().ok().map(format_timestamp),
        hashes,
    })
}

pub fn judge(first: &HashInfo, second: &HashInfo, same_size: bool) -> Verdict {
    match (first.sha256 == second.sha256, same_size) {
        (true, true) => Verdict::Identical,
        (false, true) => Verdict::DifferentContentSameSize,
        _ => Verdict::Different,
    }
}
