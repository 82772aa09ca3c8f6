//! Gather the full report for a single path.
use crate::binary::{analyze_binary, BinaryInfo};
use crate::filetype::{detect_file_type, FileTypeInfo};
use crate::hash::{calculate_hashes, HashInfo};
use crate::owner;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, Metadata};
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// Matches the kernel's own limit on nested symlink resolution.
pub const MAX_SYMLINK_HOPS: usize = 40;

const OTHER_WRITE: u32 = 0o002;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymlinkHop {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub permissions: String,
    pub mode: u32,
    pub owner: String,
    pub group: String,
    pub writable_by_all: bool,
    pub requires_sudo: bool,
    pub arch: String,
    pub os: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    pub symlink_chain: Vec<SymlinkHop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileTypeInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<BinaryInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashes: Option<HashInfo>,
}

/// Collect metadata and run every probe for `path`.
///
/// Only path resolution, `lstat` and symlink resolution are fatal; the
/// type, binary and hash probes leave their field empty on failure.
pub fn get_file_info(path: &Path, with_hashes: bool) -> Result<FileInfo> {
    let abs_path = std::path::absolute(path)
        .map(|abs| lexical_clean(&abs))
        .with_context(|| format!("resolve path {}", path.display()))?;
    let metadata = fs::symlink_metadata(&abs_path)
        .with_context(|| format!("get file info for {}", abs_path.display()))?;
    let symlink_chain = resolve_symlink_chain(&abs_path)
        .with_context(|| format!("resolve symlink chain for {}", abs_path.display()))?;

    let mode = metadata.mode();
    let uid = metadata.uid();
    let mut info = FileInfo {
        path: abs_path.clone(),
        size: metadata.len(),
        permissions: mode_string(&metadata),
        mode: mode & 0o7777,
        owner: owner::user_name(uid),
        group: owner::group_name(metadata.gid()),
        writable_by_all: mode & OTHER_WRITE != 0,
        requires_sudo: owner::requires_sudo(uid, owner::current_uid()),
        arch: std::env::consts::ARCH.to_string(),
        os: os_label(std::env::consts::OS).to_string(),
        modified: metadata.modified().ok().map(format_timestamp),
        symlink_chain,
        file_type: None,
        binary: None,
        hashes: None,
    };

    match detect_file_type(&abs_path) {
        Ok(file_type) => info.file_type = Some(file_type),
        Err(err) => tracing::debug!(path = %abs_path.display(), %err, "file type probe skipped"),
    }

    if let Some(file_type) = info.file_type.as_ref().filter(|ft| ft.is_binary) {
        match analyze_binary(&abs_path, file_type) {
            Ok(binary) => info.binary = Some(binary),
            Err(err) => tracing::debug!(path = %abs_path.display(), %err, "binary probe skipped"),
        }
    }

    if with_hashes {
        match calculate_hashes(&abs_path) {
            Ok(hashes) => info.hashes = Some(hashes),
            Err(err) => tracing::debug!(path = %abs_path.display(), %err, "hash probe skipped"),
        }
    }

    Ok(info)
}

/// Follow symlinks from `path`, recording each hop until a non-link is reached.
pub fn resolve_symlink_chain(path: &Path) -> Result<Vec<SymlinkHop>> {
    let mut chain = Vec::new();
    let mut current = path.to_path_buf();

    loop {
        let metadata = fs::symlink_metadata(&current)
            .with_context(|| format!("lstat {}", current.display()))?;
        if !metadata.file_type().is_symlink() {
            return Ok(chain);
        }
        if chain.len() >= MAX_SYMLINK_HOPS {
            return Err(anyhow!(
                "too many levels of symbolic links at {}",
                current.display()
            ));
        }

        let target = fs::read_link(&current)
            .with_context(|| format!("readlink {}", current.display()))?;
        let target = if target.is_absolute() {
            target
        } else {
            current
                .parent()
                .map(|parent| lexical_clean(&parent.join(&target)))
                .unwrap_or(target)
        };
        chain.push(SymlinkHop {
            from: current,
            to: target.clone(),
        });
        current = target;
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Render mode bits the way `ls -l` does, e.g. `-rwxr-xr-x`.
pub fn mode_string(metadata: &Metadata) -> String {
    let file_type = metadata.file_type();
    let kind = if file_type.is_symlink() {
        'l'
    } else if file_type.is_dir() {
        'd'
    } else if file_type.is_block_device() {
        'b'
    } else if file_type.is_char_device() {
        'c'
    } else if file_type.is_fifo() {
        'p'
    } else if file_type.is_socket() {
        's'
    } else {
        '-'
    };
    format_mode(kind, metadata.mode())
}

pub fn format_mode(kind: char, mode: u32) -> String {
    let mut out = String::with_capacity(10);
    out.push(kind);
    let special = [(0o4000, 's'), (0o2000, 's'), (0o1000, 't')];
    for (shift, (special_bit, special_char)) in [6u32, 3, 0].into_iter().zip(special) {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        let exec = bits & 0o1 != 0;
        out.push(match (mode & special_bit != 0, exec) {
            (true, true) => special_char,
            (true, false) => special_char.to_ascii_uppercase(),
            (false, true) => 'x',
            (false, false) => '-',
        });
    }
    out
}

pub fn os_label(os: &str) -> &str {
    match os {
        "linux" => "Linux",
        "macos" => "macOS",
        "freebsd" => "FreeBSD",
        "openbsd" => "OpenBSD",
        "netbsd" => "NetBSD",
        other => other,
    }
}

pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
#[path = "fileinfo_tests.rs"]
mod tests;
