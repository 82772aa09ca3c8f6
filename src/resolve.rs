//! Command and library lookup.
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

const LIBRARY_EXTENSIONS: [&str; 3] = [".dylib", ".so", ".a"];

/// Resolve an input to an absolute path, searching `PATH` when it is not a file.
pub fn resolve_command(name: &str) -> Result<PathBuf> {
    let candidate = Path::new(name);
    if fs::symlink_metadata(candidate).is_ok() {
        return std::path::absolute(candidate)
            .with_context(|| format!("resolve absolute path for {name}"));
    }
    match which::which(name) {
        Ok(path) => {
            tracing::debug!(name, path = %path.display(), "resolved command in PATH");
            Ok(path)
        }
        Err(_) => Err(anyhow!("command '{name}' not found in PATH")),
    }
}

/// Strip a `lib` prefix and one known library extension.
pub fn normalize_library_name(name: &str) -> &str {
    let mut base = name.strip_prefix("lib").unwrap_or(name);
    for ext in LIBRARY_EXTENSIONS {
        if let Some(stripped) = base.strip_suffix(ext) {
            base = stripped;
        }
    }
    base
}

fn library_patterns(base: &str) -> Result<Vec<Regex>> {
    let base = regex::escape(base);
    [
        format!(r"^lib{base}\.dylib$"),
        format!(r"^lib{base}\.so$"),
        format!(r"^lib{base}\.so\..*$"),
        format!(r"^lib{base}\.a$"),
        format!(r"^{base}\.dylib$"),
        format!(r"^{base}\.so$"),
        format!(r"^{base}\.a$"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).with_context(|| format!("compile pattern {pattern}")))
    .collect()
}

/// Find library files matching `name` across `search_dirs`, in discovery order.
pub fn find_library(name: &str, search_dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let base = normalize_library_name(name);
    let patterns = library_patterns(base)?;
    let mut found: Vec<PathBuf> = Vec::new();

    for dir in search_dirs {
        let Ok(entries) = fs::read_dir(dir) else {
            continue;
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();

        // Pattern-major order keeps `.dylib` before `.so` before `.a` per directory.
        for pattern in &patterns {
            for file_name in names.iter().filter(|n| pattern.is_match(n)) {
                let path = dir.join(file_name);
                if !found.contains(&path) {
                    found.push(path);
                }
            }
        }
    }

    if found.is_empty() {
        return Err(anyhow!("library '{name}' not found in standard paths"));
    }
    tracing::debug!(name, count = found.len(), "library search complete");
    Ok(found)
}
