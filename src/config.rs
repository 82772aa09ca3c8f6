//! Runtime settings resolved once from flags and the environment.
use crate::cli::RootArgs;
use std::env;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

/// Directories searched by `--lib` before any environment-provided paths.
pub const DEFAULT_LIBRARY_DIRS: &[&str] = &[
    "/usr/lib",
    "/usr/local/lib",
    "/opt/homebrew/lib",
    "/lib",
    "/usr/lib64",
    "/usr/local/lib64",
];

/// Environment variables whose `:`-separated entries extend the library search.
pub const LIBRARY_PATH_VARS: &[&str] = &["LD_LIBRARY_PATH", "DYLD_LIBRARY_PATH"];

/// Overrides the verbosity-derived log filter.
pub const LOG_ENV: &str = "FINFO_LOG";

const FORCE_COLOR_ENV: &str = "FINFO_FORCE_COLOR";

#[derive(Debug, Clone)]
pub struct Settings {
    pub color: bool,
    pub hashes: bool,
    pub json: bool,
    pub library_dirs: Vec<PathBuf>,
}

impl Settings {
    pub fn from_args(args: &RootArgs) -> Self {
        let color = resolve_color(
            args.no_color,
            env_flag("NO_COLOR"),
            env_flag(FORCE_COLOR_ENV),
            io::stdout().is_terminal(),
        );
        Self {
            color: color && !args.json,
            hashes: args.hash,
            json: args.json,
            library_dirs: library_search_dirs(|name| env::var(name).ok()),
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var_os(name).is_some_and(|value| !value.is_empty())
}

/// `--no-color` and `NO_COLOR` always win; the force variable beats TTY detection.
pub fn resolve_color(no_color_flag: bool, no_color_env: bool, force: bool, tty: bool) -> bool {
    if no_color_flag || no_color_env {
        return false;
    }
    force || tty
}

/// Build the ordered, de-duplicated library search list.
pub fn library_search_dirs<F>(lookup: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let mut dirs: Vec<PathBuf> = DEFAULT_LIBRARY_DIRS.iter().map(PathBuf::from).collect();
    if let Some(triple) = multiarch_triple() {
        dirs.push(PathBuf::from(format!("/usr/lib/{triple}")));
        dirs.push(PathBuf::from(format!("/lib/{triple}")));
    }
    for var in LIBRARY_PATH_VARS {
        let Some(raw) = lookup(var) else {
            continue;
        };
        dirs.extend(
            raw.split(':')
                .filter(|entry| !entry.is_empty())
                .map(PathBuf::from),
        );
    }
    let mut unique = Vec::with_capacity(dirs.len());
    for dir in dirs {
        if !unique.contains(&dir) {
            unique.push(dir);
        }
    }
    unique
}

fn multiarch_triple() -> Option<&'static str> {
    if !cfg!(target_os = "linux") {
        return None;
    }
    match env::consts::ARCH {
        "x86_64" => Some("x86_64-linux-gnu"),
        "aarch64" => Some("aarch64-linux-gnu"),
        "arm" => Some("arm-linux-gnueabihf"),
        "x86" => Some("i386-linux-gnu"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_precedence() {
        assert!(!resolve_color(true, false, true, true));
        assert!(!resolve_color(false, true, true, true));
        assert!(resolve_color(false, false, true, false));
        assert!(resolve_color(false, false, false, true));
        assert!(!resolve_color(false, false, false, false));
    }

    #[test]
    fn env_paths_follow_defaults() {
        let dirs = library_search_dirs(|name| match name {
            "LD_LIBRARY_PATH" => Some("/opt/a::/opt/b".to_string()),
            "DYLD_LIBRARY_PATH" => Some("/usr/lib:/opt/c".to_string()),
            _ => None,
        });
        assert_eq!(dirs[0], PathBuf::from("/usr/lib"));
        let tail: Vec<_> = dirs.iter().rev().take(3).rev().cloned().collect();
        assert_eq!(
            tail,
            vec![
                PathBuf::from("/opt/a"),
                PathBuf::from("/opt/b"),
                PathBuf::from("/opt/c")
            ]
        );
        assert_eq!(
            dirs.iter().filter(|d| *d == &PathBuf::from("/usr/lib")).count(),
            1
        );
    }
}
