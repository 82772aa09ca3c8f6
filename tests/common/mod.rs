//! Shared helpers for running the finfo binary against temp fixtures.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Output captured from one finfo invocation.
#[derive(Debug)]
pub struct RunResult {
    pub stdout: String,
    pub stderr: String,
    pub code: Option<i32>,
}

impl RunResult {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Scratch directory for building fixture files.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `name` with the given mode and return the full path.
    pub fn file(&self, name: &str, contents: &[u8], mode: u32) -> anyhow::Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(mode))?;
        Ok(path)
    }
}

/// Run finfo with color disabled through the environment and no log filter.
pub fn run_finfo<I, S>(args: I, env: &[(&str, &str)]) -> anyhow::Result<RunResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_finfo"));
    cmd.args(args)
        .env("NO_COLOR", "1")
        .env_remove("FINFO_FORCE_COLOR")
        .env_remove("FINFO_LOG")
        .env_remove("LD_LIBRARY_PATH")
        .env_remove("DYLD_LIBRARY_PATH");
    for (key, value) in env {
        cmd.env(key, value);
    }
    let output = cmd.output()?;
    Ok(RunResult {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        code: output.status.code(),
    })
}
