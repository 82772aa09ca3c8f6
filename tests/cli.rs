mod common;

use common::{run_finfo, Workspace};
use std::ffi::OsStr;

#[test]
fn reports_a_script() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let script = ws.file("deploy.sh", b"#!/bin/bash\necho hi\n", 0o755)?;

    let result = run_finfo([&script], &[])?;
    assert!(result.success(), "stderr: {}", result.stderr);
    assert!(result
        .stdout
        .contains(&format!("Path        : {}\n", script.display())));
    assert!(result.stdout.contains("Size        : 20 bytes\n"));
    assert!(result.stdout.contains("Permissions : -rwxr-xr-x\n"));
    assert!(result.stdout.contains("File Type   : Bash script\n"));
    assert!(result.stdout.contains("Interpreter : /bin/bash\n"));
    assert!(!result.stdout.contains("\x1b["));
    assert!(!result.stdout.contains("Checksums"));
    Ok(())
}

#[test]
fn hash_flag_adds_checksums() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let data = ws.file("data.bin", b"abc", 0o644)?;

    let result = run_finfo([OsStr::new("--hash"), data.as_os_str()], &[])?;
    assert!(result.success());
    assert!(result
        .stdout
        .contains("  ├─ MD5    : 900150983cd24fb0d6963f7d28e17f72\n"));
    assert!(result.stdout.contains(
        "  ├─ SHA256 : ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad\n"
    ));
    Ok(())
}

#[test]
fn multiple_inputs_are_separated() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let a = ws.file("a.txt", b"one\n", 0o644)?;
    let b = ws.file("b.txt", b"two\n", 0o644)?;

    let result = run_finfo([&a, &b], &[])?;
    assert!(result.success());
    assert_eq!(result.stdout.matches(&"─".repeat(80)).count(), 1);
    assert_eq!(result.stdout.matches("Path        :").count(), 2);
    Ok(())
}

#[test]
fn unknown_inputs_are_skipped() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let real = ws.file("real.txt", b"x", 0o644)?;

    let result = run_finfo(
        [OsStr::new("finfo-no-such-command-xyz"), real.as_os_str()],
        &[],
    )?;
    assert!(result.success());
    assert!(result
        .stderr
        .contains("Error: command 'finfo-no-such-command-xyz' not found in PATH"));
    assert_eq!(result.stderr.lines().count(), 1, "stderr: {}", result.stderr);
    assert!(result.stdout.contains("real.txt"));
    Ok(())
}

#[test]
fn no_valid_inputs_fails() -> anyhow::Result<()> {
    let result = run_finfo(["finfo-no-such-command-xyz"], &[])?;
    assert_eq!(result.code, Some(1));
    assert!(result.stderr.contains("Error: No valid files found"));
    assert!(result.stdout.is_empty());
    Ok(())
}

#[test]
fn diff_of_identical_files() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let a = ws.file("left", b"same bytes", 0o644)?;
    let b = ws.file("right", b"same bytes", 0o644)?;

    let result = run_finfo([OsStr::new("--diff"), a.as_os_str(), b.as_os_str()], &[])?;
    assert!(result.success(), "stderr: {}", result.stderr);
    assert!(result.stdout.contains("diff left right\n"));
    assert!(result.stdout.contains("Both files are 10 bytes"));
    assert!(result.stdout.contains("Files are IDENTICAL (same content)"));
    Ok(())
}

#[test]
fn diff_of_same_size_files() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let a = ws.file("left", b"aaaa", 0o644)?;
    let b = ws.file("right", b"aaab", 0o600)?;

    let result = run_finfo([OsStr::new("--diff"), a.as_os_str(), b.as_os_str()], &[])?;
    assert!(result.success());
    assert!(result.stdout.contains("  ✗ File 1: -rw-r--r--\n  ✗ File 2: -rw-------\n"));
    assert!(result
        .stdout
        .contains("Files are DIFFERENT (same size, different content)"));
    Ok(())
}

#[test]
fn diff_requires_two_arguments() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let a = ws.file("only", b"x", 0o644)?;

    let result = run_finfo([OsStr::new("--diff"), a.as_os_str()], &[])?;
    assert_eq!(result.code, Some(1));
    assert!(result
        .stderr
        .contains("Error: --diff requires exactly 2 file arguments"));
    Ok(())
}

#[test]
fn diff_of_missing_file_fails() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let a = ws.file("present", b"x", 0o644)?;
    let missing = ws.path().join("absent");

    let result = run_finfo([OsStr::new("--diff"), a.as_os_str(), missing.as_os_str()], &[])?;
    assert_eq!(result.code, Some(1));
    assert!(result.stderr.contains("comparing files"));
    Ok(())
}

#[test]
fn library_search_uses_env_paths() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    ws.file("libfinfotest.so", b"not really elf", 0o644)?;
    ws.file("libfinfotest.so.1", b"not really elf", 0o644)?;
    ws.file("libfinfotest.a", b"!<arch>\n", 0o644)?;
    let dir = ws.path().display().to_string();

    let result = run_finfo(["--lib", "finfotest"], &[("LD_LIBRARY_PATH", dir.as_str())])?;
    assert!(result.success(), "stderr: {}", result.stderr);
    assert!(result
        .stdout
        .starts_with("Found 3 library file(s) for 'finfotest':\n\n"));
    let so = result.stdout.find("libfinfotest.so\n").expect("plain .so");
    let versioned = result.stdout.find("libfinfotest.so.1\n").expect("versioned .so");
    let archive = result.stdout.find("libfinfotest.a\n").expect("archive");
    assert!(so < versioned && versioned < archive);
    Ok(())
}

#[test]
fn library_header_is_never_colored() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    ws.file("libfinfocolor.so", b"not really elf", 0o644)?;
    let dir = ws.path().display().to_string();

    let result = run_finfo(
        ["--lib", "finfocolor"],
        &[
            ("LD_LIBRARY_PATH", dir.as_str()),
            ("NO_COLOR", ""),
            ("FINFO_FORCE_COLOR", "1"),
        ],
    )?;
    assert!(result.success(), "stderr: {}", result.stderr);
    assert!(result
        .stdout
        .starts_with("Found 1 library file(s) for 'finfocolor':\n\n\x1b["));
    Ok(())
}

#[test]
fn library_search_without_match_fails() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let dir = ws.path().display().to_string();

    let result = run_finfo(
        ["--lib", "finfo-definitely-missing"],
        &[("LD_LIBRARY_PATH", dir.as_str())],
    )?;
    assert_eq!(result.code, Some(1));
    assert!(result
        .stderr
        .contains("library 'finfo-definitely-missing' not found in standard paths"));
    Ok(())
}

#[test]
fn linked_libraries_for_a_text_file() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let notes = ws.file("notes.txt", b"plain\n", 0o644)?;

    let result = run_finfo([OsStr::new("--ll"), notes.as_os_str()], &[])?;
    assert!(result.success());
    assert_eq!(
        result.stdout,
        format!("No linked libraries found for {}\n", notes.display())
    );
    Ok(())
}

#[test]
fn json_output_parses() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let data = ws.file("data.json", b"{\"k\": 1}\n", 0o640)?;

    let result = run_finfo([OsStr::new("--json"), OsStr::new("--hash"), data.as_os_str()], &[])?;
    assert!(result.success());
    let parsed: serde_json::Value = serde_json::from_str(&result.stdout)?;
    let record = &parsed[0];
    assert_eq!(record["size"], 9);
    assert_eq!(record["permissions"], "-rw-r-----");
    assert!(record["hashes"]["sha512"].is_string());
    Ok(())
}

#[test]
fn forced_color_is_overridden_by_flag() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let data = ws.file("x.txt", b"x", 0o644)?;

    let colored = run_finfo(
        [data.as_os_str()],
        &[("NO_COLOR", ""), ("FINFO_FORCE_COLOR", "1")],
    )?;
    assert!(colored.stdout.contains("\x1b[1;36m"));

    let plain = run_finfo(
        [OsStr::new("--no-color"), data.as_os_str()],
        &[("NO_COLOR", ""), ("FINFO_FORCE_COLOR", "1")],
    )?;
    assert!(!plain.stdout.contains("\x1b["));
    Ok(())
}
