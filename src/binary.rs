//! Linkage and signing facts for ELF and Mach-O binaries.
//!
//! Object parsing goes through goblin on every host. Host tools refine the
//! result where they exist: `ldd` on Linux, `otool`/`nm`/`codesign` on macOS.
//! Every tool is optional and a failure just leaves the parsed facts in place.
use crate::filetype::{FileTypeInfo, ObjectFormat, ELF_CORE_DUMP};
use anyhow::{Context, Result};
use goblin::elf::{header as elf_header, Elf};
use goblin::mach::{header as mach_header, Mach, MachO, SingleArch};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

/// Objects larger than this are not loaded for in-process parsing.
pub const MAX_PARSE_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BinaryInfo {
    pub is_executable: bool,
    pub linked_libraries: Vec<String>,
    pub is_stripped: bool,
    pub has_signature: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_authority: Option<String>,
}

/// Analyze a binary file. Non-binary inputs yield an empty record.
pub fn analyze_binary(path: &Path, file_type: &FileTypeInfo) -> Result<BinaryInfo> {
    let mut info = BinaryInfo {
        is_executable: file_type.format.contains("executable"),
        ..BinaryInfo::default()
    };
    if !file_type.is_binary {
        return Ok(info);
    }

    // Core dumps have no DT_NEEDED entries.
    if file_type.format == ELF_CORE_DUMP {
        return Ok(info);
    }

    match file_type.object {
        Some(ObjectFormat::Elf) => {
            if let Some(bytes) = read_object(path, MAX_PARSE_BYTES)? {
                apply_elf(&bytes, &mut info);
            }
            if cfg!(target_os = "linux") {
                refine_with_ldd(path, &mut info);
            }
        }
        Some(ObjectFormat::MachO | ObjectFormat::MachOFat) => {
            if let Some(bytes) = read_object(path, MAX_PARSE_BYTES)? {
                apply_mach(&bytes, &mut info);
            }
            if cfg!(target_os = "macos") {
                refine_with_macos_tools(path, &mut info);
            }
        }
        None => {}
    }

    tracing::debug!(
        path = %path.display(),
        libraries = info.linked_libraries.len(),
        stripped = info.is_stripped,
        "binary analysis complete"
    );
    Ok(info)
}

/// Load an object for goblin, or `None` when it exceeds `limit` bytes.
fn read_object(path: &Path, limit: u64) -> Result<Option<Vec<u8>>> {
    let len = fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .len();
    if len > limit {
        tracing::debug!(path = %path.display(), len, limit, "object too large to parse");
        return Ok(None);
    }
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    Ok(Some(bytes))
}

fn apply_elf(bytes: &[u8], info: &mut BinaryInfo) {
    let elf = match Elf::parse(bytes) {
        Ok(elf) => elf,
        Err(err) => {
            tracing::debug!(%err, "elf parse failed");
            return;
        }
    };
    info.linked_libraries = elf.libraries.iter().map(|lib| lib.to_string()).collect();
    info.is_stripped = elf.syms.is_empty();
    // PIE executables are ET_DYN objects that request a program interpreter.
    if elf.header.e_type == elf_header::ET_DYN && elf.interpreter.is_some() {
        info.is_executable = true;
    }
}

fn apply_mach(bytes: &[u8], info: &mut BinaryInfo) {
    let facts = match Mach::parse(bytes) {
        Ok(Mach::Binary(macho)) => Some(mach_facts(&macho)),
        Ok(Mach::Fat(multi)) => (0..multi.narches).find_map(|idx| match multi.get(idx) {
            Ok(SingleArch::MachO(macho)) => Some(mach_facts(&macho)),
            _ => None,
        }),
        Err(err) => {
            tracing::debug!(%err, "mach-o parse failed");
            None
        }
    };
    if let Some(facts) = facts {
        info.linked_libraries = facts.libraries;
        info.is_stripped = facts.stripped;
        info.is_executable |= facts.executable;
    }
}

struct MachFacts {
    libraries: Vec<String>,
    stripped: bool,
    executable: bool,
}

fn mach_facts(macho: &MachO<'_>) -> MachFacts {
    // goblin reports the image itself as "self" at index 0.
    let libraries = macho
        .libs
        .iter()
        .filter(|lib| **lib != "self")
        .map(|lib| lib.to_string())
        .collect();
    MachFacts {
        libraries,
        stripped: macho.symbols().next().is_none(),
        executable: macho.header.filetype == mach_header::MH_EXECUTE,
    }
}

fn run_tool(program: &str, args: &[&str], path: &Path) -> Option<Output> {
    match Command::new(program).args(args).arg(path).output() {
        Ok(output) => Some(output),
        Err(err) => {
            tracing::debug!(program, %err, "tool unavailable");
            None
        }
    }
}

fn refine_with_ldd(path: &Path, info: &mut BinaryInfo) {
    let Some(output) = run_tool("ldd", &[], path) else {
        return;
    };
    if !output.status.success() {
        return;
    }
    let libraries = parse_ldd_output(&String::from_utf8_lossy(&output.stdout));
    if !libraries.is_empty() {
        info.linked_libraries = libraries;
    }
}

fn refine_with_macos_tools(path: &Path, info: &mut BinaryInfo) {
    if let Some(output) = run_tool("otool", &["-L"], path) {
        if output.status.success() {
            let libraries = parse_otool_output(&String::from_utf8_lossy(&output.stdout));
            if !libraries.is_empty() {
                info.linked_libraries = libraries;
            }
        }
    }

    let nm_ok = run_tool("nm", &[], path).is_some_and(|output| output.status.success());
    if !nm_ok {
        info.is_stripped = true;
    }

    if let Some(output) = run_tool("codesign", &["-dv"], path) {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        if output.status.success() && !combined.trim().is_empty() {
            info.has_signature = true;
            info.signature_authority = parse_codesign_authority(&combined);
        }
    }
}

/// Parse `ldd` output into resolved library paths (or names when unresolved).
pub fn parse_ldd_output(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains("not a dynamic executable"))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [name, "=>", "not", "found", ..] => Some(format!("{name} (not found)")),
                [_, "=>", target, ..] => Some(target.to_string()),
                [first, ..] => Some(first.to_string()),
                [] => None,
            }
        })
        .collect()
}

/// Parse `otool -L` output, skipping the header line naming the file.
pub fn parse_otool_output(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .map(str::trim)
        .filter_map(|line| {
            let idx = line.find('(')?;
            let lib = line[..idx].trim();
            (idx > 0 && !lib.is_empty()).then(|| lib.to_string())
        })
        .collect()
}

/// First `Authority=` value from `codesign -dv` output.
pub fn parse_codesign_authority(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        line.trim()
            .strip_prefix("Authority=")
            .map(|authority| authority.trim().to_string())
    })
}
