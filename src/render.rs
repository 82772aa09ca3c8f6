//! Tree-style text rendering for file reports, linked libraries and diffs.
//!
//! Renderers return `String`s so callers decide where output goes; colors
//! come from the [`Palette`] and disappear entirely when it is disabled.
use crate::binary::BinaryInfo;
use crate::diff::{FileComparison, Verdict};
use crate::fileinfo::FileInfo;
use crate::hash::HashInfo;
use crate::style::Palette;

/// Linked libraries shown before the list is truncated.
pub const LINKED_LIBRARY_PREVIEW: usize = 10;

pub const SEPARATOR_WIDTH: usize = 80;

const SIZE_INDENT: &str = "              ";
const BRANCH: &str = "├─";
const LAST: &str = "╰─";
const LIST_BRANCH: &str = "├──";
const LIST_LAST: &str = "╰──";
const MATCH: &str = "✓";
const MISMATCH: &str = "✗";

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

pub fn separator() -> String {
    "─".repeat(SEPARATOR_WIDTH)
}

/// Size expressed in every relevant unit, largest first; bytes are always last.
pub fn size_lines(size: u64) -> Vec<String> {
    let bytes = size as f64;
    let (gb, mb, kb) = (bytes / GIB, bytes / MIB, bytes / KIB);
    let mut lines = Vec::new();
    if gb >= 0.1 {
        lines.push(format!("{gb:.2} GB"));
    }
    if mb >= 1.0 {
        lines.push(format!("{mb:.0} MB"));
    }
    if kb >= 1.0 && mb < 1000.0 {
        lines.push(format!("{kb:.0} KB"));
    }
    lines.push(format!("{size} bytes"));
    lines
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionBreakdown {
    pub owner: String,
    pub group: String,
    pub others: String,
}

pub fn permission_breakdown(mode: u32) -> PermissionBreakdown {
    PermissionBreakdown {
        owner: describe_permission_bits((mode >> 6) & 0o7),
        group: describe_permission_bits((mode >> 3) & 0o7),
        others: describe_permission_bits(mode & 0o7),
    }
}

/// `rw (read, write)` style description of one rwx triple.
pub fn describe_permission_bits(bits: u32) -> String {
    let named: [(u32, char, &str); 3] =
        [(0o4, 'r', "read"), (0o2, 'w', "write"), (0o1, 'x', "execute")];
    let present: Vec<_> = named.iter().filter(|(bit, _, _)| bits & bit != 0).collect();
    if present.is_empty() {
        return "--- (no permissions)".to_string();
    }
    let short: String = present.iter().map(|(_, c, _)| *c).collect();
    let long = present
        .iter()
        .map(|(_, _, name)| *name)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{short} ({long})")
}

fn push_field(out: &mut String, palette: &Palette, label: &str, value: String) {
    out.push_str(&palette.label(&format!("{label:<12}: ")));
    out.push_str(&value);
    out.push('\n');
}

fn push_branch(out: &mut String, palette: &Palette, last: bool, label: &str, value: String) {
    let connector = if last { LAST } else { BRANCH };
    out.push_str(&format!(
        "  {} {} {}\n",
        palette.tree(connector),
        palette.tree(label),
        value
    ));
}

/// Full report for one file.
pub fn format_file_info(info: &FileInfo, palette: &Palette) -> String {
    let mut out = String::new();

    push_field(
        &mut out,
        palette,
        "Path",
        palette.path(&info.path.display().to_string()),
    );

    let sizes = size_lines(info.size);
    push_field(&mut out, palette, "Size", palette.size(&sizes[0]));
    for (idx, line) in sizes.iter().enumerate().skip(1) {
        let connector = if idx == sizes.len() - 1 { LAST } else { BRANCH };
        out.push_str(&format!(
            "{SIZE_INDENT}{} {}\n",
            palette.tree(connector),
            palette.size(line)
        ));
    }

    push_field(&mut out, palette, "Arch", palette.value(&info.arch));
    push_field(&mut out, palette, "OS", palette.value(&info.os));

    push_field(
        &mut out,
        palette,
        "Permissions",
        palette.perm(&info.permissions),
    );
    let perms = permission_breakdown(info.mode);
    push_branch(&mut out, palette, false, "Owner  :", palette.value(&perms.owner));
    push_branch(&mut out, palette, false, "Group  :", palette.value(&perms.group));
    push_branch(&mut out, palette, true, "Others :", palette.value(&perms.others));

    if let Some(file_type) = &info.file_type {
        push_field(&mut out, palette, "File Type", palette.value(&file_type.format));
        if !file_type.mime.is_empty() {
            push_field(&mut out, palette, "MIME Type", palette.value(&file_type.mime));
        }
        if let Some(interpreter) = file_type.interpreter.as_ref().filter(|_| file_type.is_script) {
            push_field(&mut out, palette, "Interpreter", palette.value(interpreter));
        }
        if let Some(encoding) = file_type.encoding.as_ref().filter(|_| file_type.is_text) {
            push_field(&mut out, palette, "Encoding", palette.value(encoding));
        }
    }

    if let Some(binary) = &info.binary {
        out.push_str(&format_binary_info(binary, false, palette));
    }

    out.push_str(&palette.label("Privileges:"));
    out.push('\n');
    push_branch(
        &mut out,
        palette,
        false,
        "Owner        :",
        palette.value(&info.owner),
    );
    let writable = if info.writable_by_all {
        palette.warn("all users")
    } else {
        palette.value(&format!("{} only", info.owner))
    };
    push_branch(&mut out, palette, false, "Writable by  :", writable);
    let sudo = if info.requires_sudo {
        palette.warn("yes")
    } else {
        palette.value("no")
    };
    push_branch(&mut out, palette, true, "Requires sudo:", sudo);

    if let Some(hashes) = &info.hashes {
        out.push_str(&palette.label("Checksums:"));
        out.push('\n');
        out.push_str(&format_hash_info(hashes, palette));
    }

    if !info.symlink_chain.is_empty() {
        out.push_str(&palette.label("Symlink chain:"));
        out.push('\n');
        let last_idx = info.symlink_chain.len() - 1;
        for (idx, hop) in info.symlink_chain.iter().enumerate() {
            let connector = if idx == last_idx { LIST_LAST } else { LIST_BRANCH };
            out.push_str(&format!(
                "  {} {}{}{}\n",
                palette.tree(connector),
                palette.path(&hop.from.display().to_string()),
                palette.size(" → "),
                palette.symlink(&hop.to.display().to_string())
            ));
        }
    }

    out.push('\n');
    out
}

/// Binary section; `full` disables the linked-library preview limit.
pub fn format_binary_info(info: &BinaryInfo, full: bool, palette: &Palette) -> String {
    if !info.is_executable && info.linked_libraries.is_empty() {
        return String::new();
    }
    let mut out = String::new();

    if info.is_executable {
        out.push_str(&palette.label("Binary Type : "));
        out.push_str(&palette.good("Executable"));
        if info.is_stripped {
            out.push_str(&palette.value(" (stripped)"));
        }
        out.push('\n');
    }

    if let Some(authority) = info
        .signature_authority
        .as_ref()
        .filter(|a| info.has_signature && !a.is_empty())
    {
        out.push_str(&palette.label("Code Signature: "));
        out.push_str(&palette.value(authority));
        out.push('\n');
    }

    if !info.linked_libraries.is_empty() {
        out.push_str(&format_library_list(&info.linked_libraries, full, palette));
    }
    out
}

fn format_library_list(libraries: &[String], full: bool, palette: &Palette) -> String {
    let mut out = palette.label("Linked Libraries:");
    out.push('\n');
    let shown = if full {
        libraries.len()
    } else {
        libraries.len().min(LINKED_LIBRARY_PREVIEW)
    };
    let hidden = libraries.len() - shown;
    for (idx, lib) in libraries.iter().take(shown).enumerate() {
        let connector = if idx == shown - 1 && hidden == 0 {
            LIST_LAST
        } else {
            LIST_BRANCH
        };
        out.push_str(&format!("  {} {}\n", palette.tree(connector), palette.value(lib)));
    }
    if hidden > 0 {
        let more = format!("... and {hidden} more (use --ll for full list)");
        out.push_str(&format!(
            "  {} {}\n",
            palette.tree(LIST_LAST),
            palette.value(&more)
        ));
    }
    out
}

/// `--ll` output: the complete library list or a not-found line.
pub fn format_linked_libraries_only(info: &FileInfo, palette: &Palette) -> String {
    match info.binary.as_ref().filter(|b| !b.linked_libraries.is_empty()) {
        Some(binary) => format_library_list(&binary.linked_libraries, true, palette),
        None => format!("No linked libraries found for {}\n", info.path.display()),
    }
}

pub fn format_hash_info(hashes: &HashInfo, palette: &Palette) -> String {
    let mut out = String::new();
    let rows = [
        (BRANCH, "MD5    :", &hashes.md5),
        (BRANCH, "SHA256 :", &hashes.sha256),
        (LAST, "SHA512 :", &hashes.sha512),
    ];
    for (connector, label, value) in rows {
        out.push_str(&format!(
            "  {} {} {}\n",
            palette.tree(connector),
            palette.tree(label),
            palette.size(value)
        ));
    }
    out
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn push_pair(
    out: &mut String,
    palette: &Palette,
    same: bool,
    agreed: &str,
    first: &str,
    second: &str,
) {
    if same {
        out.push_str(&format!("  {} {}\n", palette.good(MATCH), agreed));
    } else {
        let mark = palette.warn(MISMATCH);
        out.push_str(&format!("  {mark} File 1: {}\n", palette.value(first)));
        out.push_str(&format!("  {mark} File 2: {}\n", palette.value(second)));
    }
}

/// Git-flavoured comparison report.
pub fn format_diff(cmp: &FileComparison, palette: &Palette) -> String {
    let (a, b) = (&cmp.first, &cmp.second);
    let mut out = String::new();
    let title = format!("diff {} {}", file_name(&a.path), file_name(&b.path));
    out.push_str(&format!("\n{}\n", palette.label(&title)));
    out.push_str(&format!(
        "{} {}\n",
        palette.warn("---"),
        palette.value(&a.path.display().to_string())
    ));
    out.push_str(&format!(
        "{} {}\n\n",
        palette.good("+++"),
        palette.value(&b.path.display().to_string())
    ));

    out.push_str(&palette.label("Size:"));
    out.push('\n');
    push_pair(
        &mut out,
        palette,
        cmp.same_size(),
        &format!("Both files are {}", palette.value(&format!("{} bytes", a.size))),
        &format!("{} bytes", a.size),
        &format!("{} bytes", b.size),
    );
    if !cmp.same_size() {
        let delta = if a.size > b.size {
            format!("Δ File 1 is {} bytes larger", a.size - b.size)
        } else {
            format!("Δ File 2 is {} bytes larger", b.size - a.size)
        };
        out.push_str(&format!("  {}\n", palette.warn(&delta)));
    }

    out.push_str(&format!("\n{}\n", palette.label("Permissions:")));
    push_pair(
        &mut out,
        palette,
        cmp.same_permissions(),
        &format!("Both files have {}", palette.value(&a.permissions)),
        &a.permissions,
        &b.permissions,
    );

    let mod_a = a.modified.as_deref().unwrap_or("unknown");
    let mod_b = b.modified.as_deref().unwrap_or("unknown");
    out.push_str(&format!("\n{}\n", palette.label("Modified:")));
    push_pair(
        &mut out,
        palette,
        cmp.same_modified(),
        &format!("Both at {}", palette.value(mod_a)),
        mod_a,
        mod_b,
    );

    out.push_str(&format!("\n{}\n", palette.label("Checksums:")));
    match cmp.hash_pair() {
        Some((ha, hb)) => {
            for (name, va, vb) in [
                ("MD5", &ha.md5, &hb.md5),
                ("SHA256", &ha.sha256, &hb.sha256),
                ("SHA512", &ha.sha512, &hb.sha512),
            ] {
                if va == vb {
                    let mark = palette.good(MATCH);
                    out.push_str(&format!("  {mark} {name}: {}\n", palette.value(va)));
                } else {
                    let mark = palette.warn(MISMATCH);
                    out.push_str(&format!("  {mark} {name} File 1: {}\n", palette.value(va)));
                    out.push_str(&format!("  {mark} {name} File 2: {}\n", palette.value(vb)));
                }
            }
        }
        None => {
            out.push_str(&format!("  {} checksums unavailable\n", palette.warn(MISMATCH)));
        }
    }

    if let Some(verdict) = cmp.verdict {
        out.push_str(&format!("\n{}\n", palette.label("Verdict:")));
        let line = match verdict {
            Verdict::Identical => palette.good("✓ Files are IDENTICAL (same content)"),
            Verdict::DifferentContentSameSize => {
                palette.warn("✗ Files are DIFFERENT (same size, different content)")
            }
            Verdict::Different => palette.warn("✗ Files are DIFFERENT"),
        };
        out.push_str(&format!("  {line}\n"));
    }

    out.push('\n');
    out
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
