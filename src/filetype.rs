//! Header-based file type classification.
//!
//! Classification is a fixed probe order over the first [`HEADER_LEN`] bytes:
//! object-file magic, shebang, well-known signatures, then a text heuristic
//! refined by the file extension. The first probe that matches wins.
use anyhow::{Context, Result};
use goblin::elf::header as elf_header;
use goblin::mach::{fat, header as mach_header};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of leading bytes inspected.
pub const HEADER_LEN: usize = 512;

const PRINTABLE_RATIO: f64 = 0.95;
// Java class files share the fat magic; real universal binaries carry few slices.
const MAX_FAT_ARCHS: u32 = 20;

pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

pub const ELF_CORE_DUMP: &str = "ELF core dump";

/// Object container recognised by magic, used to pick a binary analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectFormat {
    Elf,
    MachO,
    MachOFat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTypeInfo {
    pub format: String,
    pub mime: String,
    pub is_text: bool,
    pub is_binary: bool,
    pub is_script: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<ObjectFormat>,
}

impl FileTypeInfo {
    fn binary(format: &str, mime: &str) -> Self {
        Self {
            format: format.to_string(),
            mime: mime.to_string(),
            is_text: false,
            is_binary: true,
            is_script: false,
            interpreter: None,
            encoding: None,
            object: None,
        }
    }

    fn text(format: &str, mime: &str) -> Self {
        Self {
            format: format.to_string(),
            mime: mime.to_string(),
            is_text: true,
            is_binary: false,
            is_script: false,
            interpreter: None,
            encoding: Some("UTF-8".to_string()),
            object: None,
        }
    }

    fn object(format: &str, mime: &str, object: ObjectFormat) -> Self {
        Self {
            object: Some(object),
            ..Self::binary(format, mime)
        }
    }
}

/// Read the header of `path` and classify it.
pub fn detect_file_type(path: &Path) -> Result<FileTypeInfo> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64)
        .read_to_end(&mut header)
        .with_context(|| format!("read header of {}", path.display()))?;
    let info = classify(&header, path);
    tracing::debug!(path = %path.display(), format = %info.format, "classified file");
    Ok(info)
}

/// Classify a header buffer. `path` only contributes its extension.
pub fn classify(header: &[u8], path: &Path) -> FileTypeInfo {
    if let Some(info) = detect_elf(header) {
        return info;
    }
    if let Some(info) = detect_mach_o(header) {
        return info;
    }
    if let Some(info) = detect_script(header) {
        return info;
    }
    if let Some(info) = detect_signature(header) {
        return info;
    }

    let truncated = header.len() >= HEADER_LEN;
    let mut info = if is_text(header, truncated) {
        FileTypeInfo::text("Text file", "text/plain")
    } else {
        FileTypeInfo::binary("Binary file", MIME_OCTET_STREAM)
    };
    if let Some((format, mime)) = extension_hint(path) {
        info.format = format.to_string();
        info.mime = mime.to_string();
    }
    info
}

fn detect_elf(header: &[u8]) -> Option<FileTypeInfo> {
    if !header.starts_with(elf_header::ELFMAG) {
        return None;
    }
    let parsed = goblin::elf::Elf::parse_header(header).ok()?;
    let format = match parsed.e_type {
        elf_header::ET_DYN => "ELF shared object",
        elf_header::ET_REL => "ELF relocatable",
        elf_header::ET_CORE => ELF_CORE_DUMP,
        _ => "ELF executable",
    };
    Some(FileTypeInfo::object(
        format,
        "application/x-executable",
        ObjectFormat::Elf,
    ))
}

fn detect_mach_o(header: &[u8]) -> Option<FileTypeInfo> {
    let magic = read_u32(header, 0, true)?;
    let big_endian = match magic {
        mach_header::MH_MAGIC | mach_header::MH_MAGIC_64 => true,
        mach_header::MH_CIGAM | mach_header::MH_CIGAM_64 => false,
        fat::FAT_MAGIC => {
            let archs = read_u32(header, 4, true)?;
            if archs == 0 || archs >= MAX_FAT_ARCHS {
                return None;
            }
            return Some(FileTypeInfo::object(
                "Mach-O universal binary",
                "application/x-mach-binary",
                ObjectFormat::MachOFat,
            ));
        }
        _ => return None,
    };
    let filetype = read_u32(header, 12, big_endian)?;
    let format = match filetype {
        mach_header::MH_DYLIB => "Mach-O dynamic library",
        mach_header::MH_BUNDLE => "Mach-O bundle",
        mach_header::MH_OBJECT => "Mach-O object file",
        _ => "Mach-O executable",
    };
    Some(FileTypeInfo::object(
        format,
        "application/x-mach-binary",
        ObjectFormat::MachO,
    ))
}

fn read_u32(bytes: &[u8], offset: usize, big_endian: bool) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(offset..offset + 4)?.try_into().ok()?;
    Some(if big_endian {
        u32::from_be_bytes(raw)
    } else {
        u32::from_le_bytes(raw)
    })
}

fn detect_script(header: &[u8]) -> Option<FileTypeInfo> {
    let rest = header.strip_prefix(b"#!")?;
    let line_end = rest.iter().position(|b| *b == b'\n').unwrap_or(rest.len());
    let interpreter = String::from_utf8_lossy(&rest[..line_end]).trim().to_string();
    let (format, mime) = script_kind(interpreter_program(&interpreter));

    Some(FileTypeInfo {
        format: format.to_string(),
        mime: mime.to_string(),
        is_text: true,
        is_binary: false,
        is_script: true,
        interpreter: (!interpreter.is_empty()).then_some(interpreter),
        encoding: None,
        object: None,
    })
}

/// Program name of a shebang line, looking through `env` and its flags.
pub fn interpreter_program(interpreter: &str) -> &str {
    let mut parts = interpreter.split_whitespace();
    let program = parts.next().map(basename).unwrap_or_default();
    if program != "env" {
        return program;
    }
    parts
        .find(|part| !part.starts_with('-') && !part.contains('='))
        .map(basename)
        .unwrap_or(program)
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn script_kind(program: &str) -> (&'static str, &'static str) {
    if program.starts_with("bash") {
        ("Bash script", "text/x-shellscript")
    } else if program.starts_with("python") {
        ("Python script", "text/x-python")
    } else if program.starts_with("perl") {
        ("Perl script", "text/x-perl")
    } else if program.starts_with("ruby") {
        ("Ruby script", "text/x-ruby")
    } else if program == "node" || program == "nodejs" {
        ("Node.js script", "text/javascript")
    } else if program.ends_with("sh") {
        ("Shell script", "text/x-shellscript")
    } else {
        ("Script", "text/plain")
    }
}

const SIGNATURES: &[(&[u8], &str, &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "PNG image", "image/png"),
    (b"\xff\xd8\xff", "JPEG image", "image/jpeg"),
    (b"GIF87a", "GIF image", "image/gif"),
    (b"GIF89a", "GIF image", "image/gif"),
    (b"%PDF-", "PDF document", "application/pdf"),
    (b"PK\x03\x04", "ZIP archive", "application/zip"),
    (b"PK\x05\x06", "ZIP archive", "application/zip"),
    (b"\x1f\x8b", "GZIP compressed", "application/gzip"),
    (b"\xca\xfe\xba\xbe", "Java class file", "application/java-vm"),
];

fn detect_signature(header: &[u8]) -> Option<FileTypeInfo> {
    SIGNATURES
        .iter()
        .find(|(magic, _, _)| header.starts_with(magic))
        .map(|(_, format, mime)| FileTypeInfo::binary(format, mime))
}

/// Text heuristic: no NULs, valid UTF-8, and mostly printable ASCII.
///
/// When `truncated` is set a multi-byte sequence cut at the end of the
/// buffer does not count as invalid.
pub fn is_text(data: &[u8], truncated: bool) -> bool {
    if data.is_empty() {
        return true;
    }
    if data.contains(&0) {
        return false;
    }
    if let Err(err) = std::str::from_utf8(data) {
        if !(truncated && err.error_len().is_none()) {
            return false;
        }
    }
    let printable = data
        .iter()
        .filter(|&&b| matches!(b, 32..=126 | b'\n' | b'\r' | b'\t'))
        .count();
    printable as f64 / data.len() as f64 > PRINTABLE_RATIO
}

fn extension_hint(path: &Path) -> Option<(&'static str, &'static str)> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let hint = match ext.as_str() {
        "go" => ("Go source code", "text/x-go"),
        "rs" => ("Rust source code", "text/x-rust"),
        "py" => ("Python source code", "text/x-python"),
        "sh" => ("Shell script", "text/x-shellscript"),
        "c" => ("C source code", "text/x-c"),
        "cpp" | "cc" | "cxx" => ("C++ source code", "text/x-c++"),
        "h" | "hpp" => ("C/C++ header", "text/x-c"),
        "js" => ("JavaScript", "text/javascript"),
        "json" => ("JSON", "application/json"),
        "xml" => ("XML", "application/xml"),
        "html" | "htm" => ("HTML", "text/html"),
        "css" => ("CSS", "text/css"),
        "md" | "markdown" => ("Markdown", "text/markdown"),
        "yaml" | "yml" => ("YAML", "text/yaml"),
        "toml" => ("TOML", "text/toml"),
        "zip" => ("ZIP archive", "application/zip"),
        "tar" => ("TAR archive", "application/x-tar"),
        "gz" => ("GZIP compressed", "application/gzip"),
        "pdf" => ("PDF document", "application/pdf"),
        "jpg" | "jpeg" => ("JPEG image", "image/jpeg"),
        "png" => ("PNG image", "image/png"),
        "gif" => ("GIF image", "image/gif"),
        _ => return None,
    };
    Some(hint)
}

#[cfg(test)]
#[path = "filetype_tests.rs"]
mod tests;
