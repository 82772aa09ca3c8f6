use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256, Sha512};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashInfo {
    pub md5: String,
    pub sha256: String,
    pub sha512: String,
}

/// Hash a file with MD5, SHA-256 and SHA-512 in a single read pass.
pub fn calculate_hashes(path: &Path) -> Result<HashInfo> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    hash_reader(file).with_context(|| format!("hash {}", path.display()))
}

pub fn hash_reader<R: Read>(mut reader: R) -> Result<HashInfo> {
    let mut md5_context = md5::Context::new();
    let mut sha256 = Sha256::new();
    let mut sha512 = Sha512::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let read = reader.read(&mut buffer).context("read input")?;
        if read == 0 {
            break;
        }
        let chunk = &buffer[..read];
        md5_context.consume(chunk);
        sha256.update(chunk);
        sha512.update(chunk);
    }

    Ok(HashInfo {
        md5: format!("{:x}", md5_context.compute()),
        sha256: format!("{:x}", sha256.finalize()),
        sha512: format!("{:x}", sha512.finalize()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_vectors() {
        let hashes = hash_reader(&b""[..]).expect("hash");
        assert_eq!(hashes.md5, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            hashes.sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert!(hashes.sha512.starts_with("cf83e1357eefb8bdf1542850d66d8007"));
        assert_eq!(hashes.sha512.len(), 128);
    }

    #[test]
    fn abc_vectors() {
        let hashes = hash_reader(&b"abc"[..]).expect("hash");
        assert_eq!(hashes.md5, "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(
            hashes.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(hashes.sha512.starts_with("ddaf35a193617abacc417349ae204131"));
    }

    #[test]
    fn chunked_input_matches_single_read() {
        let data = vec![7u8; BUFFER_SIZE * 2 + 13];
        let temp = tempfile::NamedTempFile::new().expect("temp file");
        std::fs::write(temp.path(), &data).expect("write");
        let from_file = calculate_hashes(temp.path()).expect("hash file");
        let from_memory = hash_reader(data.as_slice()).expect("hash memory");
        assert_eq!(from_file, from_memory);
    }

    #[test]
    fn missing_file_errors() {
        assert!(calculate_hashes(Path::new("/nonexistent/finfo-hash")).is_err());
    }
}
