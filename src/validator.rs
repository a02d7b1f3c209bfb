// ==============================================================================
// validator.rs - Upload Validation
// ==============================================================================
// Description: Validates uploaded raw DNA exports (size, type, magic bytes)
// Author: Matt Barham
// Created: 2026-02-03
// Modified: 2026-02-03
// Version: 1.0.0
// ==============================================================================
// Security: Allowlist-only file types, magic number verification for
// compressed uploads, SHA-256 digest recorded for every accepted file
// ==============================================================================

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024; // 100 MB, raw exports are ~25 MB

/// An upload that passed all validation checks
#[derive(Debug)]
pub struct ValidatedFile {
    pub original_name: String,
    pub extension: String,
    pub size: u64,
    pub hash_sha256: String,
    pub validated_at: chrono::DateTime<chrono::Utc>,
}

pub struct FileValidator {
    max_file_size: u64,
    /// Extension -> expected magic bytes (empty = plain text, no magic)
    allowed_types: HashMap<String, Vec<u8>>,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl FileValidator {
    pub fn new() -> Self {
        let mut allowed_types = HashMap::new();

        // Tab-delimited raw exports (23andMe, AncestryDNA, FTDNA)
        allowed_types.insert("txt".to_string(), vec![]);

        // CSV exports (MyHeritage, FTDNA)
        allowed_types.insert("csv".to_string(), vec![]);

        // Gzip-compressed exports
        allowed_types.insert("gz".to_string(), vec![0x1f, 0x8b, 0x08]);

        Self {
            max_file_size: MAX_FILE_SIZE,
            allowed_types,
        }
    }

    pub async fn validate_upload(&self, file_path: &Path) -> Result<ValidatedFile> {
        let file_name = file_path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid file path"))?
            .to_string_lossy()
            .to_string();

        info!("Validating file: {}", file_name);

        // 1. Size check
        let metadata = std::fs::metadata(file_path).context("Failed to get file metadata")?;
        let size = metadata.len();

        if size == 0 {
            anyhow::bail!("File is empty");
        }
        if size > self.max_file_size {
            anyhow::bail!(
                "File too large: {} bytes (max: {} bytes)",
                size,
                self.max_file_size
            );
        }
        debug!("Size check passed: {} bytes", size);

        // 2. Extension check (allowlist)
        let ext = file_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .ok_or_else(|| anyhow::anyhow!("File has no extension"))?;
        if !self.allowed_types.contains_key(&ext) {
            anyhow::bail!("Invalid file type: {}", ext);
        }
        debug!("Extension check passed: {}", ext);

        // 3. Magic number verification
        if let Some(expected_magic) = self.allowed_types.get(&ext) {
            if !expected_magic.is_empty() {
                let actual_magic = read_magic_number(file_path, expected_magic.len())?;
                if actual_magic != *expected_magic {
                    anyhow::bail!("Magic number mismatch for .{} file", ext);
                }
                debug!("Magic number check passed");
            }
        }

        // 4. Compute SHA-256 hash
        let hash = compute_sha256(file_path)?;
        debug!("SHA-256: {}", hash);

        Ok(ValidatedFile {
            original_name: file_name,
            extension: ext,
            size,
            hash_sha256: hash,
            validated_at: chrono::Utc::now(),
        })
    }
}

fn read_magic_number(path: &Path, len: usize) -> Result<Vec<u8>> {
    let mut file = File::open(path).context("Failed to open file for magic check")?;
    let mut buffer = vec![0u8; len];
    file.read_exact(&mut buffer)
        .context("File too short for magic number check")?;
    Ok(buffer)
}

fn compute_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path).context("Failed to open file for hashing")?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_valid_txt_upload() {
        let mut file = NamedTempFile::with_suffix(".txt").unwrap();
        file.write_all(b"rs1\t1\t100\tAA\n").unwrap();
        file.flush().unwrap();

        let validated = FileValidator::new()
            .validate_upload(file.path())
            .await
            .unwrap();
        assert_eq!(validated.extension, "txt");
        assert_eq!(validated.hash_sha256.len(), 64);
        assert!(validated.size > 0);
    }

    #[tokio::test]
    async fn test_disallowed_extension_rejected() {
        let mut file = NamedTempFile::with_suffix(".exe").unwrap();
        file.write_all(b"data").unwrap();
        file.flush().unwrap();

        assert!(FileValidator::new()
            .validate_upload(file.path())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_empty_file_rejected() {
        let file = NamedTempFile::with_suffix(".txt").unwrap();
        assert!(FileValidator::new()
            .validate_upload(file.path())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_fake_gzip_rejected() {
        // .gz extension with plain-text contents fails the magic check
        let mut file = NamedTempFile::with_suffix(".gz").unwrap();
        file.write_all(b"not actually gzip data").unwrap();
        file.flush().unwrap();

        assert!(FileValidator::new()
            .validate_upload(file.path())
            .await
            .is_err());
    }
}
