//! HTTP and archive utilities for fetching runtimes.
//!
//! Provides functions for downloading files with hash verification
//! and extracting ZIP archives.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::path::{Path, PathBuf};

/// Downloads a file from a URL.
///
/// Returns the file contents as a byte vector. Non-success HTTP statuses are
/// errors.
pub async fn download(url: &str) -> Result<Vec<u8>> {
    log::info!("Downloading {}", url);

    let response = reqwest::get(url).await?.error_for_status()?;
    let bytes = response.bytes().await?;

    Ok(bytes.to_vec())
}

/// Downloads a file that may not exist. A 404 yields `None`.
pub async fn download_optional(url: &str) -> Result<Option<Vec<u8>>> {
    log::debug!("Fetching {}", url);

    let response = reqwest::get(url).await?;
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let bytes = response.error_for_status()?.bytes().await?;

    Ok(Some(bytes.to_vec()))
}

/// Verifies that data matches the expected SHA-256 hash.
///
/// Compares the hash case-insensitively. Uses spawn_blocking to keep
/// CPU-bound hashing off the async runtime.
pub async fn verify_sha256(data: Vec<u8>, expected_hash: &str) -> Result<()> {
    use sha2::Digest as _;

    let expected_hash = expected_hash.to_string();

    tokio::task::spawn_blocking(move || {
        let mut hasher = sha2::Sha256::new();
        hasher.update(&data);
        let actual_hash = hex::encode(hasher.finalize());

        if actual_hash.eq_ignore_ascii_case(&expected_hash) {
            Ok(())
        } else {
            Err(Error::HashMismatch {
                expected: expected_hash,
                actual: actual_hash,
            })
        }
    })
    .await
    .map_err(|e| Error::GenericError(format!("Hash verification task failed: {}", e)))?
}

/// Looks up the hash for `file_name` in a `SHASUMS256.txt` listing.
///
/// Lines have the form `<hex>  <name>`, optionally with a `*` before the
/// name for binary mode.
pub fn find_checksum(listing: &str, file_name: &str) -> Option<String> {
    listing.lines().find_map(|line| {
        let (hash, name) = line.trim().split_once(char::is_whitespace)?;
        let name = name.trim_start().trim_start_matches('*');
        (name == file_name).then(|| hash.to_string())
    })
}

/// Extracts a ZIP archive on disk into a destination directory.
///
/// Creates parent directories as needed and restores Unix permission bits
/// stored in the archive.
///
/// **Security:** entries whose names would escape `dest` are rejected.
pub async fn extract_zip(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || extract_zip_blocking(&archive, &dest))
        .await
        .map_err(|e| Error::GenericError(format!("Extraction task failed: {}", e)))?
}

fn extract_zip_blocking(archive_path: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let file = std::fs::File::open(archive_path).fs_context("opening runtime archive", archive_path)?;
    let mut archive = zip::ZipArchive::new(std::io::BufReader::new(file))?;
    let mut extracted = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = entry.enclosed_name().ok_or_else(|| {
            Error::GenericError(format!(
                "Invalid ZIP entry path (potential traversal attack): {}",
                entry.name()
            ))
        })?;
        let out_path = dest.join(&relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).fs_context("creating directory", &out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        }

        #[cfg(unix)]
        if entry.is_symlink() {
            use std::io::Read as _;
            let mut target = String::new();
            entry.read_to_string(&mut target)?;
            std::os::unix::fs::symlink(&target, &out_path).fs_context("creating symlink", &out_path)?;
            extracted.push(relative);
            continue;
        }

        let mut out = std::fs::File::create(&out_path).fs_context("creating file", &out_path)?;
        std::io::copy(&mut entry, &mut out).fs_context("writing file", &out_path)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode & 0o7777))
                .fs_context("setting permissions", &out_path)?;
        }

        extracted.push(relative);
    }

    log::debug!("Extracted {} entries into {}", extracted.len(), dest.display());
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn checksum_lookup_handles_binary_marker() {
        let listing = "abc123  launchui-v0.1.4-linux-x64.zip\nDEF456 *launchui-v0.1.4-win32-x64.zip\n";
        assert_eq!(
            find_checksum(listing, "launchui-v0.1.4-linux-x64.zip").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            find_checksum(listing, "launchui-v0.1.4-win32-x64.zip").as_deref(),
            Some("DEF456")
        );
        assert_eq!(find_checksum(listing, "other.zip"), None);
    }

    #[tokio::test]
    async fn sha256_verification() {
        // sha256("abc")
        let good = "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD";
        verify_sha256(b"abc".to_vec(), good).await.unwrap();
        let err = verify_sha256(b"abd".to_vec(), good).await.unwrap_err();
        assert!(matches!(err, Error::HashMismatch { .. }));
    }

    #[tokio::test]
    async fn extract_zip_restores_tree() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("rt.zip");
        write_zip(&archive, &[("launchui", b"bin"), ("app/readme.txt", b"x")]);

        let dest = tmp.path().join("out");
        std::fs::create_dir(&dest).unwrap();
        let entries = extract_zip(&archive, &dest).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(std::fs::read(dest.join("launchui")).unwrap(), b"bin");
        assert!(dest.join("app/readme.txt").is_file());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(dest.join("launchui")).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[tokio::test]
    async fn extract_zip_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("broken.zip");
        std::fs::write(&archive, b"not a zip").unwrap();
        let err = extract_zip(&archive, tmp.path()).await.unwrap_err();
        assert!(matches!(err, Error::ZipError(_)));
    }
}
