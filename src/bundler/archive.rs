//! Zip packing of finished package directories.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::bundler::error::{Error, ErrorExt, Result};

/// Deflate level used for package archives.
pub const COMPRESSION_LEVEL: i64 = 9;

/// Zips every file under `src` into `dest`.
///
/// Symlinks are stored as link entries, not followed. Entry names are relative to `src` with forward slashes. The archive is
/// assembled in `{dest}.partial` and only renamed to `dest` once complete;
/// on error the partial file is removed.
pub async fn zip_directory(src: &Path, dest: &Path) -> Result<PathBuf> {
    zip_directory_with_cancel(src, dest, &CancellationToken::new()).await
}

/// [`zip_directory`], stopping with [`Error::Cancelled`] between entries
/// once `token` is cancelled.
pub async fn zip_directory_with_cancel(
    src: &Path,
    dest: &Path,
    token: &CancellationToken,
) -> Result<PathBuf> {
    let src = src.to_path_buf();
    let dest = dest.to_path_buf();
    let token = token.clone();

    tokio::task::spawn_blocking(move || {
        let partial = partial_path(&dest);
        match write_zip(&src, &partial, &token) {
            Ok(count) => {
                std::fs::rename(&partial, &dest).fs_context("renaming archive", &partial)?;
                log::debug!("Wrote {} entries to {}", count, dest.display());
                Ok(dest)
            }
            Err(e) => {
                if let Err(remove_err) = std::fs::remove_file(&partial) {
                    if remove_err.kind() != io::ErrorKind::NotFound {
                        log::warn!("Failed to remove {}: {}", partial.display(), remove_err);
                    }
                }
                Err(e)
            }
        }
    })
    .await
    .map_err(|e| Error::GenericError(format!("Archive task failed: {}", e)))?
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

fn write_zip(src: &Path, archive: &Path, token: &CancellationToken) -> Result<usize> {
    let file = File::create(archive).fs_context("creating archive", archive)?;
    let mut zip = ZipWriter::new(file);
    let base_options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    let mut count = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let entry = entry?;
        let path = entry.path();

        if entry.depth() > 0 && entry.path_is_symlink() {
            let name = entry_name(path.strip_prefix(src)?);
            let target = std::fs::read_link(path).fs_context("reading link", path)?;
            zip.add_symlink(name, target.to_string_lossy(), SimpleFileOptions::default())?;
            count += 1;
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry_name(path.strip_prefix(src)?);
        let options = base_options.unix_permissions(file_mode(path)?);

        zip.start_file(name, options)?;
        let mut reader = BufReader::new(File::open(path).fs_context("opening", path)?);
        io::copy(&mut reader, &mut zip).fs_context("compressing", path)?;
        count += 1;
    }

    zip.finish()?;
    Ok(count)
}

fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn file_mode(path: &Path) -> Result<u32> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = std::fs::metadata(path).fs_context("reading", path)?;
    Ok(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> Result<u32> {
    Ok(0o644)
}
