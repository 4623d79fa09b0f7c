//! Reuse decisions and bookkeeping for a package target.
//!
//! The guard is the only place that decides whether earlier output can be
//! returned as-is. `overwrite` is a binary switch: either whatever is on disk
//! is reused, or the directory is deleted and rebuilt from scratch.
//!
//! A directory is only reusable when it is complete. While a build runs, a
//! `{directory}.incomplete` file sits next to the package directory; it is
//! removed once the payload stage finishes, so a directory left behind by a
//! failed run is never mistaken for a finished package.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::bundler::error::{ErrorExt, Result};
use crate::bundler::settings::PackFormat;
use crate::bundler::target::PackageTarget;

/// What the pipeline has to do for a target.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Earlier output is returned unchanged.
    Reuse(PathBuf),
    /// The existing directory is packed, nothing else runs.
    ArchiveOnly,
    /// Run every stage. `stale` is true when a directory must be removed first.
    Build {
        /// Whether an old directory exists at the target path
        stale: bool,
    },
}

/// Decides what work is needed for `target`.
pub fn decide(target: &PackageTarget, overwrite: bool, pack: Option<PackFormat>) -> Decision {
    let dir = target.directory_path();
    let stale = dir.exists();

    if overwrite {
        return Decision::Build { stale };
    }

    if pack.is_some() && target.archive_path().exists() {
        log::info!("Output package already exists: {}", target.archive_name());
        return Decision::Reuse(target.archive_path().to_path_buf());
    }

    if stale {
        if is_incomplete(target) {
            log::warn!(
                "Output directory {} was left incomplete by an earlier run, rebuilding",
                target.directory_name()
            );
            return Decision::Build { stale };
        }

        log::info!("Output directory already exists: {}", target.directory_name());
        return match pack {
            Some(_) => Decision::ArchiveOnly,
            None => Decision::Reuse(dir.to_path_buf()),
        };
    }

    Decision::Build { stale: false }
}

/// Whether a build of `target` started without finishing.
pub fn is_incomplete(target: &PackageTarget) -> bool {
    target.incomplete_marker_path().exists()
}

/// Records that a build of `target` has started.
pub async fn mark_incomplete(target: &PackageTarget) -> Result<()> {
    let marker = target.incomplete_marker_path();
    tokio::fs::write(&marker, target.directory_name())
        .await
        .fs_context("writing incomplete marker", &marker)
}

/// Records that the package directory of `target` is complete.
pub async fn mark_complete(target: &PackageTarget) -> Result<()> {
    let marker = target.incomplete_marker_path();
    match tokio::fs::remove_file(&marker).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing incomplete marker", &marker),
    }
}

/// Exclusive advisory lock on a package target, held for a whole run.
///
/// On Unix the lock is a non-blocking `flock` on `{directory}.lock`; a second
/// run against the same target fails fast with
/// [`Error::Locked`](crate::bundler::Error::Locked). Other hosts get a
/// no-op lock and callers must serialize runs themselves.
///
/// The lock file is never unlinked, so every run locks the same inode.
#[derive(Debug)]
pub struct TargetLock {
    path: PathBuf,
    #[cfg(unix)]
    _handle: nix::fcntl::Flock<std::fs::File>,
}

impl TargetLock {
    /// Acquires the lock for `target`.
    pub fn acquire(target: &PackageTarget) -> Result<Self> {
        let path = target.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .fs_context("opening lock file", &path)?;

        #[cfg(unix)]
        {
            use nix::fcntl::{Flock, FlockArg};
            use std::io::Write;

            let mut handle = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
                Ok(handle) => handle,
                Err((_, errno)) if errno == nix::errno::Errno::EWOULDBLOCK => {
                    return Err(crate::bundler::Error::Locked(
                        target.directory_path().to_path_buf(),
                    ));
                }
                Err((_, errno)) => {
                    return Err(std::io::Error::from(errno)).fs_context("locking target", &path);
                }
            };

            let lock_data = serde_json::json!({ "pid": std::process::id() });
            handle.set_len(0).fs_context("truncating lock file", &path)?;
            handle
                .write_all(lock_data.to_string().as_bytes())
                .fs_context("writing lock file", &path)?;

            log::debug!("Locked {}", path.display());
            Ok(Self {
                path,
                _handle: handle,
            })
        }

        #[cfg(not(unix))]
        {
            drop(file);
            log::debug!("Advisory locking unavailable, not locking {}", path.display());
            Ok(Self { path })
        }
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
