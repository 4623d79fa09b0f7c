//! Output naming for a package request.
//!
//! Names are a pure function of the package identity:
//! `{name}-v{version}-{platform}-{arch}` for the directory and the same name
//! with `.zip` appended for the archive.

use std::path::{Path, PathBuf};

use crate::bundler::settings::{PackFormat, Settings};

/// Derived output locations for one package request. Read-only once planned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackageTarget {
    directory_name: String,
    archive_name: String,
    directory_path: PathBuf,
    archive_path: PathBuf,
}

impl PackageTarget {
    /// Plans the output paths for an identity under `output_dir`.
    pub fn plan(name: &str, version: &str, platform: &str, arch: &str, output_dir: &Path) -> Self {
        let directory_name = format!("{name}-v{version}-{platform}-{arch}");
        let archive_name = format!("{directory_name}.{}", PackFormat::Zip.extension());
        Self {
            directory_path: output_dir.join(&directory_name),
            archive_path: output_dir.join(&archive_name),
            directory_name,
            archive_name,
        }
    }

    /// Plans the output paths for validated settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::plan(
            settings.product_name(),
            settings.version_string(),
            settings.platform().as_str(),
            settings.arch().as_str(),
            settings.output_dir(),
        )
    }

    /// `{name}-v{version}-{platform}-{arch}`
    pub fn directory_name(&self) -> &str {
        &self.directory_name
    }

    /// Directory name plus `.zip`.
    pub fn archive_name(&self) -> &str {
        &self.archive_name
    }

    /// Absolute path of the package directory.
    pub fn directory_path(&self) -> &Path {
        &self.directory_path
    }

    /// Absolute path of the archive.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Sibling file that exists while the directory is being built.
    pub fn incomplete_marker_path(&self) -> PathBuf {
        self.sibling(".incomplete")
    }

    /// Sibling file used to lock the target for the duration of a run.
    pub fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.directory_name.clone();
        name.push_str(suffix);
        self.directory_path.with_file_name(name)
    }
}
