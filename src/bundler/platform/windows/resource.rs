//! Executable version resources.
//!
//! [`VersionResource`] describes the edit; a [`ResourceEditor`] applies it.
//! The production editor, [`RcEdit`], drives the `rcedit` tool, through
//! `wine` when the tool is a Windows executable and the host is not Windows.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::bundler::{
    error::{Error, Result},
    settings::Settings,
};

/// Fields written into an executable's version resource.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VersionResource {
    /// `version-string` table (e.g. `ProductName` → name)
    pub version_strings: BTreeMap<String, String>,
    /// Binary file version
    pub file_version: String,
    /// Binary product version
    pub product_version: String,
    /// Icon to embed
    pub icon: Option<PathBuf>,
}

impl VersionResource {
    /// Builds the resource for a package request.
    pub fn from_settings(settings: &Settings) -> Self {
        let name = settings.product_name();
        let bundle = settings.bundle_settings();

        let mut version_strings = BTreeMap::new();
        version_strings.insert("FileDescription".to_string(), name.to_string());
        version_strings.insert("OriginalFilename".to_string(), name.to_string());
        version_strings.insert("ProductName".to_string(), name.to_string());
        if let Some(company) = &bundle.company {
            version_strings.insert("CompanyName".to_string(), company.clone());
        }
        if let Some(copyright) = &bundle.copyright {
            version_strings.insert("LegalCopyright".to_string(), copyright.clone());
        }

        Self {
            version_strings,
            file_version: settings.version_string().to_string(),
            product_version: settings.version_string().to_string(),
            icon: bundle.icon.clone(),
        }
    }

    /// Command-line arguments for `rcedit` editing `executable`.
    pub fn rcedit_args(&self, executable: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![executable.as_os_str().to_owned()];
        for (key, value) in &self.version_strings {
            args.push("--set-version-string".into());
            args.push(key.into());
            args.push(value.into());
        }
        args.push("--set-file-version".into());
        args.push((&self.file_version).into());
        args.push("--set-product-version".into());
        args.push((&self.product_version).into());
        if let Some(icon) = &self.icon {
            args.push("--set-icon".into());
            args.push(icon.as_os_str().to_owned());
        }
        args
    }
}

/// Rewrites embedded resources of a Windows executable in place.
#[async_trait]
pub trait ResourceEditor: Send + Sync {
    /// Applies `resource` to `executable`.
    async fn edit(&self, executable: &Path, resource: &VersionResource) -> Result<()>;
}

/// [`ResourceEditor`] backed by the `rcedit` command-line tool.
#[derive(Clone, Debug, Default)]
pub struct RcEdit {
    program: Option<PathBuf>,
}

/// Names searched in `PATH` when no explicit tool is configured.
const RCEDIT_CANDIDATES: &[&str] = &["rcedit", "rcedit-x64.exe", "rcedit.exe"];

impl RcEdit {
    /// Uses the given `rcedit` binary instead of searching `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    fn locate(&self, executable: &Path) -> Result<PathBuf> {
        if let Some(program) = &self.program {
            return Ok(program.clone());
        }
        RCEDIT_CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| Error::ResourceEdit {
                path: executable.to_path_buf(),
                reason: format!(
                    "rcedit not found in PATH (looked for {})",
                    RCEDIT_CANDIDATES.join(", ")
                ),
            })
    }
}

#[async_trait]
impl ResourceEditor for RcEdit {
    async fn edit(&self, executable: &Path, resource: &VersionResource) -> Result<()> {
        let tool = self.locate(executable)?;
        let needs_wine = !cfg!(windows)
            && tool
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"));

        let mut command = if needs_wine {
            let wine = which::which("wine").map_err(|e| Error::ResourceEdit {
                path: executable.to_path_buf(),
                reason: format!("wine is required to run {}: {}", tool.display(), e),
            })?;
            let mut command = tokio::process::Command::new(wine);
            command.arg(&tool);
            command
        } else {
            tokio::process::Command::new(&tool)
        };
        command.args(resource.rcedit_args(executable));

        log::debug!("Running {:?}", command);
        let output = command.output().await.map_err(|error| Error::CommandFailed {
            command: tool.display().to_string(),
            error,
        })?;

        if !output.status.success() {
            return Err(Error::ResourceEdit {
                path: executable.to_path_buf(),
                reason: format!(
                    "{} exited with {:?}: {}",
                    tool.display(),
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(())
    }
}
