//! Installation of the application payload into a customized runtime.
//!
//! Three things are copied, in order: the entry script, the license file and
//! the resource files selected by glob patterns.

use std::path::{Path, PathBuf};

use glob::MatchOptions;
use path_absolutize::Absolutize;
use tokio_util::sync::CancellationToken;

use crate::bundler::{
    error::{Context, ErrorExt, Result},
    settings::Settings,
    target::PackageTarget,
    utils::{cancel, fs},
};

/// Extension used for the installed entry script when the source has none.
pub const DEFAULT_SCRIPT_EXTENSION: &str = "js";

/// Name of the license file at the package root.
pub const LICENSE_FILE_NAME: &str = "LICENSE";

/// Copies the payload of `settings` into the package.
///
/// `resources_dir` is the application-resources directory returned by the
/// platform customizer.
pub async fn install(
    settings: &Settings,
    target: &PackageTarget,
    resources_dir: &Path,
    token: &CancellationToken,
) -> Result<()> {
    let script = settings.entry_script();
    let script_dest = resources_dir.join(entry_script_name(script));
    log::debug!("Installing entry script {}", script.display());
    cancel::cancellable(token, fs::copy_file(script, &script_dest))
        .await
        .context("installing entry script")?;

    let bundle = settings.bundle_settings();
    if let Some(license) = &bundle.license {
        let dest = target.directory_path().join(LICENSE_FILE_NAME);
        cancel::cancellable(token, fs::copy_file(license, &dest))
            .await
            .context("installing license")?;
    }

    if let Some(source_dir) = &bundle.resource_dir {
        let mut copied = 0usize;
        for pattern in &bundle.resource_patterns {
            for relative in matching_files(source_dir, pattern)? {
                cancel::check(token)?;
                fs::copy_file(&source_dir.join(&relative), &resources_dir.join(&relative))
                    .await
                    .with_context(|| format!("copying resource {}", relative.display()))?;
                copied += 1;
            }
        }
        log::debug!("Copied {} resource file(s) from {}", copied, source_dir.display());
    }

    Ok(())
}

/// `main.<ext>` for an entry script, keeping its extension.
pub fn entry_script_name(script: &Path) -> String {
    let ext = script
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or(DEFAULT_SCRIPT_EXTENSION);
    format!("main.{ext}")
}

/// Files under `base` matching `pattern`, as paths relative to `base`, in
/// matcher order.
///
/// A trailing `**` selects everything below that point, files included.
/// A relative `base` is resolved against the working directory first.
pub fn matching_files(base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let resolved = base
        .absolutize()
        .fs_context("resolving resource directory", base)?;
    let base: &Path = &resolved;
    let escaped_base = glob::Pattern::escape(&base.to_string_lossy());
    let full = format!(
        "{}/{}",
        escaped_base.trim_end_matches('/'),
        normalize_pattern(pattern)
    );

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut files = Vec::new();
    for entry in glob::glob_with(&full, options)? {
        let path = entry?;
        if !path.is_file() {
            continue;
        }
        files.push(path.strip_prefix(base)?.to_path_buf());
    }
    Ok(files)
}

fn normalize_pattern(pattern: &str) -> String {
    let pattern = pattern.trim_start_matches("./");
    if pattern == "**" || pattern.ends_with("/**") {
        format!("{pattern}/*")
    } else {
        pattern.to_string()
    }
}
