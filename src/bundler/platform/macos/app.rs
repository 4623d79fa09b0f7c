//! Info.plist rewriting for application bundles.

use std::path::{Path, PathBuf};

use plist::{Dictionary, Value};

use crate::bail;
use crate::bundler::{
    error::{Error, Result},
    settings::Settings,
};

/// Bundle identifier prefix used when none is supplied.
pub const DEFAULT_IDENTIFIER_PREFIX: &str = "com.launchui";

/// Reads, updates and writes back the bundle's `Info.plist`.
///
/// Returns the icon file name the plist references, to be used when copying
/// a custom icon into `Contents/Resources`. Malformed plists are an error,
/// never replaced by defaults.
pub async fn update_info_plist(plist_path: &Path, settings: &Settings) -> Result<String> {
    let path: PathBuf = plist_path.to_path_buf();
    let settings = settings.clone();

    tokio::task::spawn_blocking(move || -> Result<String> {
        let Some(mut dict) = Value::from_file(&path)?.into_dictionary() else {
            bail!("{} is not a dictionary plist", path.display());
        };

        let icon_file = apply_bundle_metadata(&mut dict, &settings);

        Value::Dictionary(dict).to_file_xml(&path)?;
        log::debug!("Wrote {}", path.display());
        Ok(icon_file)
    })
    .await
    .map_err(|e| Error::GenericError(format!("Info.plist task failed: {}", e)))?
}

/// Writes the package identity into a bundle's Info.plist dictionary.
///
/// Returns the icon file name. When the runtime names no icon file,
/// `{name}.icns` is returned and recorded as `CFBundleIconFile` only if a
/// custom icon will be copied there.
pub fn apply_bundle_metadata(dict: &mut Dictionary, settings: &Settings) -> String {
    let name = settings.product_name();
    let version = settings.version_string();
    let bundle = settings.bundle_settings();

    dict.insert("CFBundleName".into(), name.into());
    dict.insert("CFBundleExecutable".into(), name.into());
    dict.insert("CFBundleVersion".into(), version.into());
    dict.insert("CFBundleShortVersionString".into(), version.into());

    let identifier = bundle
        .identifier
        .clone()
        .unwrap_or_else(|| default_identifier(name));
    dict.insert("CFBundleIdentifier".into(), identifier.into());

    if let Some(copyright) = &bundle.copyright {
        dict.insert("NSHumanReadableCopyright".into(), copyright.clone().into());
    }
    if let Some(category) = &bundle.category {
        dict.insert("LSApplicationCategoryType".into(), category.clone().into());
    }

    match dict.get("CFBundleIconFile").and_then(Value::as_string) {
        Some(existing) if Path::new(existing).extension().is_some() => existing.to_string(),
        Some(existing) => format!("{existing}.icns"),
        None => {
            let icon_file = format!("{name}.icns");
            if bundle.icon.is_some() {
                dict.insert("CFBundleIconFile".into(), icon_file.clone().into());
            }
            icon_file
        }
    }
}

/// `com.launchui.<name>` with characters outside `[A-Za-z0-9.-]` replaced by `-`.
pub fn default_identifier(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '-' })
        .collect();
    format!("{DEFAULT_IDENTIFIER_PREFIX}.{sanitized}")
}
