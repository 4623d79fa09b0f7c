//! Runtime artifacts: where they come from and how they reach the package.
//!
//! The pipeline only needs a local path to a runtime zip for a
//! platform/architecture pair. [`RuntimeProvider`] is that seam;
//! [`LaunchUiProvider`] is the production implementation, downloading
//! LaunchUI releases from GitHub into a cache directory.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::bundler::{
    error::{Context, Error, ErrorExt, Result},
    settings::{Arch, Platform, RuntimeSettings},
    utils::http,
};

/// Runtime release used when none is requested.
pub const DEFAULT_RUNTIME_VERSION: &str = "0.1.4";

/// Base URL of LaunchUI release downloads.
pub const LAUNCHUI_RELEASES_URL: &str = "https://github.com/mimecorg/launchui/releases/download";

/// Everything a provider needs to locate one runtime artifact.
#[derive(Clone, Debug)]
pub struct RuntimeRequest {
    /// Target platform
    pub platform: Platform,
    /// Target architecture
    pub arch: Arch,
    /// Requested runtime release; `None` means the provider default
    pub version: Option<String>,
    /// Cache directory; `None` means the provider default
    pub cache_dir: Option<PathBuf>,
}

impl RuntimeRequest {
    /// Builds a request from the target and the runtime options of a package.
    pub fn new(platform: &Platform, arch: &Arch, runtime: &RuntimeSettings) -> Self {
        Self {
            platform: platform.clone(),
            arch: arch.clone(),
            version: runtime.version.clone(),
            cache_dir: runtime.cache_dir.clone(),
        }
    }
}

/// Supplies runtime artifact archives.
#[async_trait]
pub trait RuntimeProvider: Send + Sync {
    /// Returns a local path to the runtime zip for `request`.
    ///
    /// Failures (unsupported target, network, checksum) are returned unchanged
    /// to the caller of the pipeline.
    async fn fetch(&self, request: &RuntimeRequest) -> Result<PathBuf>;
}

/// Downloads LaunchUI runtime releases and caches them on disk.
#[derive(Clone, Debug)]
pub struct LaunchUiProvider {
    base_url: String,
}

impl Default for LaunchUiProvider {
    fn default() -> Self {
        Self {
            base_url: LAUNCHUI_RELEASES_URL.to_string(),
        }
    }
}

impl LaunchUiProvider {
    /// Creates a provider for the official release location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider that downloads from a mirror with the same layout.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn release_url(&self, version: &str, file: &str) -> String {
        format!("{}/v{}/{}", self.base_url, version, file)
    }
}

/// File name of a runtime release archive.
pub fn artifact_name(version: &str, platform: &Platform, arch: &Arch) -> String {
    format!("launchui-v{version}-{platform}-{arch}.zip")
}

/// Default cache location: `<user cache dir>/launchui`.
pub fn default_cache_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|dir| dir.join("launchui"))
        .context("could not determine the user cache directory; pass a runtime cache path")
}

fn ensure_supported(platform: &Platform, arch: &Arch) -> Result<()> {
    let platform_ok = matches!(platform, Platform::Win32 | Platform::Darwin | Platform::Linux);
    let arch_ok = matches!(arch, Arch::X64 | Arch::Ia32 | Arch::Arm64 | Arch::Arm);
    if platform_ok && arch_ok {
        Ok(())
    } else {
        Err(Error::UnsupportedRuntime {
            platform: platform.to_string(),
            arch: arch.to_string(),
        })
    }
}

#[async_trait]
impl RuntimeProvider for LaunchUiProvider {
    async fn fetch(&self, request: &RuntimeRequest) -> Result<PathBuf> {
        ensure_supported(&request.platform, &request.arch)?;

        let version = request.version.as_deref().unwrap_or(DEFAULT_RUNTIME_VERSION);
        let cache_dir = match &request.cache_dir {
            Some(dir) => dir.clone(),
            None => default_cache_dir()?,
        };
        let file_name = artifact_name(version, &request.platform, &request.arch);
        let cached = cache_dir.join(&file_name);

        if cached.is_file() {
            log::debug!("Runtime already cached at {}", cached.display());
            return Ok(cached);
        }

        tokio::fs::create_dir_all(&cache_dir)
            .await
            .fs_context("creating runtime cache", &cache_dir)?;

        let data = http::download(&self.release_url(version, &file_name))
            .await
            .with_context(|| format!("downloading {file_name}"))?;

        match http::download_optional(&self.release_url(version, "SHASUMS256.txt")).await? {
            Some(listing) => {
                let listing = String::from_utf8_lossy(&listing);
                match http::find_checksum(&listing, &file_name) {
                    Some(expected) => {
                        log::info!("validating hash");
                        http::verify_sha256(data.clone(), &expected).await?;
                    }
                    None => log::warn!("{file_name} is not listed in SHASUMS256.txt"),
                }
            }
            None => log::debug!("No SHASUMS256.txt published for v{version}, skipping verification"),
        }

        // Write next to the final path and rename so a cache entry is never partial.
        let partial = cache_dir.join(format!("{file_name}.download"));
        tokio::fs::write(&partial, &data)
            .await
            .fs_context("writing runtime download", &partial)?;
        tokio::fs::rename(&partial, &cached)
            .await
            .fs_context("storing runtime in cache", &cached)?;

        log::info!("Cached runtime {}", cached.display());
        Ok(cached)
    }
}
