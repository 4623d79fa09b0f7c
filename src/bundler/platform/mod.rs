//! Platform-specific customization of an extracted runtime.
//!
//! Each target platform has one [`PlatformCustomizer`]. The orchestrator picks
//! it once from the `platform` setting via [`customizer_for`]; nothing probes
//! the host at run time.
//!
//! # Output Layout
//!
//! | Platform | Executable | App-resources dir | Metadata |
//! |----------|------------|-------------------|----------|
//! | win32 | `{dir}/{name}.exe` | `{dir}/app/` | version resource ([`windows`]) |
//! | darwin | `{dir}/{name}.app/Contents/MacOS/{name}` | `{dir}/{name}.app/Contents/Resources/app/` | `Info.plist` ([`macos`]) |
//! | other | `{dir}/{name}` | `{dir}/app/` | none ([`linux`]) |

pub mod linux;
pub mod macos;
pub mod windows;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::bundler::{
    error::Result,
    settings::{Platform, Settings},
    target::PackageTarget,
};

pub use windows::resource::{RcEdit, ResourceEditor, VersionResource};

/// Name of the application-resources directory inside the package.
pub const APP_DIR_NAME: &str = "app";

/// Inputs shared by every customizer.
#[derive(Clone, Copy, Debug)]
pub struct CustomizeContext<'a> {
    /// Validated package request
    pub settings: &'a Settings,
    /// Planned output paths
    pub target: &'a PackageTarget,
    /// Cancellation for long-running steps
    pub cancel: &'a CancellationToken,
}

/// Renames the runtime and applies platform metadata.
#[async_trait]
pub trait PlatformCustomizer: Send + Sync {
    /// Short platform label for logs.
    fn label(&self) -> &'static str;

    /// Customizes the freshly extracted runtime in the package directory.
    ///
    /// Returns the application-resources directory the payload goes into.
    async fn customize(&self, ctx: &CustomizeContext<'_>) -> Result<PathBuf>;
}

/// Selects the customizer for `platform`.
///
/// `editor` is only used by the Windows variant.
pub fn customizer_for(
    platform: &Platform,
    editor: Arc<dyn ResourceEditor>,
) -> Box<dyn PlatformCustomizer> {
    match platform {
        Platform::Win32 => Box::new(windows::WindowsCustomizer::new(editor)),
        Platform::Darwin => Box::new(macos::MacOsCustomizer),
        Platform::Linux | Platform::Other(_) => Box::new(linux::LinuxCustomizer),
    }
}
