//! Application packager for LaunchUI runtimes.
//!
//! This module turns a JavaScript entry script and optional resources into a
//! runnable, platform-specific application directory (and optionally a zip
//! archive of it) built around a prebuilt runtime executable.
//!
//! # Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Plan paths | [`target`] | `{name}-v{version}-{platform}-{arch}` |
//! | Reuse check | [`guard`] | reuse, archive only, or full build |
//! | Materialize | [`runtime`] | runtime extracted into the package directory |
//! | Customize | [`platform`] | renamed executable and metadata |
//! | Install payload | [`payload`] | entry script, license, resources |
//! | Archive | [`archive`] | `{directory}.zip` |
//!
//! # Integration
//!
//! ```no_run
//! use kodegen_bundler_launcher::bundler::{Bundler, SettingsBuilder};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = SettingsBuilder::new()
//!     .name("demo")
//!     .version("1.0.0")
//!     .entry_script("src/main.js")
//!     .output_dir("dist")
//!     .pack("zip")
//!     .build()?;
//!
//! let archive = Bundler::new(settings).bundle().await?;
//! # let _ = archive;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod archive;
mod builder;
mod error;
pub mod guard;
pub mod payload;
pub mod platform;
pub mod runtime;
mod settings;
pub mod target;
pub mod utils;

// Public re-exports
pub use builder::{Bundler, PipelineState, Stage};
pub use error::{Context, Error, ErrorExt, Result};
pub use guard::Decision;
pub use platform::{PlatformCustomizer, RcEdit, ResourceEditor, VersionResource};
pub use runtime::{LaunchUiProvider, RuntimeProvider, RuntimeRequest};
pub use settings::{
    Arch, BundleSettings, DEFAULT_RESOURCE_PATTERN, PackFormat, PackageSettings, Platform,
    RuntimeSettings, Settings, SettingsBuilder,
};
pub use target::PackageTarget;
