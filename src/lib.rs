//! # Launcher Packager
//!
//! Packages a JavaScript application together with a prebuilt LaunchUI
//! runtime into a runnable, platform-specific application directory.
//!
//! ## Features
//!
//! - **Cross-packaging**: build win32, darwin and linux packages from any host
//! - **Idempotent**: existing complete output is reused unless `--overwrite` is given
//! - **Platform metadata**: Windows version resources and macOS `Info.plist`
//! - **Archives**: optional zip of the finished package
//! - **Runtime cache**: LaunchUI releases are downloaded once and verified
//!
//! ## Usage
//!
//! ```bash
//! kodegen_bundler_launcher demo 1.0.0 src/main.js
//! kodegen_bundler_launcher demo 1.0.0 src/main.js --platform darwin --pack zip
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bundler;
pub mod cli;
pub mod error;

// Re-export main types for public API
pub use bundler::{Bundler, Settings, SettingsBuilder};
pub use cli::Args;
pub use error::{CliError, PackagerError, Result};
