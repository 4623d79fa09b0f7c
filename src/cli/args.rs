//! Command line argument parsing.
//!
//! Arguments map one-to-one onto [`SettingsBuilder`] calls. Apart from the
//! flag combinations checked by [`Args::validate`], validation happens when
//! the settings are built.

use std::path::PathBuf;

use clap::Parser;

use crate::bundler::{self, BundleSettings, RuntimeSettings, Settings, SettingsBuilder};
use crate::error::CliError;

/// Package a JavaScript application with the LaunchUI runtime
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_launcher",
    version,
    about = "Package a JavaScript application with the LaunchUI runtime",
    long_about = "Create a runnable application directory (optionally zipped) from a
JavaScript entry script and a prebuilt LaunchUI runtime.

Usage:
  kodegen_bundler_launcher demo 1.0.0 src/main.js
  kodegen_bundler_launcher demo 1.0.0 src/main.js --out dist --platform win32 --arch x64
  kodegen_bundler_launcher demo 1.0.0 src/main.js --pack zip --dir assets --files 'img/**,*.css'"
)]
pub struct Args {
    /// Application name
    #[arg(index = 1, value_name = "NAME")]
    pub name: String,

    /// Application version
    #[arg(id = "app_version", index = 2, value_name = "VERSION")]
    pub version: String,

    /// Entry script loaded by the runtime
    #[arg(index = 3, value_name = "ENTRY")]
    pub entry: PathBuf,

    /// Existing directory the package is written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub out: PathBuf,

    /// Target platform (win32, darwin, linux); defaults to the host
    #[arg(long, value_name = "PLATFORM")]
    pub platform: Option<String>,

    /// Target architecture (x64, ia32, arm64, arm); defaults to the host
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Rebuild even if the package already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Also create an archive of the package (zip)
    #[arg(long, value_name = "FORMAT")]
    pub pack: Option<String>,

    /// LaunchUI runtime release to package
    #[arg(long, value_name = "VERSION", env = "LAUNCHUI_VERSION")]
    pub launchui_version: Option<String>,

    /// Directory downloaded runtimes are cached in
    #[arg(long, value_name = "DIR", env = "LAUNCHUI_CACHE")]
    pub launchui_cache: Option<PathBuf>,

    /// Company name (Windows)
    #[arg(long)]
    pub company: Option<String>,

    /// Copyright notice (Windows, macOS)
    #[arg(long)]
    pub copyright: Option<String>,

    /// Bundle identifier (macOS)
    #[arg(long)]
    pub identifier: Option<String>,

    /// Application category (macOS)
    #[arg(long)]
    pub category: Option<String>,

    /// Icon file: .ico for Windows, .icns for macOS
    #[arg(long, value_name = "FILE")]
    pub icon: Option<PathBuf>,

    /// License file copied to LICENSE in the package
    #[arg(long, value_name = "FILE")]
    pub license: Option<PathBuf>,

    /// Directory resource files are copied from
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Comma separated glob patterns selecting resource files
    #[arg(long, value_name = "PATTERN,...", value_delimiter = ',')]
    pub files: Vec<String>,

    /// Show debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Checks combinations clap cannot express.
    pub fn validate(&self) -> Result<(), CliError> {
        if !self.files.is_empty() && self.dir.is_none() {
            return Err(CliError::InvalidArguments {
                reason: "--files selects resources inside --dir, which is missing".to_string(),
            });
        }
        Ok(())
    }

    /// Validated package request for these arguments.
    pub fn to_settings(&self) -> bundler::Result<Settings> {
        let files: Vec<String> = self
            .files
            .iter()
            .map(|pattern| pattern.trim().to_string())
            .filter(|pattern| !pattern.is_empty())
            .collect();

        let bundle = BundleSettings {
            company: self.company.clone(),
            copyright: self.copyright.clone(),
            identifier: self.identifier.clone(),
            category: self.category.clone(),
            icon: self.icon.clone(),
            license: self.license.clone(),
            resource_dir: self.dir.clone(),
            resource_patterns: files,
        };

        let mut builder = SettingsBuilder::new()
            .name(self.name.clone())
            .version(self.version.clone())
            .entry_script(&self.entry)
            .output_dir(&self.out)
            .overwrite(self.overwrite)
            .bundle_settings(bundle)
            .runtime(RuntimeSettings {
                version: self.launchui_version.clone(),
                cache_dir: self.launchui_cache.clone(),
            });

        if let Some(platform) = &self.platform {
            builder = builder.platform(platform.clone());
        }
        if let Some(arch) = &self.arch {
            builder = builder.arch(arch.clone());
        }
        if let Some(pack) = &self.pack {
            builder = builder.pack(pack.clone());
        }

        builder.build()
    }

    /// `log` level implied by `--verbose` and `--quiet`.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}
