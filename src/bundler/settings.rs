//! Configuration structures for packaging operations.
//!
//! A [`Settings`] value is the immutable package request. It is produced once
//! by [`SettingsBuilder::build`], which performs every validation check before
//! any file-system work starts, and is only read afterwards.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use path_absolutize::Absolutize;

use crate::bundler::error::{Error, ErrorExt, Result};

/// Target operating system, named the way runtime releases name them.
///
/// Anything that is neither `win32` nor `darwin` is packaged like Linux.
///
/// # Examples
///
/// ```
/// use kodegen_bundler_launcher::bundler::Platform;
///
/// let platform: Platform = "win32".parse().unwrap();
/// assert_eq!(platform, Platform::Win32);
/// assert_eq!(Platform::Other("freebsd".into()).to_string(), "freebsd");
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Platform {
    /// Windows (`win32`)
    Win32,
    /// macOS (`darwin`)
    Darwin,
    /// Linux (`linux`)
    Linux,
    /// Any other platform string, packaged like Linux
    Other(String),
}

impl Platform {
    /// Returns the platform of the running host.
    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Win32,
            "macos" => Platform::Darwin,
            "linux" => Platform::Linux,
            other => Platform::Other(other.to_string()),
        }
    }

    /// Returns the short name used in directory names and download URLs.
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Win32 => "win32",
            Platform::Darwin => "darwin",
            Platform::Linux => "linux",
            Platform::Other(name) => name,
        }
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "" => return Err(Error::MissingOption("platform")),
            "win32" => Platform::Win32,
            "darwin" => Platform::Darwin,
            "linux" => Platform::Linux,
            other => Platform::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture, named the way runtime releases name them.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Arch {
    /// x86_64 / AMD64 (`x64`)
    X64,
    /// 32-bit x86 (`ia32`)
    Ia32,
    /// AArch64 (`arm64`)
    Arm64,
    /// 32-bit ARM (`arm`)
    Arm,
    /// Any other architecture string
    Other(String),
}

impl Arch {
    /// Returns the architecture of the running host.
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "x86_64" => Arch::X64,
            "x86" => Arch::Ia32,
            "aarch64" => Arch::Arm64,
            "arm" => Arch::Arm,
            other => Arch::Other(other.to_string()),
        }
    }

    /// Returns the short name used in directory names and download URLs.
    pub fn as_str(&self) -> &str {
        match self {
            Arch::X64 => "x64",
            Arch::Ia32 => "ia32",
            Arch::Arm64 => "arm64",
            Arch::Arm => "arm",
            Arch::Other(name) => name,
        }
    }
}

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "" => return Err(Error::MissingOption("arch")),
            "x64" => Arch::X64,
            "ia32" => Arch::Ia32,
            "arm64" => Arch::Arm64,
            "arm" => Arch::Arm,
            other => Arch::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Archive format for the finished package. Only zip is supported.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PackFormat {
    /// Deflate-compressed zip archive
    Zip,
}

impl PackFormat {
    /// File extension of archives in this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            PackFormat::Zip => "zip",
        }
    }
}

impl FromStr for PackFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zip" => Ok(PackFormat::Zip),
            other => Err(Error::InvalidOption {
                option: "pack",
                value: other.to_string(),
            }),
        }
    }
}

/// Package identity.
#[derive(Debug, Clone, Default)]
pub struct PackageSettings {
    /// Application name; becomes the executable and bundle name.
    pub product_name: String,

    /// Version string, copied verbatim into names and metadata.
    pub version: String,

    /// Script the runtime loads at start-up.
    pub entry_script: PathBuf,
}

/// Optional metadata and payload configuration.
///
/// Fields that do not apply to the target platform are ignored.
#[derive(Debug, Clone)]
pub struct BundleSettings {
    /// Company name written into the Windows version resource.
    pub company: Option<String>,

    /// Copyright notice (Windows version resource, macOS Info.plist).
    pub copyright: Option<String>,

    /// macOS bundle identifier. Defaults to `com.launchui.<name>`.
    pub identifier: Option<String>,

    /// macOS application category (`LSApplicationCategoryType`).
    pub category: Option<String>,

    /// Icon file: `.ico` for Windows, `.icns` for macOS.
    pub icon: Option<PathBuf>,

    /// License file copied to `LICENSE` at the package root.
    pub license: Option<PathBuf>,

    /// Directory that additional resource files are copied from.
    pub resource_dir: Option<PathBuf>,

    /// Glob patterns, relative to [`resource_dir`](Self::resource_dir),
    /// selecting the files to copy. Processed in order.
    pub resource_patterns: Vec<String>,
}

impl Default for BundleSettings {
    fn default() -> Self {
        Self {
            company: None,
            copyright: None,
            identifier: None,
            category: None,
            icon: None,
            license: None,
            resource_dir: None,
            resource_patterns: vec![DEFAULT_RESOURCE_PATTERN.to_string()],
        }
    }
}

/// Pattern used when no resource patterns are given: every file, recursively.
pub const DEFAULT_RESOURCE_PATTERN: &str = "**";

/// Options forwarded to the runtime provider.
#[derive(Debug, Clone, Default)]
pub struct RuntimeSettings {
    /// Runtime release to package. `None` selects the provider default.
    pub version: Option<String>,

    /// Directory downloaded runtimes are cached in. `None` selects the
    /// provider default.
    pub cache_dir: Option<PathBuf>,
}

/// Immutable package request, constructed via [`SettingsBuilder`].
#[derive(Clone, Debug)]
pub struct Settings {
    package: PackageSettings,
    bundle_settings: BundleSettings,
    runtime: RuntimeSettings,
    output_dir: PathBuf,
    platform: Platform,
    arch: Arch,
    overwrite: bool,
    pack_format: Option<PackFormat>,
}

impl Settings {
    /// Returns the product name.
    pub fn product_name(&self) -> &str {
        &self.package.product_name
    }

    /// Returns the version string.
    pub fn version_string(&self) -> &str {
        &self.package.version
    }

    /// Returns the entry script path.
    pub fn entry_script(&self) -> &Path {
        &self.package.entry_script
    }

    /// Returns the absolute output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the target platform.
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Returns the target architecture.
    pub fn arch(&self) -> &Arch {
        &self.arch
    }

    /// Whether existing output is deleted and rebuilt.
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Requested archive format, if any.
    pub fn pack_format(&self) -> Option<PackFormat> {
        self.pack_format
    }

    /// Returns the bundle settings.
    pub fn bundle_settings(&self) -> &BundleSettings {
        &self.bundle_settings
    }

    /// Returns the runtime provider options.
    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }
}

/// Builder for constructing [`Settings`].
///
/// Options are collected as given by the caller; [`build`](Self::build)
/// checks them in a fixed order (name, version, entry, out, output directory
/// existence, pack format) and reports the first problem.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_launcher::bundler::SettingsBuilder;
///
/// # fn example() -> kodegen_bundler_launcher::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .name("demo")
///     .version("1.0.0")
///     .entry_script("main.js")
///     .output_dir("dist")
///     .platform("linux")
///     .arch("x64")
///     .pack("zip")
///     .build()?;
/// assert_eq!(settings.product_name(), "demo");
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    name: Option<String>,
    version: Option<String>,
    entry_script: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    platform: Option<String>,
    arch: Option<String>,
    overwrite: bool,
    pack: Option<String>,
    bundle_settings: BundleSettings,
    runtime: RuntimeSettings,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the application name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the application version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the entry script.
    pub fn entry_script<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.entry_script = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output directory. It must exist when [`build`](Self::build) runs.
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the target platform. Default: host platform.
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Sets the target architecture. Default: host architecture.
    pub fn arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    /// Replace existing output instead of reusing it. Default: false.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets the archive format. Only `"zip"` is accepted.
    pub fn pack(mut self, format: impl Into<String>) -> Self {
        self.pack = Some(format.into());
        self
    }

    /// Sets optional metadata and payload configuration.
    pub fn bundle_settings(mut self, settings: BundleSettings) -> Self {
        self.bundle_settings = settings;
        self
    }

    /// Sets runtime provider options.
    pub fn runtime(mut self, runtime: RuntimeSettings) -> Self {
        self.runtime = runtime;
        self
    }

    /// Validates the collected options and builds the settings.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingOption`] for an absent or empty name, version,
    ///   entry or out option
    /// - [`Error::OutputDirMissing`] if the output directory does not exist
    /// - [`Error::InvalidOption`] for a pack format other than `zip`
    pub fn build(self) -> Result<Settings> {
        let name = required(self.name, "name")?;
        let version = required(self.version, "version")?;
        let entry_script = required_path(self.entry_script, "entry")?;
        let out = required_path(self.output_dir, "out")?;

        let output_dir = out
            .absolutize()
            .fs_context("resolving output directory", &out)?
            .into_owned();
        if !output_dir.is_dir() {
            return Err(Error::OutputDirMissing(output_dir));
        }

        let pack_format = self.pack.as_deref().map(PackFormat::from_str).transpose()?;

        let platform = match self.platform.as_deref() {
            Some(p) if !p.is_empty() => p.parse()?,
            _ => Platform::host(),
        };
        let arch = match self.arch.as_deref() {
            Some(a) if !a.is_empty() => a.parse()?,
            _ => Arch::host(),
        };

        let mut bundle_settings = self.bundle_settings;
        if let Some(dir) = bundle_settings.resource_dir.take() {
            let resolved = dir
                .absolutize()
                .fs_context("resolving resource directory", &dir)?
                .into_owned();
            bundle_settings.resource_dir = Some(resolved);
        }
        if bundle_settings.resource_patterns.is_empty() {
            bundle_settings.resource_patterns = vec![DEFAULT_RESOURCE_PATTERN.to_string()];
        }

        Ok(Settings {
            package: PackageSettings {
                product_name: name,
                version,
                entry_script,
            },
            bundle_settings,
            runtime: self.runtime,
            output_dir,
            platform,
            arch,
            overwrite: self.overwrite,
            pack_format,
        })
    }
}

fn required(value: Option<String>, option: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::MissingOption(option)),
    }
}

fn required_path(value: Option<PathBuf>, option: &'static str) -> Result<PathBuf> {
    match value {
        Some(p) if !p.as_os_str().is_empty() => Ok(p),
        _ => Err(Error::MissingOption(option)),
    }
}
