//! Package orchestration.
//!
//! This module provides the [`Bundler`] orchestrator that turns a validated
//! [`Settings`] into a runnable package directory, and optionally a zip of it.
//!
//! # Overview
//!
//! The bundler:
//! 1. Plans the output paths ([`PackageTarget`])
//! 2. Locks the target and asks the guard what work is left ([`Decision`])
//! 3. Runs the remaining [`Stage`]s in order, stopping at the first error
//! 4. Returns the archive path when packing, else the directory path
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_launcher::bundler::{Bundler, SettingsBuilder};
//!
//! # async fn example() -> kodegen_bundler_launcher::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .name("demo")
//!     .version("1.0.0")
//!     .entry_script("src/main.js")
//!     .output_dir("dist")
//!     .platform("linux")
//!     .arch("x64")
//!     .build()?;
//!
//! let path = Bundler::new(settings).bundle().await?;
//! println!("Created: {}", path.display());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::bundler::{
    archive,
    error::{Context, Error, Result},
    guard::{self, Decision, TargetLock},
    payload,
    platform::{self, CustomizeContext, PlatformCustomizer, RcEdit, ResourceEditor},
    runtime::{LaunchUiProvider, RuntimeProvider, RuntimeRequest},
    settings::Settings,
    target::PackageTarget,
    utils::{cancel, fs, http},
};

/// One step of the packaging pipeline.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    /// Fetch the runtime and extract it into a fresh package directory.
    Materialize,
    /// Rename the runtime and write platform metadata.
    Customize,
    /// Copy entry script, license and resources.
    InstallPayload,
    /// Zip the package directory.
    Archive,
}

impl Stage {
    /// Stages needed to carry out `decision`. Empty when nothing is left to do.
    pub fn plan(decision: &Decision, pack: bool) -> Vec<Stage> {
        match decision {
            Decision::Reuse(_) => Vec::new(),
            Decision::ArchiveOnly => vec![Stage::Archive],
            Decision::Build { .. } => {
                let mut stages = vec![Stage::Materialize, Stage::Customize, Stage::InstallPayload];
                if pack {
                    stages.push(Stage::Archive);
                }
                stages
            }
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Materialize => "materialize",
            Stage::Customize => "customize",
            Stage::InstallPayload => "install payload",
            Stage::Archive => "archive",
        };
        f.write_str(name)
    }
}

/// What the pipeline knows after each stage.
///
/// Stages consume a state and return a new one; nothing is mutated in place.
#[derive(Clone, Debug)]
pub struct PipelineState {
    target: PackageTarget,
    resources_dir: Option<PathBuf>,
    artifact: PathBuf,
}

impl PipelineState {
    /// Initial state: the artifact is the package directory.
    pub fn new(target: PackageTarget) -> Self {
        let artifact = target.directory_path().to_path_buf();
        Self {
            target,
            resources_dir: None,
            artifact,
        }
    }

    /// Planned output paths.
    pub fn target(&self) -> &PackageTarget {
        &self.target
    }

    /// Application-resources directory, once customized.
    pub fn resources_dir(&self) -> Option<&Path> {
        self.resources_dir.as_deref()
    }

    /// Path returned to the caller.
    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    fn with_resources_dir(self, resources_dir: PathBuf) -> Self {
        Self {
            resources_dir: Some(resources_dir),
            ..self
        }
    }

    fn with_artifact(self, artifact: PathBuf) -> Self {
        Self { artifact, ..self }
    }
}

/// Main packaging orchestrator.
///
/// Collaborators that reach outside the process (runtime downloads, the
/// Windows resource editor) are trait objects so they can be replaced.
pub struct Bundler {
    settings: Settings,
    provider: Arc<dyn RuntimeProvider>,
    editor: Arc<dyn ResourceEditor>,
}

impl fmt::Debug for Bundler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundler")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Bundler {
    /// Creates a bundler that downloads LaunchUI releases and edits Windows
    /// resources with `rcedit`.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            provider: Arc::new(LaunchUiProvider::new()),
            editor: Arc::new(RcEdit::default()),
        }
    }

    /// Replaces the runtime provider.
    pub fn with_provider(mut self, provider: Arc<dyn RuntimeProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// Replaces the Windows resource editor.
    pub fn with_editor(mut self, editor: Arc<dyn ResourceEditor>) -> Self {
        self.editor = editor;
        self
    }

    /// Returns the settings this bundler packages.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Produces the package and returns its path.
    pub async fn bundle(&self) -> Result<PathBuf> {
        self.bundle_with_cancel(&CancellationToken::new()).await
    }

    /// Produces the package, stopping with [`Error::Cancelled`] once `token`
    /// is cancelled.
    ///
    /// A cancelled build removes the package directory it was creating. Any
    /// other failure leaves partial output on disk, marked incomplete so the
    /// next run rebuilds it.
    pub async fn bundle_with_cancel(&self, token: &CancellationToken) -> Result<PathBuf> {
        let settings = &self.settings;
        let target = PackageTarget::from_settings(settings);

        log::info!(
            "Packaging {} version {} for {}-{}",
            settings.product_name(),
            settings.version_string(),
            settings.platform(),
            settings.arch()
        );

        let _lock = TargetLock::acquire(&target)?;

        let decision = guard::decide(&target, settings.overwrite(), settings.pack_format());
        if let Decision::Reuse(path) = &decision {
            return Ok(path.clone());
        }

        let stages = Stage::plan(&decision, settings.pack_format().is_some());
        let customizer = platform::customizer_for(settings.platform(), self.editor.clone());
        log::debug!(
            "Running stages [{}] with {} customizer",
            stages.iter().map(Stage::to_string).collect::<Vec<_>>().join(", "),
            customizer.label()
        );

        let mut state = PipelineState::new(target);
        for stage in stages.iter().copied() {
            state = match self.run_stage(stage, state.clone(), customizer.as_ref(), token).await {
                Ok(next) => next,
                Err(e) if e.is_cancelled() => {
                    discard_partial_build(state.target(), &stages).await;
                    return Err(Error::Cancelled);
                }
                Err(e) => {
                    log::debug!("{} stage failed", stage);
                    return Err(e);
                }
            };
        }

        log::info!("✓ Created {}", state.artifact().display());
        Ok(state.artifact().to_path_buf())
    }

    async fn run_stage(
        &self,
        stage: Stage,
        state: PipelineState,
        customizer: &dyn PlatformCustomizer,
        token: &CancellationToken,
    ) -> Result<PipelineState> {
        cancel::check(token)?;

        match stage {
            Stage::Materialize => self.materialize(state, token).await,
            Stage::Customize => {
                let ctx = CustomizeContext {
                    settings: &self.settings,
                    target: state.target(),
                    cancel: token,
                };
                let resources_dir = customizer.customize(&ctx).await?;
                Ok(state.with_resources_dir(resources_dir))
            }
            Stage::InstallPayload => {
                let resources_dir = state
                    .resources_dir()
                    .context("payload stage ran before customization")?;
                payload::install(&self.settings, state.target(), resources_dir, token).await?;
                guard::mark_complete(state.target()).await?;
                Ok(state)
            }
            Stage::Archive => {
                let target = state.target();
                log::info!("Packing {}", target.archive_name());
                let archive = archive::zip_directory_with_cancel(
                    target.directory_path(),
                    target.archive_path(),
                    token,
                )
                .await?;
                Ok(state.with_artifact(archive))
            }
        }
    }

    async fn materialize(
        &self,
        state: PipelineState,
        token: &CancellationToken,
    ) -> Result<PipelineState> {
        let settings = &self.settings;
        let request = RuntimeRequest::new(settings.platform(), settings.arch(), settings.runtime());
        let runtime_archive = cancel::cancellable(token, self.provider.fetch(&request)).await?;

        let target = state.target();
        let dir = target.directory_path();
        guard::mark_incomplete(target).await?;
        fs::create_dir(dir, true).await?;

        log::info!("Extracting {}", runtime_archive.display());
        let extracted = http::extract_zip(&runtime_archive, dir)
            .await
            .context("extracting runtime")?;
        if extracted.is_empty() {
            return Err(Error::Runtime(format!(
                "runtime archive {} is empty",
                runtime_archive.display()
            )));
        }
        cancel::check(token)?;

        Ok(state)
    }
}

async fn discard_partial_build(target: &PackageTarget, stages: &[Stage]) {
    if !stages.contains(&Stage::Materialize) || !guard::is_incomplete(target) {
        return;
    }

    log::warn!("Cancelled, removing {}", target.directory_path().display());
    if let Err(e) = fs::remove_dir_all(target.directory_path()).await {
        log::warn!("Failed to remove partial package: {}", e);
    }
    if let Err(e) = guard::mark_complete(target).await {
        log::warn!("Failed to remove incomplete marker: {}", e);
    }
}
