//! Linux and every other non-Windows, non-macOS target.
//!
//! The runtime ships a single `launchui` executable at the package root; it
//! is renamed to the application name. No metadata is written.

use std::path::PathBuf;

use async_trait::async_trait;

use super::{APP_DIR_NAME, CustomizeContext, PlatformCustomizer};
use crate::bundler::{
    error::{Context, Result},
    utils::{cancel, fs},
};

/// Executable name inside the runtime archive.
pub const RUNTIME_EXECUTABLE: &str = "launchui";

/// Customizer for Linux and unrecognized platforms.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxCustomizer;

#[async_trait]
impl PlatformCustomizer for LinuxCustomizer {
    fn label(&self) -> &'static str {
        "linux"
    }

    async fn customize(&self, ctx: &CustomizeContext<'_>) -> Result<PathBuf> {
        cancel::check(ctx.cancel)?;

        let dir = ctx.target.directory_path();
        let executable = dir.join(ctx.settings.product_name());

        fs::rename(&dir.join(RUNTIME_EXECUTABLE), &executable)
            .await
            .context("renaming runtime executable")?;
        fs::set_executable(&executable).await?;

        Ok(dir.join(APP_DIR_NAME))
    }
}
