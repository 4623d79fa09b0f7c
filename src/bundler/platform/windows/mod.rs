//! Windows (`win32`) packages.
//!
//! The runtime executable `launchui.exe` is renamed to `{name}.exe` and its
//! version resource is rewritten through a [`ResourceEditor`]:
//!
//! | Field | Value |
//! |-------|-------|
//! | `FileDescription`, `OriginalFilename`, `ProductName` | name |
//! | `CompanyName`, `LegalCopyright` | only when supplied |
//! | file version, product version | version |
//! | icon | only when supplied |

pub mod resource;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use super::{APP_DIR_NAME, CustomizeContext, PlatformCustomizer};
use crate::bundler::{
    error::{Context, Result},
    utils::{cancel, fs},
};
use resource::{ResourceEditor, VersionResource};

/// Executable name inside the runtime archive.
pub const RUNTIME_EXECUTABLE: &str = "launchui.exe";

/// Customizer for `win32` targets.
pub struct WindowsCustomizer {
    editor: Arc<dyn ResourceEditor>,
}

impl WindowsCustomizer {
    /// Creates a customizer that edits resources with `editor`.
    pub fn new(editor: Arc<dyn ResourceEditor>) -> Self {
        Self { editor }
    }
}

#[async_trait]
impl PlatformCustomizer for WindowsCustomizer {
    fn label(&self) -> &'static str {
        "win32"
    }

    async fn customize(&self, ctx: &CustomizeContext<'_>) -> Result<PathBuf> {
        cancel::check(ctx.cancel)?;

        let dir = ctx.target.directory_path();
        let executable = dir.join(format!("{}.exe", ctx.settings.product_name()));

        fs::rename(&dir.join(RUNTIME_EXECUTABLE), &executable)
            .await
            .context("renaming runtime executable")?;

        let resource = VersionResource::from_settings(ctx.settings);
        log::info!("Updating version resource of {}", executable.display());
        cancel::cancellable(ctx.cancel, self.editor.edit(&executable, &resource)).await?;

        Ok(dir.join(APP_DIR_NAME))
    }
}
