//! macOS (`darwin`) packages.
//!
//! The runtime ships `launchui.app`. It becomes `{name}.app`, its
//! `Info.plist` is rewritten for the application ([`app`]), and the inner
//! executable is renamed to match `CFBundleExecutable`.

pub mod app;

use std::path::PathBuf;

use async_trait::async_trait;

use super::{APP_DIR_NAME, CustomizeContext, PlatformCustomizer};
use crate::bundler::{
    error::{Context, Result},
    utils::{cancel, fs},
};

/// Bundle name inside the runtime archive.
pub const RUNTIME_BUNDLE: &str = "launchui.app";

/// Executable name inside `Contents/MacOS` of the runtime bundle.
pub const RUNTIME_EXECUTABLE: &str = "launchui";

/// Customizer for `darwin` targets.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacOsCustomizer;

#[async_trait]
impl PlatformCustomizer for MacOsCustomizer {
    fn label(&self) -> &'static str {
        "darwin"
    }

    async fn customize(&self, ctx: &CustomizeContext<'_>) -> Result<PathBuf> {
        cancel::check(ctx.cancel)?;

        let name = ctx.settings.product_name();
        let dir = ctx.target.directory_path();
        let bundle = dir.join(format!("{name}.app"));

        fs::rename(&dir.join(RUNTIME_BUNDLE), &bundle)
            .await
            .context("renaming runtime bundle")?;

        let contents = bundle.join("Contents");
        let icon_file = app::update_info_plist(&contents.join("Info.plist"), ctx.settings)
            .await
            .context("updating Info.plist")?;

        let macos_dir = contents.join("MacOS");
        let executable = macos_dir.join(name);
        fs::rename(&macos_dir.join(RUNTIME_EXECUTABLE), &executable)
            .await
            .context("renaming bundle executable")?;
        fs::set_executable(&executable).await?;

        let resources = contents.join("Resources");
        if let Some(icon) = &ctx.settings.bundle_settings().icon {
            let dest = resources.join(&icon_file);
            log::debug!("Copying icon {} to {}", icon.display(), dest.display());
            fs::copy_file(icon, &dest).await.context("copying icon")?;
        }

        Ok(resources.join(APP_DIR_NAME))
    }
}
