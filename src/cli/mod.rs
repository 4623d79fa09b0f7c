//! Command line interface for the packager.
//!
//! Parses arguments into validated settings, runs the [`Bundler`] and reports
//! the resulting path.

mod args;
mod output;

pub use args::Args;
pub use output::OutputManager;

use tokio_util::sync::CancellationToken;

use crate::bundler::Bundler;
use crate::error::Result;

/// Packages according to `args`, returning the process exit code.
pub async fn execute(args: &Args, cancel: &CancellationToken) -> Result<i32> {
    let output = OutputManager::new(args.verbose, args.quiet);

    args.validate()?;
    let settings = args.to_settings()?;
    let _ = output.verbose(&format!(
        "Output directory: {}",
        settings.output_dir().display()
    ));
    let _ = output.verbose(&format!(
        "Target: {}-{}",
        settings.platform(),
        settings.arch()
    ));

    let path = Bundler::new(settings).bundle_with_cancel(cancel).await?;

    let _ = output.success(&format!("Package ready: {}", path.display()));
    Ok(0)
}
