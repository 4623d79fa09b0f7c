//! Launcher packager - bundles a JavaScript application with the LaunchUI runtime.
//!
//! This binary parses the command line, wires Ctrl-C to cancellation and
//! reports fatal errors with recovery suggestions.

use kodegen_bundler_launcher::cli::{self, Args, OutputManager};
use std::process;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let args = Args::parse_args();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cleaning up");
            on_interrupt.cancel();
        }
    });

    match cli::execute(&args, &cancel).await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Never quiet for fatal errors
            let output = OutputManager::new(false, false);
            output.error(&e.to_string());
            output.suggestions(&e.recovery_suggestions());
            process::exit(1);
        }
    }
}
