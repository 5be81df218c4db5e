mod cli;
mod session;
mod snapshot;
mod window;

use std::env;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{parse_args, usage_text, CliCommand, ViewerOptions, ASSETS_DIR_ENV_VAR};
use crate::session::{ViewerError, ViewerSession};

fn main() -> ExitCode {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let options = match parse_args(&args, env::var(ASSETS_DIR_ENV_VAR).ok()) {
        Ok(CliCommand::Help) => {
            println!("{}", usage_text());
            return ExitCode::SUCCESS;
        }
        Ok(CliCommand::Run(options)) => options,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(1);
        }
    };

    init_tracing();
    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(error = %error, "viewer_failed");
            ExitCode::FAILURE
        }
    }
}

fn run(options: &ViewerOptions) -> Result<(), ViewerError> {
    info!(
        map = %options.map_path.display(),
        tileset = %options.tileset_path.display(),
        assets = %options.assets_dir.display(),
        "startup"
    );
    let mut session = ViewerSession::load(options)?;
    match &options.snapshot {
        Some(path) => {
            snapshot::run_snapshot(&mut session, options.frames, path)?;
            Ok(())
        }
        None => window::run_window(session, options.target_tps),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
