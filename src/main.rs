use std::process::ExitCode;

use convergence::config::SwarmConfig;
use convergence::error::EngineError;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("convergence=info"))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), EngineError> {
    // Optional TOML file as the only argument
    let config = match std::env::args_os().nth(1) {
        Some(path) => {
            log::info!("loading configuration from {}", path.to_string_lossy());
            SwarmConfig::load(path)?
        }
        None => SwarmConfig::default(),
    };

    convergence::window::run(config)
}
