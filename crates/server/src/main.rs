use std::process::ExitCode;

use canned_server::Server;
use canned_server::config::ServerConfig;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::from_env();

    let level = config.as_ref().map_or(Level::INFO, |config| config.log_level);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return ExitCode::FAILURE;
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(cause = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let server = match Server::new(config) {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "can't build server");
            return ExitCode::FAILURE;
        }
    };

    match server.start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(cause = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}
