use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use objrpc::RpcServer;
use pinger::config::{Cli, Config};
use pinger::logging;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.debug > 0 {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    if let Err(e) = logging::initiate_tracing_subscriber(level) {
        eprintln!("unable to install tracing subscriber: {e}");
    }

    let mut config = match &cli.config {
        Some(path) => match Config::from_path(path) {
            Ok(config) => config,
            Err(e) => {
                error!("An error occurred reading config file {}: {}", path, e);
                return;
            }
        },
        None => Config::default(),
    };
    if let Some(port) = cli.port {
        config.port = port;
    }

    info!("{}", pinger::version());

    let registry = match pinger::registry() {
        Ok(registry) => registry,
        Err(e) => {
            error!("unable to build the registry: {e}");
            return;
        }
    };
    let server = match RpcServer::bind(registry, (config.host.as_str(), config.port)).await {
        Ok(server) => server,
        Err(e) => {
            error!("unable to bind {}:{}: {e}", config.host, config.port);
            return;
        }
    };
    if let Err(e) = server.run(cli.timeout.map(Duration::from_secs)).await {
        error!("server stopped with error: {e}");
    }
}
