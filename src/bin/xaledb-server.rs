//! XaleDB TCP server

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use xaledb::server::TcpServer;
use xaledb::{logging, DbConfig, QueryEngine};

#[derive(Debug, Parser)]
#[command(name = "xaledb-server", version, about = "Serve a XaleDB data file over TCP")]
struct Args {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    port: Option<u16>,

    #[arg(long)]
    host: Option<String>,

    /// Overrides DataFilePath from the config
    #[arg(short, long)]
    data_file: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DbConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DbConfig::default(),
    };
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if let Some(host) = args.host {
        config = config.with_host(host);
    }
    if let Some(data_file) = args.data_file {
        config = config.with_data_file(data_file);
    }

    logging::init(&config).context("initialising logging")?;
    info!(data_file = %config.data_file_path, "starting xaledb server");

    let engine = QueryEngine::open(&config.data_file_path)
        .with_context(|| format!("opening {}", config.data_file_path))?;
    let listener = TcpServer::bind(&config.server)
        .with_context(|| format!("binding {}", config.server.address()))?;

    let mut server = TcpServer::new(engine).with_failure_level(config.logging.exception_level());
    server.serve(listener)?;
    server.into_engine().close()?;
    Ok(())
}
