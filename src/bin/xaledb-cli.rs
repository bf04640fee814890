//! XaleDB interactive shell
//!
//! Talks to a running server by default. `--embedded <file>` opens the data
//! file directly instead.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use xaledb::client::{CliClient, Connection};
use xaledb::config::DEFAULT_PORT;
use xaledb::QueryEngine;

#[derive(Debug, Parser)]
#[command(name = "xaledb-cli", version, about = "Interactive XaleDB shell")]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Run against a local data file without a server
    #[arg(short, long, value_name = "FILE")]
    embedded: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut cli = CliClient::stdio();

    match args.embedded {
        Some(path) => {
            let mut engine = QueryEngine::open(&path)?;
            cli.run(|query| engine.execute(query).map(Some))?;
            engine.close()?;
        }
        None => {
            let mut conn = match Connection::connect(&args.host, args.port) {
                Ok(conn) => conn,
                Err(_) => {
                    eprintln!("Connection failed. Is the server running?");
                    std::process::exit(1);
                }
            };
            cli.run(|query| conn.request(query))?;
        }
    }
    Ok(())
}
