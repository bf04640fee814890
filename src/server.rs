//! Blocking TCP front end.
//!
//! One client at a time. Each `read` of up to 4096 bytes is one query; the
//! reply is the rendered result or `Error: <message>`. A failed query never
//! closes the connection.

use crate::config::ServerConfig;
use crate::engine::QueryEngine;
use crate::error::Result;
use std::io::{ErrorKind, Read, Write};
use std::net::TcpListener;
use tracing::{debug, error, info, warn, Level};

pub const BUFFER_SIZE: usize = 4096;

pub struct TcpServer {
    engine: QueryEngine,
    /// Level used to report failed queries
    failure_level: Level,
}

impl TcpServer {
    pub fn new(engine: QueryEngine) -> Self {
        Self {
            engine,
            failure_level: Level::ERROR,
        }
    }

    pub fn with_failure_level(mut self, level: Level) -> Self {
        self.failure_level = level;
        self
    }

    pub fn bind(config: &ServerConfig) -> Result<TcpListener> {
        let listener = TcpListener::bind(config.address())?;
        info!(address = %config.address(), "server listening");
        Ok(listener)
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    pub fn into_engine(self) -> QueryEngine {
        self.engine
    }

    /// Accept clients one after another until the listener fails for good.
    pub fn serve(&mut self, listener: TcpListener) -> Result<()> {
        for stream in listener.incoming() {
            match stream {
                Ok(mut stream) => {
                    let peer = stream
                        .peer_addr()
                        .map(|a| a.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());
                    info!(%peer, "client connected");
                    if let Err(e) = self.handle_client(&mut stream) {
                        warn!(%peer, error = %e, "client session ended with error");
                    }
                }
                Err(e) => warn!(error = %e, "accept failed"),
            }
        }
        Ok(())
    }

    /// Read, run, respond until the peer closes the stream.
    pub fn handle_client<S: Read + Write>(&mut self, stream: &mut S) -> Result<()> {
        let mut buf = [0u8; BUFFER_SIZE];
        loop {
            let n = match stream.read(&mut buf) {
                Ok(0) => {
                    info!("client disconnected");
                    return Ok(());
                }
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "failed to read from client");
                    return Err(e.into());
                }
            };

            let query = String::from_utf8_lossy(&buf[..n]);
            info!(query = %query.trim_end(), "received query");
            let response = self.respond(&query);
            stream.write_all(response.as_bytes())?;
            stream.flush()?;
            debug!(bytes = response.len(), "response sent");
        }
    }

    /// Run one query and produce the reply text.
    pub fn respond(&mut self, query: &str) -> String {
        match self.engine.execute(query) {
            Ok(output) => output,
            Err(e) => {
                let message = format!("Error: {}", e);
                self.report_failure(&message);
                message
            }
        }
    }

    fn report_failure(&self, message: &str) {
        match self.failure_level {
            Level::ERROR => error!("{}", message),
            Level::WARN => warn!("{}", message),
            Level::INFO => info!("{}", message),
            _ => debug!("{}", message),
        }
    }
}
