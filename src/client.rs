//! Interactive line client and TCP connection helper.

use crate::error::Result;
use crate::server::BUFFER_SIZE;
use std::io::{self, BufRead, Read, Write};
use std::net::TcpStream;

pub const PROMPT: &str = "xale-db> ";
pub const EXIT_COMMANDS: [&str; 2] = ["exit", "quit"];

pub struct CliClient<R, W> {
    input: R,
    output: W,
}

impl CliClient<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> CliClient<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn start(&mut self) -> io::Result<()> {
        writeln!(self.output, "CLI Client started. Type 'exit' to quit.")
    }

    /// Prompt until a non-blank line arrives. `None` on `exit`, `quit` or EOF.
    pub fn read_query(&mut self) -> io::Result<Option<String>> {
        loop {
            write!(self.output, "{}", PROMPT)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                continue;
            }
            if EXIT_COMMANDS.contains(&line) {
                return Ok(None);
            }
            return Ok(Some(line.to_string()));
        }
    }

    pub fn display_output(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    pub fn close(&mut self) -> io::Result<()> {
        writeln!(self.output, "Closing connection...")
    }

    /// Read queries and hand each to `handler` until the user leaves or the
    /// handler reports a closed connection (`Ok(None)`). Handler errors are
    /// shown and the session continues.
    pub fn run<F>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<Option<String>>,
    {
        self.start()?;
        while let Some(query) = self.read_query()? {
            match handler(&query) {
                Ok(Some(reply)) => self.display_output(&reply)?,
                Ok(None) => {
                    self.display_output("Server closed the connection.")?;
                    return Ok(());
                }
                Err(e) => self.display_output(&format!("Error: {}", e))?,
            }
        }
        self.close()?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

/// Client side of the line protocol.
pub struct Connection {
    stream: TcpStream,
}

impl Connection {
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((host, port))?;
        Ok(Self { stream })
    }

    pub fn send(&mut self, query: &str) -> Result<()> {
        self.stream.write_all(query.as_bytes())?;
        self.stream.flush()?;
        Ok(())
    }

    /// One reply of at most 4096 bytes. `None` once the server has closed.
    pub fn receive(&mut self) -> Result<Option<String>> {
        let mut buf = [0u8; BUFFER_SIZE];
        let n = self.stream.read(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf[..n]).into_owned()))
    }

    pub fn request(&mut self, query: &str) -> Result<Option<String>> {
        self.send(query)?;
        self.receive()
    }
}
