//! Printer sinks for delivering ESC/POS job buffers
//!
//! Two delivery paths:
//! - Network printers speaking raw TCP on port 9100
//! - OS print spoolers accepting raw bytes on standard input (`lp -o raw`)
//!
//! Failures surface once as a transport error with the underlying cause; no
//! sink ever retries.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::process::Command;
use tracing::{info, instrument, warn};

use crate::error::{PrintError, PrintResult};

/// Default connect timeout for network printers
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Trait for printer delivery sinks
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Deliver a complete job buffer to the printer
    async fn deliver(&self, data: &[u8]) -> PrintResult<()>;

    /// Check whether the printer is reachable
    async fn is_online(&self) -> bool;
}

/// Network printer speaking raw TCP (port 9100)
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    host: String,
    port: u16,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create a network printer sink
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        if host.is_empty() {
            return Err(PrintError::InvalidConfig("Empty printer host".into()));
        }
        Ok(Self {
            host: host.to_string(),
            port,
            timeout: CONNECT_TIMEOUT,
        })
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Printer for NetworkPrinter {
    #[instrument(skip(data), fields(addr = %self.addr(), data_len = data.len()))]
    async fn deliver(&self, data: &[u8]) -> PrintResult<()> {
        let addr = self.addr();
        info!("Connecting to printer");

        let mut stream = tokio::time::timeout(self.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| PrintError::Timeout(format!("Connection timeout: {addr}")))?
            .map_err(|e| PrintError::Transport(format!("{addr}: {e}")))?;

        stream
            .write_all(data)
            .await
            .map_err(|e| PrintError::Transport(format!("Write failed: {e}")))?;
        stream.flush().await?;

        info!(bytes = data.len(), "Print job sent");
        Ok(())
    }

    #[instrument(fields(addr = %self.addr()))]
    async fn is_online(&self) -> bool {
        let check_timeout = Duration::from_millis(500);
        match tokio::time::timeout(check_timeout, TcpStream::connect(self.addr())).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Printer offline");
                false
            }
            Err(_) => {
                warn!("Printer check timeout");
                false
            }
        }
    }
}

/// Spooler printer piping raw bytes to an OS print command
///
/// Defaults to `lp -d <queue> -o raw` reading the job from stdin.
#[derive(Debug, Clone)]
pub struct SpoolerPrinter {
    queue: String,
    program: String,
}

impl SpoolerPrinter {
    /// Create a spooler sink for the named print queue
    pub fn new(queue: &str) -> PrintResult<Self> {
        if queue.is_empty() {
            return Err(PrintError::InvalidConfig("Empty spooler queue".into()));
        }
        Ok(Self {
            queue: queue.to_string(),
            program: "lp".to_string(),
        })
    }

    /// Override the spooler program (e.g. "lpr")
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    /// The print queue name
    pub fn queue(&self) -> &str {
        &self.queue
    }
}

impl Printer for SpoolerPrinter {
    #[instrument(skip(data), fields(queue = %self.queue, data_len = data.len()))]
    async fn deliver(&self, data: &[u8]) -> PrintResult<()> {
        let mut child = Command::new(&self.program)
            .arg("-d")
            .arg(&self.queue)
            .arg("-o")
            .arg("raw")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PrintError::Transport(format!("Spawn {} failed: {e}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PrintError::Transport("Spooler stdin unavailable".into()))?;
        stdin
            .write_all(data)
            .await
            .map_err(|e| PrintError::Transport(format!("Spooler write failed: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| PrintError::Transport(format!("Spooler wait failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PrintError::Transport(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        info!(bytes = data.len(), "Job handed to spooler");
        Ok(())
    }

    async fn is_online(&self) -> bool {
        // The spooler accepts jobs for offline printers; presence of the
        // program is the best reachable signal.
        Command::new(&self.program)
            .arg("--help")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok()
    }
}
