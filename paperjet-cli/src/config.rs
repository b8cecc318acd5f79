//! Environment-driven configuration
//!
//! All settings can be overridden through environment variables (a `.env`
//! file is honored):
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | PRINTER_HOST | 192.168.1.87 | Default network printer host |
//! | PRINTER_PORT | 9100 | Default network printer port |
//! | MAX_WIDTH_DEFAULT | 576 | Default image width in dots |
//! | PAPERJET_PRINTERS | (empty) | JSON printer registry |
//!
//! `PAPERJET_PRINTERS` maps printer ids to connection configs, e.g.
//! `{"front": {"connection": "network", "host": "192.168.1.87"},
//!   "kitchen": {"connection": "spooler", "queue": "tm-t20"}}`.

use std::collections::HashMap;
use std::env;

use anyhow::Context;
use paperjet_escpos::PrinterConfig;

const DEFAULT_HOST: &str = "192.168.1.87";
const DEFAULT_PORT: u16 = 9100;
const DEFAULT_MAX_WIDTH: u32 = 576;

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Fallback network printer host
    pub printer_host: String,
    /// Fallback network printer port
    pub printer_port: u16,
    /// Default maximum image width in dots
    pub max_width: u32,
    /// Named printer registry
    pub printers: HashMap<String, PrinterConfig>,
}

impl Config {
    /// Load configuration from the environment
    pub fn from_env() -> anyhow::Result<Self> {
        let printer_host =
            env::var("PRINTER_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let printer_port = env::var("PRINTER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let max_width = env::var("MAX_WIDTH_DEFAULT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_WIDTH);

        let printers = match env::var("PAPERJET_PRINTERS") {
            Ok(json) if !json.trim().is_empty() => {
                serde_json::from_str(&json).context("Parsing PAPERJET_PRINTERS")?
            }
            _ => HashMap::new(),
        };

        Ok(Self {
            printer_host,
            printer_port,
            max_width,
            printers,
        })
    }

    /// Resolve a printer config by id, falling back to the default network
    /// printer when no id is given.
    pub fn resolve_printer(&self, id: Option<&str>) -> anyhow::Result<(String, PrinterConfig)> {
        match id {
            Some(name) => {
                let config = self.printers.get(name).cloned().with_context(|| {
                    format!(
                        "Unknown printer: {name}. Available: {:?}",
                        self.printers.keys().collect::<Vec<_>>()
                    )
                })?;
                Ok((name.to_string(), config))
            }
            None => Ok((
                "default".to_string(),
                PrinterConfig::Network {
                    host: self.printer_host.clone(),
                    port: self.printer_port,
                },
            )),
        }
    }
}
