//! Per-printer connection cache
//!
//! Concurrent requests for the same printer id must share one printer
//! handle. The lookup and insert happen under a single lock so two callers
//! racing on first use can never construct two handles for one id.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::PrintResult;
use crate::printer::{NetworkPrinter, Printer, SpoolerPrinter};

fn default_port() -> u16 {
    9100
}

/// Printer connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "connection", rename_all = "snake_case")]
pub enum PrinterConfig {
    /// Raw TCP printer
    Network {
        host: String,
        #[serde(default = "default_port")]
        port: u16,
    },
    /// OS print spooler queue
    Spooler { queue: String },
}

/// A configured printer sink, dispatched by connection kind
#[derive(Debug)]
pub enum PrinterDevice {
    Network(NetworkPrinter),
    Spooler(SpoolerPrinter),
}

impl PrinterDevice {
    /// Build a device from its configuration
    pub fn from_config(config: &PrinterConfig) -> PrintResult<Self> {
        match config {
            PrinterConfig::Network { host, port } => {
                Ok(PrinterDevice::Network(NetworkPrinter::new(host, *port)?))
            }
            PrinterConfig::Spooler { queue } => {
                Ok(PrinterDevice::Spooler(SpoolerPrinter::new(queue)?))
            }
        }
    }

    /// Deliver a job buffer through this device
    pub async fn deliver(&self, data: &[u8]) -> PrintResult<()> {
        match self {
            PrinterDevice::Network(p) => p.deliver(data).await,
            PrinterDevice::Spooler(p) => p.deliver(data).await,
        }
    }

    /// Check device reachability
    pub async fn is_online(&self) -> bool {
        match self {
            PrinterDevice::Network(p) => p.is_online().await,
            PrinterDevice::Spooler(p) => p.is_online().await,
        }
    }
}

/// Cache of live printer handles keyed by printer id
#[derive(Debug, Clone, Default)]
pub struct PrinterPool {
    inner: Arc<Mutex<HashMap<String, Arc<PrinterDevice>>>>,
}

impl PrinterPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached handle for `id`, creating it from `config` on first
    /// use. Holding the map lock across lookup and insert guarantees at most
    /// one handle per id.
    pub async fn get_or_create(
        &self,
        id: &str,
        config: &PrinterConfig,
    ) -> PrintResult<Arc<PrinterDevice>> {
        let mut map = self.inner.lock().await;
        if let Some(device) = map.get(id) {
            return Ok(device.clone());
        }

        debug!(printer = id, "Creating printer handle");
        let device = Arc::new(PrinterDevice::from_config(config)?);
        map.insert(id.to_string(), device.clone());
        Ok(device)
    }

    /// Drop the cached handle for a printer id
    pub async fn remove(&self, id: &str) -> bool {
        self.inner.lock().await.remove(id).is_some()
    }

    /// Number of cached handles
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> PrinterConfig {
        PrinterConfig::Network {
            host: "192.168.1.87".to_string(),
            port: 9100,
        }
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_handle() {
        let pool = PrinterPool::new();
        let a = pool.get_or_create("front", &test_config()).await.unwrap();
        let b = pool.get_or_create("front", &test_config()).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_ids_get_distinct_handles() {
        let pool = PrinterPool::new();
        let a = pool.get_or_create("front", &test_config()).await.unwrap();
        let b = pool.get_or_create("kitchen", &test_config()).await.unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len().await, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_first_use_single_handle() {
        let pool = PrinterPool::new();

        let mut tasks = Vec::new();
        for _ in 0..32 {
            let pool = pool.clone();
            tasks.push(tokio::spawn(async move {
                pool.get_or_create("front", &test_config()).await.unwrap()
            }));
        }

        let mut handles = Vec::new();
        for task in tasks {
            handles.push(task.await.unwrap());
        }

        let first = &handles[0];
        for handle in &handles[1..] {
            assert!(Arc::ptr_eq(first, handle));
        }
        assert_eq!(pool.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_evicts_handle() {
        let pool = PrinterPool::new();
        let a = pool.get_or_create("front", &test_config()).await.unwrap();
        assert!(pool.remove("front").await);
        assert!(!pool.remove("front").await);
        let b = pool.get_or_create("front", &test_config()).await.unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_config_deserializes_from_json() {
        let config: PrinterConfig =
            serde_json::from_str(r#"{"connection": "network", "host": "192.168.1.87"}"#).unwrap();
        assert!(matches!(
            config,
            PrinterConfig::Network { ref host, port: 9100 } if host == "192.168.1.87"
        ));

        let config: PrinterConfig =
            serde_json::from_str(r#"{"connection": "spooler", "queue": "tm-t20"}"#).unwrap();
        assert!(matches!(config, PrinterConfig::Spooler { ref queue } if queue == "tm-t20"));
    }
}
