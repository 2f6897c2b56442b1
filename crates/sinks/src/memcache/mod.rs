//! memcached client
//!
//! Speaks the memcached text protocol over one TCP connection.
//!
//! # Protocol
//!
//! ```text
//! set <key> 0 0 <bytes>\r\n
//! <payload>\r\n
//! ```
//!
//! The store answers `STORED\r\n` on success. Any other reply
//! (`NOT_STORED`, `ERROR`, `CLIENT_ERROR ...`, `SERVER_ERROR ...`) fails
//! the item without retrying. Connection failures and timeouts drop the
//! connection and are retried on a fresh one.

use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::{ClientStats, StoreClient, StoreError};

/// Reply to a successful `set`
const STORED: &str = "STORED";

/// Configuration for a memcached client
#[derive(Debug, Clone)]
pub struct MemcacheConfig {
    /// Store address (host:port)
    pub address: String,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Timeout for writing a command and reading its reply
    pub io_timeout: Duration,

    /// Attempts per item, including the first
    pub retry_attempts: u32,

    /// Wait time between attempts
    pub retry_interval: Duration,
}

impl MemcacheConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connect_timeout: Duration::from_secs(1),
            io_timeout: Duration::from_secs(1),
            retry_attempts: 3,
            retry_interval: Duration::from_millis(100),
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Set attempts per item (at least one attempt is always made)
    #[must_use]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }
}

/// memcached client owning one lazily established connection
pub struct MemcacheClient {
    config: MemcacheConfig,
    connection: Option<BufReader<TcpStream>>,
    stats: ClientStats,
    command: Vec<u8>,
    reply: String,
}

impl MemcacheClient {
    pub fn new(config: MemcacheConfig) -> Self {
        Self {
            config,
            connection: None,
            stats: ClientStats::default(),
            command: Vec::with_capacity(512),
            reply: String::with_capacity(64),
        }
    }

    /// Whether a connection is currently open
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    async fn connect(&mut self) -> Result<(), StoreError> {
        let address = &self.config.address;
        let stream = match timeout(self.config.connect_timeout, TcpStream::connect(address)).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(StoreError::connect(address, e)),
            Err(_) => return Err(StoreError::timeout(address, "connect")),
        };

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(address = %address, error = %e, "failed to set TCP_NODELAY");
        }

        self.stats.connects += 1;
        tracing::debug!(address = %address, "connected to store");
        self.connection = Some(BufReader::new(stream));
        Ok(())
    }

    /// One `set` round trip on the current connection
    async fn set_once(&mut self, key: &str, payload: &Bytes) -> Result<(), StoreError> {
        if self.connection.is_none() {
            self.connect().await?;
        }

        self.command.clear();
        self.command
            .extend_from_slice(format!("set {key} 0 0 {}\r\n", payload.len()).as_bytes());
        self.command.extend_from_slice(payload);
        self.command.extend_from_slice(b"\r\n");
        self.reply.clear();

        let address = &self.config.address;
        let Some(conn) = self.connection.as_mut() else {
            return Err(StoreError::io(address, ErrorKind::NotConnected.into()));
        };

        let command = &self.command;
        let reply = &mut self.reply;
        let round_trip = timeout(self.config.io_timeout, async {
            conn.get_mut().write_all(command).await?;
            conn.get_mut().flush().await?;
            let n = conn.read_line(reply).await?;
            if n == 0 {
                return Err(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "connection closed by store",
                ));
            }
            Ok(())
        })
        .await;

        match round_trip {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.connection = None;
                return Err(StoreError::io(address, e));
            }
            Err(_) => {
                self.connection = None;
                return Err(StoreError::timeout(address, "set"));
            }
        }

        let reply = self.reply.trim_end();
        if reply == STORED {
            Ok(())
        } else {
            Err(StoreError::rejected(address, key, reply))
        }
    }
}

#[async_trait]
impl StoreClient for MemcacheClient {
    async fn put(&mut self, key: &str, payload: &Bytes) -> Result<(), StoreError> {
        let attempts = self.config.retry_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                self.stats.retries += 1;
                tokio::time::sleep(self.config.retry_interval).await;
            }

            match self.set_once(key, payload).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() => {
                    tracing::debug!(
                        address = %self.config.address,
                        key = %key,
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        error = %e,
                        "set attempt failed"
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(StoreError::RetriesExhausted {
            key: key.to_string(),
            attempts,
            last_error: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    fn address(&self) -> &str {
        &self.config.address
    }

    fn stats(&self) -> ClientStats {
        self.stats
    }
}
