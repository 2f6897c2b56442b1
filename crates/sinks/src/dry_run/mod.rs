//! Dry-run client
//!
//! Stands in for a store when loading with `--dry`: every item is decoded
//! and logged at debug level, then reported as stored. Nothing touches the
//! network.

use async_trait::async_trait;
use bytes::Bytes;
use memload_protocol::decode_payload;

use crate::{StoreClient, StoreError};

/// Client that logs items instead of storing them
#[derive(Debug, Clone)]
pub struct DryRunClient {
    address: String,
}

impl DryRunClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl StoreClient for DryRunClient {
    async fn put(&mut self, key: &str, payload: &Bytes) -> Result<(), StoreError> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            match decode_payload(payload) {
                Ok(apps) => tracing::debug!(
                    "{} - {} -> lat={:?} lon={:?} apps={:?}",
                    self.address,
                    key,
                    apps.lat,
                    apps.lon,
                    apps.apps
                ),
                Err(e) => tracing::debug!(address = %self.address, key = %key, error = %e, "undecodable payload"),
            }
        }
        Ok(())
    }

    fn address(&self) -> &str {
        &self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memload_protocol::{encode, parse_line};

    #[tokio::test]
    async fn test_dry_run_always_succeeds() {
        let mut client = DryRunClient::new("127.0.0.1:33013");
        let item = encode(&parse_line("idfa\tabc\t1.5\t2.5\t1,2").unwrap()).unwrap();

        client.put(&item.key, &item.payload).await.unwrap();
        client.put("idfa:garbage", &Bytes::from_static(b"\xff")).await.unwrap();

        assert_eq!(client.address(), "127.0.0.1:33013");
        assert_eq!(client.stats().connects, 0);
    }
}
