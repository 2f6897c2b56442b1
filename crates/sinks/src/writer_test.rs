//! Tests for StoreWriter

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use memload_protocol::{EncodedItem, RunResult};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::{StoreClient, StoreError, StoreWriter};

/// In-memory store that fails keys listed in `failing`
#[derive(Clone, Default)]
struct MemoryClient {
    stored: Arc<Mutex<HashMap<String, Bytes>>>,
    order: Arc<Mutex<Vec<String>>>,
    failing: Vec<String>,
}

#[async_trait]
impl StoreClient for MemoryClient {
    async fn put(&mut self, key: &str, payload: &Bytes) -> Result<(), StoreError> {
        if self.failing.iter().any(|k| k == key) {
            return Err(StoreError::rejected("memory", key, "NOT_STORED"));
        }
        self.order.lock().push(key.to_string());
        self.stored.lock().insert(key.to_string(), payload.clone());
        Ok(())
    }

    fn address(&self) -> &str {
        "memory"
    }
}

fn item(key: &str, payload: &'static [u8]) -> EncodedItem {
    EncodedItem {
        key: key.to_string(),
        payload: Bytes::from_static(payload),
    }
}

#[tokio::test]
async fn test_writer_counts_stored_items() {
    let client = MemoryClient::default();
    let stored = Arc::clone(&client.stored);
    let (tx, rx) = mpsc::channel(4);
    let writer = StoreWriter::new("idfa", rx, Box::new(client));
    let metrics = writer.metrics_handle();
    let handle = tokio::spawn(writer.run());

    tx.send(item("idfa:a", b"12")).await.unwrap();
    tx.send(item("idfa:b", b"345")).await.unwrap();
    drop(tx);

    let result = handle.await.unwrap();
    assert_eq!(result, RunResult::new(2, 0));
    assert_eq!(stored.lock().len(), 2);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.items_received, 2);
    assert_eq!(snapshot.items_stored, 2);
    assert_eq!(snapshot.bytes_written, 5);
}

#[tokio::test]
async fn test_writer_counts_failures() {
    let client = MemoryClient {
        failing: vec!["idfa:bad".to_string()],
        ..Default::default()
    };
    let (tx, rx) = mpsc::channel(4);
    let writer = StoreWriter::new("idfa", rx, Box::new(client));
    let metrics = writer.metrics_handle();
    let handle = tokio::spawn(writer.run());

    tx.send(item("idfa:ok", b"x")).await.unwrap();
    tx.send(item("idfa:bad", b"x")).await.unwrap();
    tx.send(item("idfa:bad", b"x")).await.unwrap();
    drop(tx);

    assert_eq!(handle.await.unwrap(), RunResult::new(1, 2));
    assert_eq!(metrics.snapshot().items_failed, 2);
}

#[tokio::test]
async fn test_writer_preserves_queue_order() {
    let client = MemoryClient::default();
    let order = Arc::clone(&client.order);
    let (tx, rx) = mpsc::channel(1);
    let handle = tokio::spawn(StoreWriter::new("gaid", rx, Box::new(client)).run());

    let keys: Vec<String> = (0..20).map(|i| format!("gaid:{i}")).collect();
    for key in &keys {
        tx.send(EncodedItem {
            key: key.clone(),
            payload: Bytes::new(),
        })
        .await
        .unwrap();
    }
    drop(tx);

    handle.await.unwrap();
    assert_eq!(*order.lock(), keys);
}

#[tokio::test]
async fn test_writer_drains_before_exit() {
    let client = MemoryClient::default();
    let stored = Arc::clone(&client.stored);
    let (tx, rx) = mpsc::channel(8);

    // Queue fills and closes before the writer starts
    for i in 0..8 {
        tx.send(item(&format!("adid:{i}"), b"x")).await.unwrap();
    }
    drop(tx);

    let result = StoreWriter::new("adid", rx, Box::new(client)).run().await;
    assert_eq!(result, RunResult::new(8, 0));
    assert_eq!(stored.lock().len(), 8);
}

#[tokio::test]
async fn test_writer_empty_queue() {
    let (tx, rx) = mpsc::channel(1);
    drop(tx);
    let writer = StoreWriter::new("dvid", rx, Box::new(MemoryClient::default()));
    assert_eq!(writer.name(), "dvid");
    assert_eq!(writer.run().await, RunResult::default());
}
