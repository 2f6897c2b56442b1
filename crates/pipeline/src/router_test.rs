//! Router tests
//!
//! Routing by device type, queue backpressure, close semantics and the
//! parse → encode → dispatch path of a single line.

use std::sync::Arc;
use std::time::Duration;

use memload_protocol::{Bytes, EncodedItem, ParseErrorKind, decode_payload};
use memload_routing::{DestinationId, RoutingError, RoutingTable};
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::error::DispatchError;
use crate::metrics::PipelineMetrics;
use crate::parser_pool::{LineError, ParserPool, process_line};
use crate::result::{WorkerId, WorkerReport};
use crate::{DestinationHandle, PipelineError, Router};

fn item(key: &str) -> EncodedItem {
    EncodedItem {
        key: key.into(),
        payload: Bytes::from_static(b"\x0a\x01\x01"),
    }
}

fn two_destination_table() -> RoutingTable {
    RoutingTable::from_pairs([("idfa", "127.0.0.1:33013"), ("gaid", "127.0.0.1:33014")]).unwrap()
}

/// Router over `two_destination_table` with queues of `capacity`
fn router_with_queues(capacity: usize) -> (Router, Vec<mpsc::Receiver<EncodedItem>>) {
    let table = two_destination_table();
    let mut handles = Vec::new();
    let mut receivers = Vec::new();
    for destination in table.destinations() {
        let (tx, rx) = mpsc::channel(capacity);
        handles.push(DestinationHandle::new(
            destination.id,
            destination.device_type.clone(),
            tx,
        ));
        receivers.push(rx);
    }
    (Router::new(table, handles).unwrap(), receivers)
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_router_new() {
    let (router, _rx) = router_with_queues(10);
    assert_eq!(router.destination_count(), 2);
    assert_eq!(router.routing_table().len(), 2);
    assert_eq!(router.handle(DestinationId::new(1)).unwrap().name(), "gaid");
    assert!(router.handle(DestinationId::new(2)).is_none());
}

#[test]
fn test_router_rejects_missing_handle() {
    let (tx, _rx) = mpsc::channel(1);
    let handles = vec![DestinationHandle::new(DestinationId::new(0), "idfa", tx)];

    let err = Router::new(two_destination_table(), handles).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::DestinationNotRegistered(id) if id == DestinationId::new(1)
    ));
}

#[test]
fn test_router_rejects_unknown_handle() {
    let table = RoutingTable::from_pairs([("idfa", "127.0.0.1:33013")]).unwrap();
    let (tx0, _rx0) = mpsc::channel(1);
    let (tx9, _rx9) = mpsc::channel(1);
    let handles = vec![
        DestinationHandle::new(DestinationId::new(0), "idfa", tx0),
        DestinationHandle::new(DestinationId::new(9), "zzzz", tx9),
    ];

    let err = Router::new(table, handles).unwrap_err();
    assert!(matches!(err, PipelineError::UnknownDestination(_)));
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_dispatch_to_matching_queue() {
    let (router, mut receivers) = router_with_queues(10);

    let id = router.dispatch("gaid", item("gaid:1")).await.unwrap();
    assert_eq!(id, DestinationId::new(1));

    let received = timeout(Duration::from_millis(100), receivers[1].recv())
        .await
        .expect("timeout waiting for item")
        .expect("channel closed");
    assert_eq!(received.key, "gaid:1");

    // The other queue stays empty
    assert!(receivers[0].try_recv().is_err());
}

#[tokio::test]
async fn test_dispatch_unknown_device_type() {
    let (router, mut receivers) = router_with_queues(10);

    let err = router.dispatch("badtype", item("badtype:1")).await.unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Unroutable(RoutingError::UnknownDeviceType { .. })
    ));
    assert!(err.to_string().contains("badtype"));

    for rx in &mut receivers {
        assert!(rx.try_recv().is_err());
    }
}

#[tokio::test]
async fn test_dispatch_waits_while_queue_full() {
    let (router, mut receivers) = router_with_queues(1);
    let router = Arc::new(router);

    router.dispatch("idfa", item("idfa:1")).await.unwrap();

    let blocked = {
        let router = Arc::clone(&router);
        tokio::spawn(async move { router.dispatch("idfa", item("idfa:2")).await })
    };

    // Still waiting for room
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!blocked.is_finished());

    assert_eq!(receivers[0].recv().await.unwrap().key, "idfa:1");
    let id = timeout(Duration::from_millis(500), blocked)
        .await
        .expect("dispatch never resumed")
        .unwrap()
        .unwrap();
    assert_eq!(id, DestinationId::new(0));
    assert_eq!(receivers[0].recv().await.unwrap().key, "idfa:2");
}

#[tokio::test]
async fn test_dispatch_to_closed_queue() {
    let (router, mut receivers) = router_with_queues(1);
    drop(receivers.remove(0));

    let err = router.dispatch("idfa", item("idfa:1")).await.unwrap_err();
    assert!(matches!(err, DispatchError::Closed(id) if id == DestinationId::new(0)));
}

#[tokio::test]
async fn test_close_ends_every_queue() {
    let (router, mut receivers) = router_with_queues(10);
    router.dispatch("idfa", item("idfa:1")).await.unwrap();

    router.close();

    // Buffered items are still delivered, then the queue reports closed
    assert_eq!(receivers[0].recv().await.unwrap().key, "idfa:1");
    assert!(receivers[0].recv().await.is_none());
    assert!(receivers[1].recv().await.is_none());
}

// ============================================================================
// Line processing
// ============================================================================

#[tokio::test]
async fn test_process_line_stores_encoded_record() {
    let (router, mut receivers) = router_with_queues(10);
    let metrics = PipelineMetrics::new();

    let id = process_line("idfa\tid1\t55.5\t37.5\t1,2,3", &router, &metrics)
        .await
        .unwrap();
    assert_eq!(id, DestinationId::new(0));

    let received = receivers[0].recv().await.unwrap();
    assert_eq!(received.key, "idfa:id1");
    let decoded = decode_payload(&received.payload).unwrap();
    assert_eq!(decoded.apps, vec![1, 2, 3]);
    assert_eq!(decoded.lat, Some(55.5));
    assert_eq!(decoded.lon, Some(37.5));

    assert_eq!(metrics.snapshot().items_dispatched, 1);
}

#[tokio::test]
async fn test_process_line_counts_failures_by_kind() {
    let (router, _receivers) = router_with_queues(10);
    let metrics = PipelineMetrics::new();

    let cases = [
        ("idfa\tid1", ParseErrorKind::MalformedLine),
        ("idfa\t\t1\t2\t3", ParseErrorKind::MissingIdentity),
        ("idfa\tid1\tnorth\t2\t3", ParseErrorKind::InvalidCoordinate),
        ("idfa\tid1\t1\t2\tx", ParseErrorKind::InvalidAppId),
    ];
    for (line, kind) in cases {
        let err = process_line(line, &router, &metrics).await.unwrap_err();
        assert!(matches!(err, LineError::Parse(ref e) if e.kind() == kind), "{line:?}");
    }

    let err = process_line("badtype\tid2\t10\t20\t5", &router, &metrics)
        .await
        .unwrap_err();
    assert!(matches!(err, LineError::Dispatch(DispatchError::Unroutable(_))));

    let err = process_line("idfa\tid 3\t10\t20\t5", &router, &metrics)
        .await
        .unwrap_err();
    assert!(matches!(err, LineError::Encode(_)));

    let snapshot = metrics.snapshot();
    for kind in ParseErrorKind::ALL {
        assert_eq!(snapshot.parse_errors_of(kind), 1, "{kind}");
    }
    assert_eq!(snapshot.unroutable, 1);
    assert_eq!(snapshot.encode_errors, 1);
    assert_eq!(snapshot.errors_total(), 6);
    assert_eq!(snapshot.items_dispatched, 0);
}

// ============================================================================
// Parser pool
// ============================================================================

#[tokio::test]
async fn test_parser_pool_reports_errors_per_worker() {
    let (router, mut receivers) = router_with_queues(100);
    let router = Arc::new(router);
    let metrics = Arc::new(PipelineMetrics::new());
    let (line_tx, line_rx) = crossfire::mpmc::bounded_async::<String>(4);
    let (result_tx, mut result_rx) = mpsc::channel(3);

    let tier = ParserPool::new(3).spawn(line_rx, Arc::clone(&router), result_tx, Arc::clone(&metrics));
    assert_eq!(tier.len(), 3);

    for i in 0..20 {
        assert!(line_tx.send(format!("idfa\tid{i}\t1\t2\t{i}")).await.is_ok());
    }
    for _ in 0..5 {
        assert!(line_tx.send("garbage".to_string()).await.is_ok());
    }
    drop(line_tx);

    assert_eq!(tier.join().await, 0);

    let mut workers = Vec::new();
    let mut errors = 0;
    while let Some(WorkerReport { worker, result }) = result_rx.recv().await {
        assert!(matches!(worker, WorkerId::Parser(_)));
        assert_eq!(result.processed, 0);
        errors += result.errors;
        workers.push(worker);
    }
    assert_eq!(workers.len(), 3);
    assert_eq!(errors, 5);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.lines_received, 25);
    assert_eq!(snapshot.items_dispatched, 20);

    Arc::try_unwrap(router).unwrap().close();
    let mut stored = 0;
    while receivers[0].recv().await.is_some() {
        stored += 1;
    }
    assert_eq!(stored, 20);
}
