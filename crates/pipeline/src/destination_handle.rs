//! Destination handle for pipeline communication
//!
//! `DestinationHandle` wraps the sending end of one destination queue, so
//! parser workers can hand items to a writer without knowing its store.

use memload_protocol::EncodedItem;
use memload_routing::DestinationId;
use tokio::sync::mpsc;

/// Handle to one destination queue
///
/// The receiving end belongs to the destination's
/// [`StoreWriter`](memload_sinks::StoreWriter). Dropping every handle
/// closes the queue and lets the writer finish.
pub struct DestinationHandle {
    /// Destination identifier (u16 index)
    id: DestinationId,

    /// Device type served (for logging)
    name: String,

    sender: mpsc::Sender<EncodedItem>,
}

impl DestinationHandle {
    #[inline]
    pub fn new(id: DestinationId, name: impl Into<String>, sender: mpsc::Sender<EncodedItem>) -> Self {
        Self {
            id,
            name: name.into(),
            sender,
        }
    }

    #[inline]
    pub fn id(&self) -> DestinationId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send an item, waiting while the queue is full
    ///
    /// This is the pipeline's backpressure point. Returns the item back if
    /// the queue is closed.
    #[inline]
    pub async fn send(&self, item: EncodedItem) -> Result<(), EncodedItem> {
        self.sender.send(item).await.map_err(|e| e.0)
    }

    /// Check if the writer side has gone away
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots in the queue right now
    #[inline]
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

impl std::fmt::Debug for DestinationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memload_protocol::Bytes;

    fn item() -> EncodedItem {
        EncodedItem {
            key: "idfa:a".into(),
            payload: Bytes::from_static(b"x"),
        }
    }

    #[test]
    fn test_handle_creation() {
        let (tx, _rx) = mpsc::channel::<EncodedItem>(10);
        let handle = DestinationHandle::new(DestinationId::new(2), "adid", tx);

        assert_eq!(handle.id(), DestinationId::new(2));
        assert_eq!(handle.name(), "adid");
        assert!(!handle.is_closed());
        assert_eq!(handle.max_capacity(), 10);
        assert!(format!("{handle:?}").contains("adid"));
    }

    #[tokio::test]
    async fn test_send_and_close() {
        let (tx, mut rx) = mpsc::channel::<EncodedItem>(1);
        let handle = DestinationHandle::new(DestinationId::new(0), "idfa", tx);

        handle.send(item()).await.unwrap();
        assert_eq!(handle.capacity(), 0);
        assert_eq!(rx.recv().await.unwrap().key, "idfa:a");

        drop(rx);
        assert!(handle.is_closed());
        let returned = handle.send(item()).await.unwrap_err();
        assert_eq!(returned.key, "idfa:a");
    }
}
