//! Router - device-type routing onto destination queues
//!
//! The `Router` pairs the read-only [`RoutingTable`] with one queue handle
//! per destination. It is fully built before any parser worker starts and
//! is shared between them through `Arc` without locking.

use memload_protocol::EncodedItem;
use memload_routing::{DestinationId, RoutingError, RoutingTable};

use crate::destination_handle::DestinationHandle;
use crate::error::{DispatchError, PipelineError, Result};

/// Routes encoded items to their destination queue
///
/// # Example
///
/// ```ignore
/// let table = RoutingTable::from_pairs([("idfa", "127.0.0.1:33013")])?;
/// let (tx, rx) = mpsc::channel(1);
/// let router = Router::new(table, vec![DestinationHandle::new(DestinationId::new(0), "idfa", tx)])?;
///
/// router.dispatch("idfa", item).await?;
/// router.close(); // writers see end of input
/// ```
pub struct Router {
    routing_table: RoutingTable,

    /// Handles indexed by `DestinationId`, one per table destination
    destinations: Vec<DestinationHandle>,
}

impl Router {
    /// Create a router from a routing table and its queue handles
    ///
    /// # Errors
    ///
    /// - `DestinationNotRegistered` if a table destination has no handle
    /// - `UnknownDestination` if a handle's id is not in the table
    pub fn new(routing_table: RoutingTable, handles: Vec<DestinationHandle>) -> Result<Self> {
        let mut slots: Vec<Option<DestinationHandle>> =
            routing_table.ids().map(|_| None).collect();

        for handle in handles {
            let id = handle.id();
            let slot = slots
                .get_mut(id.as_usize())
                .ok_or(PipelineError::UnknownDestination(id))?;

            tracing::debug!(
                destination_id = %id,
                destination = %handle.name(),
                "registered destination with router"
            );
            *slot = Some(handle);
        }

        let destinations = slots
            .into_iter()
            .zip(routing_table.ids())
            .map(|(slot, id)| slot.ok_or(PipelineError::DestinationNotRegistered(id)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            routing_table,
            destinations,
        })
    }

    /// Look up the queue handle for a device type
    ///
    /// # Errors
    ///
    /// Returns `RoutingError::UnknownDeviceType` for tags with no destination.
    #[inline]
    pub fn route(&self, device_type: &str) -> std::result::Result<&DestinationHandle, RoutingError> {
        let id = self.routing_table.route(device_type)?;
        // `new` guarantees one handle per table destination
        Ok(&self.destinations[id.as_usize()])
    }

    /// Route an item and queue it, waiting while the queue is full
    ///
    /// Returns the destination the item was queued for.
    pub async fn dispatch(
        &self,
        device_type: &str,
        item: EncodedItem,
    ) -> std::result::Result<DestinationId, DispatchError> {
        let handle = self.route(device_type)?;
        handle
            .send(item)
            .await
            .map_err(|_| DispatchError::Closed(handle.id()))?;
        Ok(handle.id())
    }

    /// Get the handle for a destination id
    #[inline]
    pub fn handle(&self, id: DestinationId) -> Option<&DestinationHandle> {
        self.destinations.get(id.as_usize())
    }

    #[inline]
    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    #[inline]
    pub fn destination_count(&self) -> usize {
        self.destinations.len()
    }

    /// Drop every destination sender
    ///
    /// Must only be called once no parser worker can dispatch any more.
    /// Each writer then drains its queue and exits.
    pub fn close(self) {
        tracing::debug!(
            destinations = self.destinations.len(),
            "closing destination queues"
        );
        drop(self.destinations);
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("destinations", &self.destinations)
            .finish()
    }
}
