//! Routing table for O(1) device-type → destination lookup
//!
//! The table is compiled once at startup from configuration and never
//! mutated afterwards. Workers share it read-only.

use std::collections::HashMap;

use crate::{DestinationId, Result, RoutingError};

/// One configured store destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Sequential identifier
    pub id: DestinationId,

    /// Device-type tag routed here
    pub device_type: String,

    /// Store address (`host:port`)
    pub address: String,
}

/// Pre-compiled routing table
///
/// Maps device-type tags to destination ids. Destinations are kept in
/// registration order, indexed by `DestinationId`.
///
/// # Example
///
/// ```
/// use memload_routing::{DestinationId, RoutingTable};
///
/// let table = RoutingTable::from_pairs([("idfa", "127.0.0.1:33013")]).unwrap();
/// assert_eq!(table.route("idfa").unwrap(), DestinationId::new(0));
/// assert!(table.route("gaid").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RoutingTable {
    /// Device type → destination
    routes: HashMap<String, DestinationId>,

    /// Destinations indexed by id
    destinations: Vec<Destination>,
}

impl RoutingTable {
    /// Build a table from `(device_type, address)` pairs in order
    ///
    /// # Errors
    ///
    /// Same as [`RoutingTableBuilder::add_destination`] and
    /// [`RoutingTableBuilder::build`].
    pub fn from_pairs<I, T, A>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, A)>,
        T: Into<String>,
        A: Into<String>,
    {
        let mut builder = RoutingTableBuilder::new();
        for (device_type, address) in pairs {
            builder.add_destination(device_type, address)?;
        }
        builder.build()
    }

    /// Route a device type to its destination
    ///
    /// This is the hot path: one hash lookup, no allocation on success.
    ///
    /// # Errors
    ///
    /// Returns `RoutingError::UnknownDeviceType` if no destination is
    /// configured for the tag. Callers count this as a record error.
    #[inline]
    pub fn route(&self, device_type: &str) -> Result<DestinationId> {
        self.routes
            .get(device_type)
            .copied()
            .ok_or_else(|| RoutingError::unknown_device_type(device_type))
    }

    /// Check if a device type has a destination
    #[inline]
    pub fn has_route(&self, device_type: &str) -> bool {
        self.routes.contains_key(device_type)
    }

    /// Get a destination by id
    #[inline]
    pub fn destination(&self, id: DestinationId) -> Option<&Destination> {
        self.destinations.get(id.as_usize())
    }

    /// Get the store address of a destination
    #[inline]
    pub fn address(&self, id: DestinationId) -> Option<&str> {
        self.destination(id).map(|d| d.address.as_str())
    }

    /// All destinations in id order
    #[inline]
    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    /// Iterate over destination ids in order
    #[inline]
    pub fn ids(&self) -> impl Iterator<Item = DestinationId> + '_ {
        self.destinations.iter().map(|d| d.id)
    }

    /// Number of destinations
    #[inline]
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    /// A built table always has at least one destination
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

/// Builder for constructing routing tables from configuration
#[derive(Debug, Default)]
pub struct RoutingTableBuilder {
    routes: HashMap<String, DestinationId>,
    destinations: Vec<Destination>,
}

impl RoutingTableBuilder {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a destination for a device type and get its id
    ///
    /// # Errors
    ///
    /// - `InvalidDeviceType` if the tag is empty or contains whitespace or ':'
    /// - `EmptyAddress` if the address is blank
    /// - `DuplicateDeviceType` if the tag is already registered
    pub fn add_destination(
        &mut self,
        device_type: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<DestinationId> {
        let device_type = device_type.into();
        let address = address.into();

        if device_type.is_empty()
            || device_type
                .chars()
                .any(|c| c.is_whitespace() || c.is_control() || c == ':')
        {
            return Err(RoutingError::invalid_device_type(device_type));
        }
        if address.trim().is_empty() {
            return Err(RoutingError::empty_address(device_type));
        }
        if self.routes.contains_key(&device_type) {
            return Err(RoutingError::duplicate_device_type(device_type));
        }

        let index = u16::try_from(self.destinations.len())
            .map_err(|_| RoutingError::too_many_destinations(self.destinations.len()))?;
        let id = DestinationId::new(index);
        self.routes.insert(device_type.clone(), id);
        self.destinations.push(Destination {
            id,
            device_type,
            address,
        });
        Ok(id)
    }

    /// Number of destinations registered so far
    #[inline]
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Build the routing table
    ///
    /// # Errors
    ///
    /// Returns `RoutingError::NoDestinations` if nothing was registered.
    pub fn build(self) -> Result<RoutingTable> {
        if self.destinations.is_empty() {
            return Err(RoutingError::NoDestinations);
        }
        Ok(RoutingTable {
            routes: self.routes,
            destinations: self.destinations,
        })
    }
}
