//! Routing error types

use thiserror::Error;

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, RoutingError>;

/// Errors raised while building or querying the routing table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// Record carries a device type with no configured destination
    #[error("unknown device type '{device_type}'")]
    UnknownDeviceType {
        /// Tag found in the record
        device_type: String,
    },

    /// Same device type configured twice
    #[error("duplicate destination for device type '{device_type}'")]
    DuplicateDeviceType {
        /// Repeated tag
        device_type: String,
    },

    /// Device type tag is empty or contains whitespace or ':'
    #[error("invalid device type '{device_type}'")]
    InvalidDeviceType {
        /// Offending tag
        device_type: String,
    },

    /// Destination has no address
    #[error("destination for device type '{device_type}' has an empty address")]
    EmptyAddress {
        /// Tag with the missing address
        device_type: String,
    },

    /// Table built without any destination
    #[error("routing table has no destinations")]
    NoDestinations,

    /// Destination ids are exhausted
    #[error("too many destinations: {count} registered, at most {max} supported", max = u16::MAX as usize + 1)]
    TooManyDestinations {
        /// Destinations registered before the rejected one
        count: usize,
    },
}

impl RoutingError {
    /// Create an UnknownDeviceType error
    #[inline]
    pub fn unknown_device_type(device_type: impl Into<String>) -> Self {
        Self::UnknownDeviceType {
            device_type: device_type.into(),
        }
    }

    /// Create a DuplicateDeviceType error
    #[inline]
    pub fn duplicate_device_type(device_type: impl Into<String>) -> Self {
        Self::DuplicateDeviceType {
            device_type: device_type.into(),
        }
    }

    /// Create an InvalidDeviceType error
    #[inline]
    pub fn invalid_device_type(device_type: impl Into<String>) -> Self {
        Self::InvalidDeviceType {
            device_type: device_type.into(),
        }
    }

    /// Create a TooManyDestinations error
    #[inline]
    pub fn too_many_destinations(count: usize) -> Self {
        Self::TooManyDestinations { count }
    }

    /// Create an EmptyAddress error
    #[inline]
    pub fn empty_address(device_type: impl Into<String>) -> Self {
        Self::EmptyAddress {
            device_type: device_type.into(),
        }
    }
}
