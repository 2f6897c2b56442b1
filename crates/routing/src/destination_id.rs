//! Destination identifier type

use std::fmt;

/// Identifier of one store destination
///
/// Assigned sequentially by [`RoutingTableBuilder`](crate::RoutingTableBuilder)
/// in registration order, so it doubles as an index into per-destination
/// arrays (queue handles, writer reports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DestinationId(u16);

impl DestinationId {
    /// Maximum number of destinations supported
    pub const MAX: u16 = u16::MAX;

    #[inline]
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> u16 {
        self.0
    }

    /// Index as usize (for array indexing)
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "destination:{}", self.0)
    }
}

impl From<u16> for DestinationId {
    #[inline]
    fn from(index: u16) -> Self {
        Self::new(index)
    }
}

impl From<DestinationId> for usize {
    #[inline]
    fn from(id: DestinationId) -> Self {
        id.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let id = DestinationId::new(3);
        assert_eq!(id.index(), 3);
        assert_eq!(id.as_usize(), 3);
    }

    #[test]
    fn test_ordering() {
        assert!(DestinationId::new(1) < DestinationId::new(2));
    }

    #[test]
    fn test_display() {
        assert_eq!(DestinationId::new(2).to_string(), "destination:2");
    }

    #[test]
    fn test_array_indexing() {
        let addresses = ["127.0.0.1:33013", "127.0.0.1:33014"];
        let id: DestinationId = 1u16.into();
        assert_eq!(addresses[usize::from(id)], "127.0.0.1:33014");
    }
}
