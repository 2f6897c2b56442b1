//! Store payload encoding
//!
//! Records are stored in memcached as a protobuf `UserApps` message keyed by
//! `<device_type>:<device_id>`. The message layout is shared with the readers
//! of the store, so field tags must never change.

use bytes::Bytes;
use prost::Message;

use crate::error::{DecodeError, EncodeError};
use crate::record::Record;

/// Longest key memcached accepts
pub const MAX_KEY_LENGTH: usize = 250;

/// Value blob stored for each device
#[derive(Clone, PartialEq, prost::Message)]
pub struct UserApps {
    #[prost(uint32, repeated, packed = "true", tag = "1")]
    pub apps: Vec<u32>,
    #[prost(double, optional, tag = "2")]
    pub lat: Option<f64>,
    #[prost(double, optional, tag = "3")]
    pub lon: Option<f64>,
}

impl From<&Record> for UserApps {
    fn from(record: &Record) -> Self {
        Self {
            apps: record.apps.clone(),
            lat: Some(record.lat),
            lon: Some(record.lon),
        }
    }
}

/// An encoded record, ready to be written by exactly one store writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedItem {
    /// Store key: `<device_type>:<device_id>`
    pub key: String,

    /// Serialized `UserApps`
    pub payload: Bytes,
}

impl EncodedItem {
    /// Payload size in bytes
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

/// Encode a record into its store key and payload
///
/// # Errors
///
/// Returns `EncodeError::InvalidKey` if the key is longer than
/// `MAX_KEY_LENGTH` or contains whitespace/control characters (memcached's
/// text protocol cannot carry such keys), and `EncodeError::Serialization`
/// if protobuf encoding fails.
pub fn encode(record: &Record) -> Result<EncodedItem, EncodeError> {
    let key = record.key();
    validate_key(&key)?;

    let message = UserApps::from(record);
    let mut buf = Vec::with_capacity(message.encoded_len());
    message.encode(&mut buf)?;

    Ok(EncodedItem {
        key,
        payload: Bytes::from(buf),
    })
}

/// Decode a stored payload back into `UserApps`
pub fn decode_payload(payload: &[u8]) -> Result<UserApps, DecodeError> {
    Ok(UserApps::decode(payload)?)
}

fn validate_key(key: &str) -> Result<(), EncodeError> {
    if key.len() > MAX_KEY_LENGTH {
        return Err(EncodeError::invalid_key(key, "longer than 250 bytes"));
    }
    if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(EncodeError::invalid_key(
            key,
            "contains whitespace or control characters",
        ));
    }
    Ok(())
}
