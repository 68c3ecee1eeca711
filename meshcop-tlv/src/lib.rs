// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Thread management TLV codec.
//!
//! Thread management messages carry `(type:u8, length:u8, value)` records.
//! This crate encodes the MGMT_ACTIVE_GET request payload and parses the
//! Active Operational Dataset out of the response payload.
//!
//! Parsing is total: any byte string yields a [`Dataset`] in bounded
//! time. An unknown TLV type is skipped by its declared length; a
//! declared length that runs past the end of the payload terminates the
//! scan; a known type whose length disagrees with its wire format is
//! dropped and the scan continues.

use meshcop_common::{ChannelMask, Dataset, RadioChannel, SecurityPolicy, Timestamp};

/// Dataset TLV type identifiers.
pub mod types {
    /// Channel (page + number)
    pub const CHANNEL: u8 = 0x00;
    /// PAN ID
    pub const PAN_ID: u8 = 0x01;
    /// Extended PAN ID
    pub const XPAN_ID: u8 = 0x02;
    /// Network name
    pub const NETWORK_NAME: u8 = 0x03;
    /// PSKc
    pub const PSKC: u8 = 0x04;
    /// Network master key
    pub const NETWORK_KEY: u8 = 0x05;
    /// Mesh-local prefix
    pub const MESH_LOCAL_PREFIX: u8 = 0x07;
    /// Security policy
    pub const SECURITY_POLICY: u8 = 0x0C;
    /// Get (the request-side TLV listing wanted types)
    pub const GET: u8 = 0x0D;
    /// Active timestamp
    pub const ACTIVE_TIMESTAMP: u8 = 0x0E;
    /// Channel mask
    pub const CHANNEL_MASK: u8 = 0x35;
}

/// Commissioner ID TLV type, from the commissioning message namespace
/// (distinct from the dataset namespace above despite the shared value).
pub const COMMISSIONER_ID: u8 = 0x01;

/// The TLV types requested when retrieving full credentials.
pub const FULL_CREDENTIALS: [u8; 6] = [
    types::CHANNEL,
    types::PAN_ID,
    types::XPAN_ID,
    types::NETWORK_NAME,
    types::NETWORK_KEY,
    types::ACTIVE_TIMESTAMP,
];

/// Errors from building a request-side TLV.
///
/// The length field is a single byte, so a value that cannot be
/// described by it must be rejected rather than truncated into a TLV
/// whose length disagrees with its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TlvError {
    /// The value does not fit the one-byte length field
    #[error("TLV value exceeds 255 bytes")]
    ValueTooLong,

    /// The commissioner name was empty
    #[error("commissioner name must not be empty")]
    EmptyValue,
}

/// Encode a Get TLV request payload: `0x0D ‖ N ‖ N type identifiers`.
///
/// # Errors
///
/// Returns [`TlvError::ValueTooLong`] for more than 255 identifiers.
pub fn encode_get_request(wanted: &[u8]) -> Result<Vec<u8>, TlvError> {
    if wanted.len() > u8::MAX as usize {
        return Err(TlvError::ValueTooLong);
    }
    let mut out = Vec::with_capacity(2 + wanted.len());
    out.push(types::GET);
    out.push(wanted.len() as u8);
    out.extend_from_slice(wanted);
    Ok(out)
}

/// Encode a Commissioner ID TLV: `0x01 ‖ len ‖ UTF-8 name`.
///
/// # Errors
///
/// Returns [`TlvError::EmptyValue`] for an empty name and
/// [`TlvError::ValueTooLong`] for one over 255 UTF-8 bytes.
pub fn encode_commissioner_id(name: &str) -> Result<Vec<u8>, TlvError> {
    if name.is_empty() {
        return Err(TlvError::EmptyValue);
    }
    if name.len() > u8::MAX as usize {
        return Err(TlvError::ValueTooLong);
    }
    let mut out = Vec::with_capacity(2 + name.len());
    out.push(COMMISSIONER_ID);
    out.push(name.len() as u8);
    out.extend_from_slice(name.as_bytes());
    Ok(out)
}

/// A field decoder writes one TLV value into the dataset, or leaves it
/// absent when the value does not match its wire format.
type FieldDecoder = fn(&[u8], &mut Dataset);

/// Dispatch table from TLV type to field decoder. Extending to a new
/// TLV is one row plus one decoder.
const DECODERS: &[(u8, FieldDecoder)] = &[
    (types::CHANNEL, decode_channel),
    (types::PAN_ID, decode_pan_id),
    (types::XPAN_ID, decode_xpan_id),
    (types::NETWORK_NAME, decode_network_name),
    (types::PSKC, decode_pskc),
    (types::NETWORK_KEY, decode_network_key),
    (types::MESH_LOCAL_PREFIX, decode_mesh_local_prefix),
    (types::SECURITY_POLICY, decode_security_policy),
    (types::ACTIVE_TIMESTAMP, decode_active_timestamp),
    (types::CHANNEL_MASK, decode_channel_mask),
];

/// Parse an Active Operational Dataset out of a response payload.
pub fn parse_dataset(payload: &[u8]) -> Dataset {
    let mut dataset = Dataset::default();
    let mut cursor = 0usize;
    while cursor + 2 <= payload.len() {
        let tlv_type = payload[cursor];
        let length = payload[cursor + 1] as usize;
        let Some(value) = payload.get(cursor + 2..cursor + 2 + length) else {
            // Declared length runs past the payload; stop cleanly.
            break;
        };
        if let Some((_, decode)) = DECODERS.iter().find(|(t, _)| *t == tlv_type) {
            decode(value, &mut dataset);
        }
        cursor += 2 + length;
    }
    dataset
}

fn decode_channel(value: &[u8], dataset: &mut Dataset) {
    if value.len() == 3 {
        dataset.channel = Some(RadioChannel {
            page: value[0],
            channel: u16::from_be_bytes([value[1], value[2]]),
        });
    }
}

fn decode_pan_id(value: &[u8], dataset: &mut Dataset) {
    if value.len() == 2 {
        dataset.pan_id = Some(u16::from_be_bytes([value[0], value[1]]));
    }
}

fn decode_xpan_id(value: &[u8], dataset: &mut Dataset) {
    if let Ok(bytes) = <[u8; 8]>::try_from(value) {
        dataset.xpan_id = Some(bytes);
    }
}

fn decode_network_name(value: &[u8], dataset: &mut Dataset) {
    if let Ok(name) = std::str::from_utf8(value) {
        dataset.network_name = Some(name.to_string());
    }
}

fn decode_pskc(value: &[u8], dataset: &mut Dataset) {
    if let Ok(bytes) = <[u8; 16]>::try_from(value) {
        dataset.pskc = Some(bytes);
    }
}

fn decode_network_key(value: &[u8], dataset: &mut Dataset) {
    if let Ok(bytes) = <[u8; 16]>::try_from(value) {
        dataset.network_key = Some(bytes);
    }
}

fn decode_mesh_local_prefix(value: &[u8], dataset: &mut Dataset) {
    if let Ok(bytes) = <[u8; 8]>::try_from(value) {
        dataset.mesh_local_prefix = Some(bytes);
    }
}

fn decode_security_policy(value: &[u8], dataset: &mut Dataset) {
    // Trailing bytes past the first four are version-dependent and ignored.
    if value.len() >= 4 {
        dataset.security_policy = Some(SecurityPolicy {
            rotation_hours: u16::from_be_bytes([value[0], value[1]]),
            flags: u16::from_be_bytes([value[2], value[3]]),
        });
    }
}

fn decode_active_timestamp(value: &[u8], dataset: &mut Dataset) {
    if value.len() == 8 {
        let mut seconds = 0u64;
        for byte in &value[..6] {
            seconds = (seconds << 8) | u64::from(*byte);
        }
        dataset.active_timestamp = Some(Timestamp {
            seconds,
            ticks: u16::from_be_bytes([value[6], value[7]]),
        });
    }
}

fn decode_channel_mask(value: &[u8], dataset: &mut Dataset) {
    if value.len() < 2 {
        return;
    }
    let mask_length = value[1] as usize;
    if value.len() != 2 + mask_length || mask_length % 4 != 0 {
        return;
    }
    let masks = value[2..]
        .chunks_exact(4)
        .map(|word| u32::from_be_bytes([word[0], word[1], word[2], word[3]]))
        .collect();
    dataset.channel_mask = Some(ChannelMask {
        page: value[0],
        masks,
    });
}
