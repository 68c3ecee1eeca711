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

//! The Active Operational Dataset and its field types.

/// An operational dataset timestamp.
///
/// 48 bits of seconds and 16 bits of ticks, both big-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    /// Seconds component (u48 on the wire)
    pub seconds: u64,

    /// Ticks component
    pub ticks: u16,
}

/// A radio channel: channel page plus channel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioChannel {
    /// Channel page (0 for 2.4 GHz O-QPSK)
    pub page: u8,

    /// Channel number within the page
    pub channel: u16,
}

/// The network's security policy: key rotation interval and policy flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityPolicy {
    /// Key rotation interval in hours
    pub rotation_hours: u16,

    /// Policy flag bits
    pub flags: u16,
}

/// A channel mask entry: channel page and the mask words for that page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMask {
    /// Channel page the mask applies to
    pub page: u8,

    /// Big-endian u32 mask words
    pub masks: Vec<u32>,
}

/// The parsed Active Operational Dataset.
///
/// Every field is optional; presence depends on what the border router
/// chose to return. The `network_key` and `pskc` are the credentials a
/// joining device needs, so callers should treat a populated dataset
/// with the same care as any other secret material.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    /// Active timestamp (TLV 0x0E)
    pub active_timestamp: Option<Timestamp>,

    /// Channel page and number (TLV 0x00)
    pub channel: Option<RadioChannel>,

    /// PAN identifier (TLV 0x01)
    pub pan_id: Option<u16>,

    /// Extended PAN identifier (TLV 0x02)
    pub xpan_id: Option<[u8; 8]>,

    /// UTF-8 network name (TLV 0x03)
    pub network_name: Option<String>,

    /// Pre-shared key for the commissioner (TLV 0x04)
    pub pskc: Option<[u8; 16]>,

    /// Network master key (TLV 0x05)
    pub network_key: Option<[u8; 16]>,

    /// Mesh-local /64 prefix (TLV 0x07)
    pub mesh_local_prefix: Option<[u8; 8]>,

    /// Security policy (TLV 0x0C)
    pub security_policy: Option<SecurityPolicy>,

    /// Channel mask (TLV 0x35)
    pub channel_mask: Option<ChannelMask>,
}

impl Dataset {
    /// True if no field was populated.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
