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

//! Dataset Parse Tests
//!
//! End-to-end vectors for parsing a MGMT_ACTIVE_GET response payload,
//! including robustness against unknown TLVs and arbitrary input.

use meshcop_tlv::parse_dataset;

fn reference_payload() -> Vec<u8> {
    hex::decode(concat!(
        "000300000f",                         // channel: page 0, channel 15
        "0102abcd",                           // pan id
        "02081122334455667788",               // xpan id
        "030548656c6c6f",                     // network name "Hello"
        "0510000102030405060708090a0b0c0d0e0f", // network key
        "0e080000000000010000",               // active timestamp: 1 s, 0 ticks
    ))
    .unwrap()
}

#[test]
fn test_reference_response_payload() {
    let dataset = parse_dataset(&reference_payload());

    let channel = dataset.channel.unwrap();
    assert_eq!((channel.page, channel.channel), (0, 15));
    assert_eq!(dataset.pan_id, Some(0xABCD));
    assert_eq!(
        dataset.xpan_id,
        Some([0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88])
    );
    assert_eq!(dataset.network_name.as_deref(), Some("Hello"));
    assert_eq!(
        dataset.network_key,
        Some([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15])
    );
    let timestamp = dataset.active_timestamp.unwrap();
    assert_eq!((timestamp.seconds, timestamp.ticks), (1, 0));

    // Nothing else was present in the payload.
    assert_eq!(dataset.pskc, None);
    assert_eq!(dataset.mesh_local_prefix, None);
    assert_eq!(dataset.security_policy, None);
    assert_eq!(dataset.channel_mask, None);
}

/// An unknown leading TLV changes nothing about the known fields.
#[test]
fn test_unknown_tlv_prefix_ignored() {
    let mut payload = vec![0xFF, 0x02, 0xDE, 0xAD];
    payload.extend_from_slice(&reference_payload());
    assert_eq!(parse_dataset(&payload), parse_dataset(&reference_payload()));
}

/// Parsing the same bytes twice yields the same dataset.
#[test]
fn test_parse_is_idempotent() {
    let payload = reference_payload();
    assert_eq!(parse_dataset(&payload), parse_dataset(&payload));
}

/// Any byte string parses without panicking, including pathological
/// type/length patterns.
#[test]
fn test_parse_is_total() {
    let mut stress: Vec<Vec<u8>> = vec![
        vec![0xFF; 512],
        vec![0x00; 512],
        (0..=255).collect(),
        vec![0x0E, 0xFF],
        vec![0x35, 0x02, 0x00, 0x00],
    ];
    // A deterministic pseudo-random blob.
    let mut state = 0x1234_5678u32;
    stress.push(
        (0..1024)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (state >> 16) as u8
            })
            .collect(),
    );
    for payload in stress {
        let first = parse_dataset(&payload);
        assert_eq!(first, parse_dataset(&payload));
    }
}
