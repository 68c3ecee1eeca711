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

//! Minimal CoAP codec for the MeshCoP commissioning exchanges.
//!
//! This is deliberately not a full CoAP implementation: no block-wise
//! transfer, no observe, no multicast, and no congestion control beyond
//! what the DTLS record timer provides. It encodes confirmable requests
//! and decodes their responses, which is all the commissioner needs.
//!
//! The separate-response pattern (empty ACK now, actual response later)
//! is a sequencing concern and lives with the commissioner; the contract
//! here is only that decoding any well-formed datagram is total.

pub mod message;

pub use message::{CoapMessage, CoapOption, Code, MessageError, MessageType, OptionNumber};

/// Maximum token length permitted by the CoAP header's TKL field.
pub const MAX_TOKEN_LENGTH: usize = 8;

/// CoAP version emitted and accepted by this codec.
pub const COAP_VERSION: u8 = 1;
