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

//! Commissioning error types.

use crate::state::CommissionerState;
use meshcop_coap::{Code, MessageError};
use meshcop_common::TransportError;
use meshcop_discovery::DiscoveryError;
use meshcop_tlv::TlvError;

/// Errors that abort a commissioning attempt.
///
/// Propagation is fail-fast: the first error faults the session and the
/// caller constructs a fresh commissioner to retry. Retransmission of
/// lost datagrams belongs to the DTLS record timer, not this layer.
#[derive(Debug, thiserror::Error)]
pub enum CommissionerError {
    /// The secure transport failed (handshake, send, receive, ...)
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A received datagram was not a decodable CoAP message
    #[error("invalid CoAP response: {0}")]
    InvalidResponse(#[from] MessageError),

    /// A request payload could not be built (e.g. a commissioner name
    /// that does not fit a TLV)
    #[error("invalid request payload: {0}")]
    InvalidRequest(#[from] TlvError),

    /// The border router rejected the petition
    #[error("petition rejected with {0}")]
    PetitionFailed(Code),

    /// The dataset request failed, or succeeded with no payload
    #[error("dataset request rejected with {0}")]
    DatasetRequestFailed(Code),

    /// The operation is not valid in the current session state
    #[error("operation not valid while {0:?}")]
    InvalidState(CommissionerState),

    /// Discovery could not produce a hub
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}
