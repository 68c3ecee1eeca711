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

//! The commissioner state machine.
//!
//! Sequences connect → petition → MGMT_ACTIVE_GET over a
//! [`SecureDatagram`] transport, owning message-ID and token allocation
//! for the session. Written against the transport trait so the exchange
//! discipline can be exercised with a scripted in-memory session.

use crate::error::CommissionerError;
use crate::state::CommissionerState;
use meshcop_coap::{CoapMessage, CoapOption, Code};
use meshcop_common::{Dataset, SecureDatagram, ThreadHub, DEFAULT_MAX_RECORD};
use tracing::{debug, info};

/// Commissioner name sent in the petition's Commissioner-ID TLV.
pub const DEFAULT_COMMISSIONER_ID: &str = "iOSCommissioner";

/// What the exchange loop is waiting for after sending a request.
///
/// A responder either piggybacks the response on the ACK, or sends an
/// empty ACK now and the actual response in a later datagram. The
/// second state makes that explicit so the same loop serves both the
/// petition and the dataset exchange.
enum ResponseWait {
    /// Nothing received yet; a piggybacked response or an empty ACK may
    /// arrive
    First,
    /// Empty ACK consumed; only the separate response remains
    SeparateResponse,
}

/// Drives one commissioning session over a secure datagram transport.
pub struct Commissioner<T> {
    transport: T,
    state: CommissionerState,
    message_id: u16,
    last_token: Option<[u8; 4]>,
    commissioner_id: String,
}

impl<T: SecureDatagram> Commissioner<T> {
    /// A commissioner over the given transport, with a randomized
    /// message-ID seed and the default commissioner name.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: CommissionerState::Disconnected,
            message_id: rand::random(),
            last_token: None,
            commissioner_id: DEFAULT_COMMISSIONER_ID.to_string(),
        }
    }

    /// Override the name sent in the Commissioner-ID TLV. Any non-empty
    /// UTF-8 string up to 255 bytes is acceptable to the protocol; a
    /// name outside those bounds makes the petition fail with
    /// `InvalidRequest` when its payload is built.
    pub fn with_commissioner_id(mut self, name: &str) -> Self {
        self.commissioner_id = name.to_string();
        self
    }

    /// Current session state.
    pub fn state(&self) -> CommissionerState {
        self.state
    }

    /// Consume the commissioner, returning the transport it owned.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Establish the secure session against a discovered hub.
    ///
    /// # Errors
    ///
    /// `InvalidState` when a session is already in progress; otherwise
    /// any transport error, which faults the session.
    pub fn connect(&mut self, hub: &ThreadHub, admin_code: &str) -> Result<(), CommissionerError> {
        if !self.state.can_connect() {
            return Err(CommissionerError::InvalidState(self.state));
        }
        match self.transport.connect(&hub.host, hub.port, admin_code) {
            Ok(()) => {
                self.state = CommissionerState::Connected;
                Ok(())
            }
            Err(e) => {
                self.state = CommissionerState::Faulted;
                Err(e.into())
            }
        }
    }

    /// Petition the border router to accept us as active commissioner.
    ///
    /// # Errors
    ///
    /// `PetitionFailed` carries any response code other than
    /// `2.04 Changed`. Errors fault the session.
    pub fn petition(&mut self) -> Result<(), CommissionerError> {
        if self.state != CommissionerState::Connected {
            return Err(CommissionerError::InvalidState(self.state));
        }
        self.fail_fast(Self::petition_inner)
    }

    /// Retrieve the Active Operational Dataset (MGMT_ACTIVE_GET).
    ///
    /// # Errors
    ///
    /// `DatasetRequestFailed` carries a response code that is neither
    /// `2.04 Changed` nor `2.05 Content`, or a success code with an
    /// empty payload. Errors fault the session.
    pub fn request_active_dataset(&mut self) -> Result<Dataset, CommissionerError> {
        if self.state != CommissionerState::CommissionerActive {
            return Err(CommissionerError::InvalidState(self.state));
        }
        self.fail_fast(Self::request_dataset_inner)
    }

    /// Petition (if not yet active) and retrieve the dataset.
    ///
    /// # Errors
    ///
    /// As for [`petition`](Self::petition) and
    /// [`request_active_dataset`](Self::request_active_dataset).
    pub fn get_active_dataset(&mut self) -> Result<Dataset, CommissionerError> {
        if self.state == CommissionerState::Connected {
            self.petition()?;
        }
        self.request_active_dataset()
    }

    /// Tear down the session. Safe in any state, including `Faulted`.
    pub fn close(&mut self) {
        self.transport.close();
        self.state = CommissionerState::Disconnected;
    }

    fn fail_fast<R>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<R, CommissionerError>,
    ) -> Result<R, CommissionerError> {
        match op(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                self.state = CommissionerState::Faulted;
                Err(e)
            }
        }
    }

    fn petition_inner(&mut self) -> Result<(), CommissionerError> {
        let token = self.next_token();
        let message_id = self.next_message_id();

        let mut request = CoapMessage::confirmable(Code::Post, message_id, &token);
        request.options.push(CoapOption::uri_path("c"));
        request.options.push(CoapOption::uri_path("cp"));
        request.payload = Some(meshcop_tlv::encode_commissioner_id(&self.commissioner_id)?);

        self.state = CommissionerState::CommissionerPending;
        debug!(message_id, "sending commissioner petition");
        let response = self.exchange(&request)?;

        if response.code == Code::Changed {
            info!("accepted as active commissioner");
            self.state = CommissionerState::CommissionerActive;
            Ok(())
        } else {
            Err(CommissionerError::PetitionFailed(response.code))
        }
    }

    fn request_dataset_inner(&mut self) -> Result<Dataset, CommissionerError> {
        let token = self.next_token();
        let message_id = self.next_message_id();

        let mut request = CoapMessage::confirmable(Code::Post, message_id, &token);
        request.options.push(CoapOption::uri_path("c"));
        request.options.push(CoapOption::uri_path("ag"));
        request.payload = Some(meshcop_tlv::encode_get_request(
            &meshcop_tlv::FULL_CREDENTIALS,
        )?);

        self.state = CommissionerState::DatasetRequested;
        debug!(message_id, "requesting active dataset");
        let response = self.exchange(&request)?;

        match response.code {
            // Border router dialects differ on the success code here.
            Code::Changed | Code::Content => {
                let payload = response.payload.as_deref().unwrap_or_default();
                if payload.is_empty() {
                    return Err(CommissionerError::DatasetRequestFailed(response.code));
                }
                self.state = CommissionerState::Idle;
                info!("active dataset retrieved");
                Ok(meshcop_tlv::parse_dataset(payload))
            }
            other => Err(CommissionerError::DatasetRequestFailed(other)),
        }
    }

    /// Send one confirmable request and wait out its response,
    /// consuming an empty ACK first when the responder separates the
    /// response from the acknowledgement.
    fn exchange(&mut self, request: &CoapMessage) -> Result<CoapMessage, CommissionerError> {
        let bytes = request.encode()?;
        self.transport.send(&bytes)?;

        let mut wait = ResponseWait::First;
        loop {
            let datagram = self.transport.receive(DEFAULT_MAX_RECORD)?;
            let response = CoapMessage::decode(&datagram)?;
            match wait {
                ResponseWait::First if response.is_empty_ack() => {
                    debug!(
                        message_id = response.message_id,
                        "empty ACK, waiting for separate response"
                    );
                    wait = ResponseWait::SeparateResponse;
                }
                _ => return Ok(response),
            }
        }
    }

    /// Fresh 4-byte token, never equal to the previous exchange's token
    /// so a stale retransmission cannot be misattributed.
    fn next_token(&mut self) -> [u8; 4] {
        loop {
            let token: [u8; 4] = rand::random();
            if self.last_token != Some(token) {
                self.last_token = Some(token);
                return token;
            }
        }
    }

    /// Message IDs increment before use from a per-session random seed.
    fn next_message_id(&mut self) -> u16 {
        self.message_id = self.message_id.wrapping_add(1);
        self.message_id
    }
}
