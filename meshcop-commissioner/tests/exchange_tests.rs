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

//! Exchange Tests
//!
//! Drives the commissioner state machine over a scripted in-memory
//! transport that answers each request from a reply plan, mirroring the
//! request's message ID and token the way a border router would.

use meshcop_coap::{CoapMessage, Code, MessageType};
use meshcop_commissioner::{Commissioner, CommissionerError, CommissionerState};
use meshcop_common::{SecureDatagram, ThreadHub, TransportError};
use std::collections::VecDeque;

/// How the scripted peer answers the next `receive`.
enum Reply {
    /// Empty ACK announcing a separate response
    EmptyAck,
    /// Response piggybacked on the ACK
    Piggyback { code: Code, payload: Vec<u8> },
    /// The delayed response of a separate-response exchange
    Separate { code: Code, payload: Vec<u8> },
    /// Record-layer read failure
    Fail(i32),
}

struct ScriptedSession {
    replies: VecDeque<Reply>,
    sent: Vec<CoapMessage>,
    separate_id: u16,
    closed: bool,
}

impl ScriptedSession {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: replies.into(),
            sent: Vec::new(),
            separate_id: 0x7000,
            closed: false,
        }
    }

    fn last_request(&self) -> &CoapMessage {
        self.sent.last().expect("a request was sent")
    }
}

impl SecureDatagram for ScriptedSession {
    fn connect(&mut self, _host: &str, _port: u16, _admin_code: &str) -> Result<(), TransportError> {
        Ok(())
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        let request = CoapMessage::decode(payload).expect("commissioner sends well-formed CoAP");
        self.sent.push(request);
        Ok(())
    }

    fn receive(&mut self, _max_len: usize) -> Result<Vec<u8>, TransportError> {
        let reply = self
            .replies
            .pop_front()
            .ok_or(TransportError::ReceiveFailed(-1))?;
        let request = self.last_request().clone();
        let response = match reply {
            Reply::EmptyAck => CoapMessage {
                mtype: MessageType::Acknowledgement,
                code: Code::Empty,
                message_id: request.message_id,
                token: Vec::new(),
                options: Vec::new(),
                payload: None,
            },
            Reply::Piggyback { code, payload } => CoapMessage {
                mtype: MessageType::Acknowledgement,
                code,
                message_id: request.message_id,
                token: request.token.clone(),
                options: Vec::new(),
                payload: (!payload.is_empty()).then_some(payload),
            },
            Reply::Separate { code, payload } => {
                self.separate_id += 1;
                CoapMessage {
                    mtype: MessageType::Confirmable,
                    code,
                    message_id: self.separate_id,
                    token: request.token.clone(),
                    options: Vec::new(),
                    payload: (!payload.is_empty()).then_some(payload),
                }
            }
            Reply::Fail(code) => return Err(TransportError::ReceiveFailed(code)),
        };
        Ok(response.encode().unwrap())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

fn hub() -> ThreadHub {
    ThreadHub::new("192.0.2.1", 49191).unwrap()
}

fn dataset_payload() -> Vec<u8> {
    hex::decode(concat!(
        "000300000f",
        "0102abcd",
        "02081122334455667788",
        "030548656c6c6f",
        "0510000102030405060708090a0b0c0d0e0f",
        "0e080000000000010000",
    ))
    .unwrap()
}

#[test]
fn test_petition_then_dataset_piggybacked() {
    let session = ScriptedSession::new(vec![
        Reply::Piggyback {
            code: Code::Changed,
            payload: Vec::new(),
        },
        Reply::Piggyback {
            code: Code::Content,
            payload: dataset_payload(),
        },
    ]);
    let mut commissioner = Commissioner::new(session);
    commissioner.connect(&hub(), "123456").unwrap();

    let dataset = commissioner.get_active_dataset().unwrap();
    assert_eq!(dataset.network_name.as_deref(), Some("Hello"));
    assert_eq!(dataset.pan_id, Some(0xABCD));
    assert_eq!(commissioner.state(), CommissionerState::Idle);
}

/// The two requests carry the expected paths and payloads, distinct
/// message IDs, and distinct fresh tokens.
#[test]
fn test_request_framing_and_allocation() {
    let session = ScriptedSession::new(vec![
        Reply::Piggyback {
            code: Code::Changed,
            payload: Vec::new(),
        },
        Reply::Piggyback {
            code: Code::Changed,
            payload: dataset_payload(),
        },
    ]);
    let mut commissioner = Commissioner::new(session);
    commissioner.connect(&hub(), "123456").unwrap();
    commissioner.get_active_dataset().unwrap();
    let session = commissioner.into_transport();

    let petition = &session.sent[0];
    assert_eq!(petition.code, Code::Post);
    assert_eq!(petition.mtype, MessageType::Confirmable);
    assert_eq!(petition.uri_path_segments(), vec![&b"c"[..], &b"cp"[..]]);
    let mut expected = vec![0x01, 0x0F];
    expected.extend_from_slice(b"iOSCommissioner");
    assert_eq!(petition.payload.as_deref(), Some(expected.as_slice()));
    assert_eq!(petition.token.len(), 4);

    let dataset_request = &session.sent[1];
    assert_eq!(dataset_request.code, Code::Post);
    assert_eq!(
        dataset_request.uri_path_segments(),
        vec![&b"c"[..], &b"ag"[..]]
    );
    assert_eq!(
        dataset_request.payload.as_deref(),
        Some(&[0x0D, 0x06, 0x00, 0x01, 0x02, 0x03, 0x05, 0x0E][..])
    );
    assert_eq!(dataset_request.token.len(), 4);

    assert_ne!(petition.message_id, dataset_request.message_id);
    assert_ne!(petition.token, dataset_request.token);
}

/// The empty-ACK-then-response pattern is consumed on both exchanges.
#[test]
fn test_separate_responses_consumed() {
    let session = ScriptedSession::new(vec![
        Reply::EmptyAck,
        Reply::Separate {
            code: Code::Changed,
            payload: Vec::new(),
        },
        Reply::EmptyAck,
        Reply::Separate {
            code: Code::Content,
            payload: dataset_payload(),
        },
    ]);
    let mut commissioner = Commissioner::new(session);
    commissioner.connect(&hub(), "123456").unwrap();

    let dataset = commissioner.get_active_dataset().unwrap();
    assert_eq!(dataset.network_name.as_deref(), Some("Hello"));

    let session = commissioner.into_transport();
    assert!(session.replies.is_empty(), "all four datagrams consumed");
}

#[test]
fn test_petition_rejection_faults() {
    // 4.01 Unauthorized
    let session = ScriptedSession::new(vec![Reply::Piggyback {
        code: Code::Other(0x81),
        payload: Vec::new(),
    }]);
    let mut commissioner = Commissioner::new(session);
    commissioner.connect(&hub(), "123456").unwrap();

    let err = commissioner.get_active_dataset().unwrap_err();
    assert!(matches!(
        err,
        CommissionerError::PetitionFailed(Code::Other(0x81))
    ));
    assert_eq!(commissioner.state(), CommissionerState::Faulted);

    // Only close is valid from Faulted...
    assert!(matches!(
        commissioner.petition(),
        Err(CommissionerError::InvalidState(CommissionerState::Faulted))
    ));
    commissioner.close();
    assert_eq!(commissioner.state(), CommissionerState::Disconnected);
}

/// 2.01 Created is not accepted for the petition.
#[test]
fn test_petition_created_is_rejected() {
    let session = ScriptedSession::new(vec![Reply::Piggyback {
        code: Code::Created,
        payload: Vec::new(),
    }]);
    let mut commissioner = Commissioner::new(session);
    commissioner.connect(&hub(), "123456").unwrap();
    assert!(matches!(
        commissioner.petition(),
        Err(CommissionerError::PetitionFailed(Code::Created))
    ));
}

/// A commissioner name that does not fit a TLV fails the petition
/// before anything goes on the wire.
#[test]
fn test_overlong_commissioner_name_fails_cleanly() {
    let session = ScriptedSession::new(Vec::new());
    let long_name = "x".repeat(256);
    let mut commissioner = Commissioner::new(session).with_commissioner_id(&long_name);
    commissioner.connect(&hub(), "123456").unwrap();

    let err = commissioner.petition().unwrap_err();
    assert!(matches!(err, CommissionerError::InvalidRequest(_)));
    assert_eq!(commissioner.state(), CommissionerState::Faulted);

    let session = commissioner.into_transport();
    assert!(session.sent.is_empty());
}

#[test]
fn test_dataset_success_code_with_empty_payload_fails() {
    let session = ScriptedSession::new(vec![
        Reply::Piggyback {
            code: Code::Changed,
            payload: Vec::new(),
        },
        Reply::Piggyback {
            code: Code::Changed,
            payload: Vec::new(),
        },
    ]);
    let mut commissioner = Commissioner::new(session);
    commissioner.connect(&hub(), "123456").unwrap();

    let err = commissioner.get_active_dataset().unwrap_err();
    assert!(matches!(
        err,
        CommissionerError::DatasetRequestFailed(Code::Changed)
    ));
    assert_eq!(commissioner.state(), CommissionerState::Faulted);
}

#[test]
fn test_receive_failure_faults() {
    let session = ScriptedSession::new(vec![Reply::Fail(-0x6880)]);
    let mut commissioner = Commissioner::new(session);
    commissioner.connect(&hub(), "123456").unwrap();

    let err = commissioner.get_active_dataset().unwrap_err();
    assert!(matches!(
        err,
        CommissionerError::Transport(TransportError::ReceiveFailed(-0x6880))
    ));
    assert_eq!(commissioner.state(), CommissionerState::Faulted);

    commissioner.close();
    let session = commissioner.into_transport();
    assert!(session.closed);
}

#[test]
fn test_connect_rejected_mid_session() {
    let session = ScriptedSession::new(Vec::new());
    let mut commissioner = Commissioner::new(session);
    commissioner.connect(&hub(), "123456").unwrap();

    assert!(matches!(
        commissioner.connect(&hub(), "123456"),
        Err(CommissionerError::InvalidState(CommissionerState::Connected))
    ));

    // After close, a fresh connect is allowed again.
    commissioner.close();
    commissioner.connect(&hub(), "123456").unwrap();
}
