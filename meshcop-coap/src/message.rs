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

//! CoAP message model and wire codec (RFC 7252 subset).
//!
//! Wire layout:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |Ver| T |  TKL  |      Code     |          Message ID           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   Token (if any, TKL bytes) ...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   Options (if any) ...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |1 1 1 1 1 1 1 1|    Payload (if any) ...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Options carry a 4-bit delta from the previous option number and a
//! 4-bit length, each of which escapes into a 1-byte extended field for
//! the value 13 and a 2-byte extended field for the value 14. The nibble
//! 15 is reserved (it belongs to the payload marker) and is rejected.

use crate::{COAP_VERSION, MAX_TOKEN_LENGTH};

const PAYLOAD_MARKER: u8 = 0xFF;

/// One-byte extended option field, covers values 13..=268.
const EXT_ONE_BYTE: u16 = 13;
/// Two-byte extended option field, covers values 269..=65804.
const EXT_TWO_BYTE: u16 = 14;
const EXT_RESERVED: u16 = 15;
const EXT_ONE_BYTE_BIAS: u16 = 13;
const EXT_TWO_BYTE_BIAS: u16 = 269;

/// CoAP message type (the T field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// CON: requires acknowledgement
    Confirmable,
    /// NON: fire and forget
    NonConfirmable,
    /// ACK: acknowledges a confirmable message
    Acknowledgement,
    /// RST: rejects a message
    Reset,
}

impl MessageType {
    fn bits(self) -> u8 {
        match self {
            MessageType::Confirmable => 0,
            MessageType::NonConfirmable => 1,
            MessageType::Acknowledgement => 2,
            MessageType::Reset => 3,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => MessageType::Confirmable,
            1 => MessageType::NonConfirmable,
            2 => MessageType::Acknowledgement,
            _ => MessageType::Reset,
        }
    }
}

/// CoAP code: 3-bit class, 5-bit detail.
///
/// Only the codes the commissioning exchanges produce or observe get
/// named variants; everything else round-trips through `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// 0.00, used by the empty ACK of a separate response
    Empty,
    /// 0.02 POST
    Post,
    /// 2.01 Created
    Created,
    /// 2.04 Changed
    Changed,
    /// 2.05 Content
    Content,
    /// Any other code, kept as its raw byte
    Other(u8),
}

impl Code {
    /// Raw code byte (class << 5 | detail).
    pub fn byte(self) -> u8 {
        match self {
            Code::Empty => 0x00,
            Code::Post => 0x02,
            Code::Created => 0x41,
            Code::Changed => 0x44,
            Code::Content => 0x45,
            Code::Other(byte) => byte,
        }
    }

    /// Decode a raw code byte.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Code::Empty,
            0x02 => Code::Post,
            0x41 => Code::Created,
            0x44 => Code::Changed,
            0x45 => Code::Content,
            other => Code::Other(other),
        }
    }

    /// The response class (2 for success, 4/5 for errors).
    pub fn class(self) -> u8 {
        self.byte() >> 5
    }

    /// The detail within the class.
    pub fn detail(self) -> u8 {
        self.byte() & 0x1F
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.class(), self.detail())
    }
}

/// Option numbers surfaced by the decoder.
///
/// Unknown option numbers are consumed but dropped from the decoded
/// message, matching the elective-option handling the commissioning
/// exchanges rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionNumber {
    /// 11: one path segment per option
    UriPath,
    /// 12: payload content format
    ContentFormat,
    /// 15: one query argument per option
    UriQuery,
}

impl OptionNumber {
    /// The registered option number.
    pub fn number(self) -> u16 {
        match self {
            OptionNumber::UriPath => 11,
            OptionNumber::ContentFormat => 12,
            OptionNumber::UriQuery => 15,
        }
    }

    /// Look up a registered number; `None` for options this codec drops.
    pub fn from_number(number: u16) -> Option<Self> {
        match number {
            11 => Some(OptionNumber::UriPath),
            12 => Some(OptionNumber::ContentFormat),
            15 => Some(OptionNumber::UriQuery),
            _ => None,
        }
    }
}

/// A single option: registered number plus raw value bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoapOption {
    /// Which option this is
    pub number: OptionNumber,
    /// Raw option value
    pub value: Vec<u8>,
}

impl CoapOption {
    /// Convenience constructor for a Uri-Path segment.
    pub fn uri_path(segment: &str) -> Self {
        Self {
            number: OptionNumber::UriPath,
            value: segment.as_bytes().to_vec(),
        }
    }
}

/// Errors from encoding or decoding a CoAP datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    /// The version field was not 1
    #[error("unsupported CoAP version")]
    InvalidVersion,

    /// The datagram ended before the structure it declared
    #[error("truncated CoAP datagram")]
    Truncated,

    /// TKL outside 0..=8 (decode) or token longer than 8 bytes (encode)
    #[error("invalid token length")]
    InvalidTokenLength,

    /// An option header used the reserved nibble 15
    #[error("invalid option header")]
    InvalidOptionHeader,
}

/// A CoAP message.
///
/// Invariants maintained by [`encode`](Self::encode): the version field
/// is 1, the TKL matches the token bytes, and options are emitted in
/// non-decreasing option-number order regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoapMessage {
    /// Message type (CON, NON, ACK, RST)
    pub mtype: MessageType,

    /// Request or response code
    pub code: Code,

    /// Message ID, big-endian on the wire
    pub message_id: u16,

    /// Token, 0 to 8 bytes
    pub token: Vec<u8>,

    /// Options in logical order
    pub options: Vec<CoapOption>,

    /// Payload, if any; an empty payload encodes the same as none
    pub payload: Option<Vec<u8>>,
}

impl CoapMessage {
    /// A confirmable request with the given code, ID and token.
    pub fn confirmable(code: Code, message_id: u16, token: &[u8]) -> Self {
        Self {
            mtype: MessageType::Confirmable,
            code,
            message_id,
            token: token.to_vec(),
            options: Vec::new(),
            payload: None,
        }
    }

    /// True for the empty ACK that announces a separate response.
    pub fn is_empty_ack(&self) -> bool {
        self.mtype == MessageType::Acknowledgement && self.code == Code::Empty
    }

    /// The Uri-Path segments, in order.
    pub fn uri_path_segments(&self) -> Vec<&[u8]> {
        self.options
            .iter()
            .filter(|opt| opt.number == OptionNumber::UriPath)
            .map(|opt| opt.value.as_slice())
            .collect()
    }

    /// Encode to wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidTokenLength`] if the token exceeds
    /// 8 bytes.
    pub fn encode(&self) -> Result<Vec<u8>, MessageError> {
        if self.token.len() > MAX_TOKEN_LENGTH {
            return Err(MessageError::InvalidTokenLength);
        }

        let mut out = Vec::with_capacity(
            4 + self.token.len() + self.payload.as_ref().map_or(0, |p| p.len() + 1) + 16,
        );
        out.push((COAP_VERSION << 6) | (self.mtype.bits() << 4) | self.token.len() as u8);
        out.push(self.code.byte());
        out.extend_from_slice(&self.message_id.to_be_bytes());
        out.extend_from_slice(&self.token);

        // Stable sort keeps repeated options (Uri-Path segments) in
        // insertion order.
        let mut sorted: Vec<&CoapOption> = self.options.iter().collect();
        sorted.sort_by_key(|opt| opt.number.number());

        let mut previous = 0u16;
        for opt in sorted {
            let delta = opt.number.number() - previous;
            previous = opt.number.number();
            encode_option_header(&mut out, delta, opt.value.len() as u16);
            out.extend_from_slice(&opt.value);
        }

        if let Some(payload) = &self.payload {
            if !payload.is_empty() {
                out.push(PAYLOAD_MARKER);
                out.extend_from_slice(payload);
            }
        }
        Ok(out)
    }

    /// Decode wire bytes.
    ///
    /// # Errors
    ///
    /// Rejects a version other than 1, a reserved token length, a
    /// reserved option nibble, and any truncation.
    pub fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        if bytes.len() < 4 {
            return Err(MessageError::Truncated);
        }
        if bytes[0] >> 6 != COAP_VERSION {
            return Err(MessageError::InvalidVersion);
        }
        let mtype = MessageType::from_bits(bytes[0] >> 4);
        let token_length = (bytes[0] & 0x0F) as usize;
        if token_length > MAX_TOKEN_LENGTH {
            return Err(MessageError::InvalidTokenLength);
        }
        let code = Code::from_byte(bytes[1]);
        let message_id = u16::from_be_bytes([bytes[2], bytes[3]]);

        let mut cursor = 4usize;
        let token = bytes
            .get(cursor..cursor + token_length)
            .ok_or(MessageError::Truncated)?
            .to_vec();
        cursor += token_length;

        let mut options = Vec::new();
        let mut number = 0u16;
        let mut payload = None;
        while cursor < bytes.len() {
            if bytes[cursor] == PAYLOAD_MARKER {
                cursor += 1;
                if cursor < bytes.len() {
                    payload = Some(bytes[cursor..].to_vec());
                }
                break;
            }
            let header = bytes[cursor];
            cursor += 1;
            let delta = decode_option_field(bytes, &mut cursor, (header >> 4) as u16)?;
            let length = decode_option_field(bytes, &mut cursor, (header & 0x0F) as u16)?;
            number = number
                .checked_add(delta)
                .ok_or(MessageError::InvalidOptionHeader)?;
            let value = bytes
                .get(cursor..cursor + length as usize)
                .ok_or(MessageError::Truncated)?;
            cursor += length as usize;
            // Elective options we do not know are consumed and dropped.
            if let Some(known) = OptionNumber::from_number(number) {
                options.push(CoapOption {
                    number: known,
                    value: value.to_vec(),
                });
            }
        }

        Ok(Self {
            mtype,
            code,
            message_id,
            token,
            options,
            payload,
        })
    }
}

fn encode_option_header(out: &mut Vec<u8>, delta: u16, length: u16) {
    let (delta_nibble, delta_ext) = split_option_field(delta);
    let (length_nibble, length_ext) = split_option_field(length);
    out.push((delta_nibble << 4) as u8 | length_nibble as u8);
    extend_option_field(out, delta_nibble, delta_ext);
    extend_option_field(out, length_nibble, length_ext);
}

fn split_option_field(value: u16) -> (u16, u16) {
    if value < EXT_ONE_BYTE {
        (value, 0)
    } else if value < EXT_TWO_BYTE_BIAS {
        (EXT_ONE_BYTE, value - EXT_ONE_BYTE_BIAS)
    } else {
        (EXT_TWO_BYTE, value - EXT_TWO_BYTE_BIAS)
    }
}

fn extend_option_field(out: &mut Vec<u8>, nibble: u16, ext: u16) {
    if nibble == EXT_ONE_BYTE {
        out.push(ext as u8);
    } else if nibble == EXT_TWO_BYTE {
        out.extend_from_slice(&ext.to_be_bytes());
    }
}

fn decode_option_field(
    bytes: &[u8],
    cursor: &mut usize,
    nibble: u16,
) -> Result<u16, MessageError> {
    match nibble {
        EXT_ONE_BYTE => {
            let ext = *bytes.get(*cursor).ok_or(MessageError::Truncated)?;
            *cursor += 1;
            Ok(u16::from(ext) + EXT_ONE_BYTE_BIAS)
        }
        EXT_TWO_BYTE => {
            let ext = bytes
                .get(*cursor..*cursor + 2)
                .ok_or(MessageError::Truncated)?;
            let ext = u16::from_be_bytes([ext[0], ext[1]]);
            *cursor += 2;
            ext.checked_add(EXT_TWO_BYTE_BIAS)
                .ok_or(MessageError::InvalidOptionHeader)
        }
        EXT_RESERVED => Err(MessageError::InvalidOptionHeader),
        small => Ok(small),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ack_detection() {
        let ack = CoapMessage::decode(&[0x60, 0x00, 0x12, 0x34]).unwrap();
        assert!(ack.is_empty_ack());
        assert_eq!(ack.message_id, 0x1234);
        assert!(ack.token.is_empty());
        assert!(ack.options.is_empty());
        assert!(ack.payload.is_none());
    }

    #[test]
    fn test_version_rejected() {
        assert_eq!(
            CoapMessage::decode(&[0x00, 0x00, 0x00, 0x01]),
            Err(MessageError::InvalidVersion)
        );
        assert_eq!(
            CoapMessage::decode(&[0x84, 0x44, 0x00, 0x01]),
            Err(MessageError::InvalidVersion)
        );
    }

    #[test]
    fn test_short_datagram_rejected() {
        assert_eq!(
            CoapMessage::decode(&[0x60, 0x00, 0x12]),
            Err(MessageError::Truncated)
        );
    }

    #[test]
    fn test_token_runs_past_end() {
        // TKL says 4 but only 2 token bytes follow.
        assert_eq!(
            CoapMessage::decode(&[0x44, 0x02, 0x00, 0x01, 0xAA, 0xBB]),
            Err(MessageError::Truncated)
        );
    }

    #[test]
    fn test_reserved_token_length_rejected() {
        assert_eq!(
            CoapMessage::decode(&[0x49, 0x02, 0x00, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
            Err(MessageError::InvalidTokenLength)
        );
    }

    #[test]
    fn test_code_display() {
        assert_eq!(Code::Post.to_string(), "0.02");
        assert_eq!(Code::Changed.to_string(), "2.04");
        assert_eq!(Code::Other(0x84).to_string(), "4.04");
    }

    #[test]
    fn test_options_sorted_on_encode() {
        let mut msg = CoapMessage::confirmable(Code::Post, 7, &[0xAA]);
        msg.options.push(CoapOption {
            number: OptionNumber::UriQuery,
            value: b"q=1".to_vec(),
        });
        msg.options.push(CoapOption::uri_path("c"));
        let decoded = CoapMessage::decode(&msg.encode().unwrap()).unwrap();
        assert_eq!(decoded.options[0].number, OptionNumber::UriPath);
        assert_eq!(decoded.options[1].number, OptionNumber::UriQuery);
    }

    #[test]
    fn test_unknown_option_dropped_but_consumed() {
        // Option 3 (Uri-Host, unknown here) then Uri-Path "c", then payload.
        let bytes = [
            0x40, 0x02, 0x00, 0x01, // header, no token
            0x34, b'h', b'o', b's', b't', // option 3, length 4
            0x81, b'c', // delta 8 -> option 11, length 1
            0xFF, 0xDE, 0xAD,
        ];
        let msg = CoapMessage::decode(&bytes).unwrap();
        assert_eq!(msg.options.len(), 1);
        assert_eq!(msg.options[0].number, OptionNumber::UriPath);
        assert_eq!(msg.payload.as_deref(), Some(&[0xDE, 0xAD][..]));
    }

    #[test]
    fn test_payload_marker_with_nothing_after() {
        let msg = CoapMessage::decode(&[0x40, 0x02, 0x00, 0x01, 0xFF]).unwrap();
        assert!(msg.payload.is_none());
    }

    #[test]
    fn test_token_too_long_on_encode() {
        let msg = CoapMessage::confirmable(Code::Post, 1, &[0u8; 9]);
        assert_eq!(msg.encode(), Err(MessageError::InvalidTokenLength));
    }

    #[test]
    fn test_reserved_nibble_rejected() {
        // Delta nibble 15 without a payload marker context.
        assert_eq!(
            CoapMessage::decode(&[0x40, 0x02, 0x00, 0x01, 0xF1, 0x00]),
            Err(MessageError::InvalidOptionHeader)
        );
    }
}
