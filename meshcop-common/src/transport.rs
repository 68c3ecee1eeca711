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

//! The secure datagram transport seam.
//!
//! The commissioner state machine is written against [`SecureDatagram`]
//! rather than a concrete session type, so exchange sequencing can be
//! tested with a scripted in-memory transport. The production
//! implementation is the DTLS/EC-JPAKE session in `meshcop-dtls`.

/// Default cap on a received record, in bytes.
pub const DEFAULT_MAX_RECORD: usize = 4096;

/// A connected, mutually authenticated datagram session.
///
/// One record per call in both directions: `send` writes its payload as
/// exactly one secure-transport record, and `receive` returns at most
/// the next decrypted record. Within one session the caller never issues
/// a second `send` before it has received the expected response to the
/// prior one, so implementations need no internal queueing.
pub trait SecureDatagram {
    /// Establish the session against `(host, port)`, authenticating both
    /// sides with the admin code.
    fn connect(&mut self, host: &str, port: u16, admin_code: &str) -> Result<(), TransportError>;

    /// Send one record. Partial writes are errors.
    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError>;

    /// Receive the next record, truncated to `max_len` at most.
    fn receive(&mut self, max_len: usize) -> Result<Vec<u8>, TransportError>;

    /// Tear the session down. Idempotent; safe in any state.
    fn close(&mut self);
}

/// Errors surfaced by a [`SecureDatagram`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The admin code failed validation, before any network activity
    #[error(transparent)]
    InvalidAdminCode(#[from] crate::admin_code::InvalidAdminCode),

    /// UDP connect, engine configuration or setup, session reset, or
    /// RNG seeding failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The handshake returned a fatal error, or the step cap was hit
    #[error("handshake failed ({code:#x}): {message}")]
    HandshakeFailed {
        /// Engine error code (absolute value of the negative return)
        code: i32,
        /// Engine error text
        message: String,
    },

    /// The record layer rejected a write
    #[error("send failed (engine code {0})")]
    SendFailed(i32),

    /// The record layer rejected a read
    #[error("receive failed (engine code {0})")]
    ReceiveFailed(i32),

    /// `send` or `receive` was called outside an established session
    #[error("session is not established")]
    NotEstablished,
}
