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

//! The DTLS session state machine.

use crate::engine::{error_text, Engine};
use meshcop_common::{AdminCode, SecureDatagram, TransportError};
use tracing::{debug, info};

/// Per-record read timeout.
const READ_TIMEOUT_MS: u32 = 10_000;

/// Upper bound on handshake driving calls, capping worst-case stalls at
/// 100 read timeouts.
const HANDSHAKE_MAX_STEPS: usize = 100;

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, nothing acquired
    Idle,
    /// Resources being acquired
    Connecting,
    /// EC-JPAKE handshake in flight
    Handshaking,
    /// Records may be sent and received
    Established,
    /// Torn down; `connect` starts a fresh session
    Closed,
}

/// A DTLS 1.2 session authenticated with EC-JPAKE over the admin code.
///
/// Only [`SessionState::Established`] permits `send`/`receive`. `close`
/// is idempotent and leaves the handle reusable: the socket is freed and
/// re-initialized, and the handshake context is session-reset, so a
/// later `connect` starts clean. close_notify is deliberately not sent;
/// the peer is expected to time the session out.
pub struct DtlsSession {
    engine: Engine,
    state: SessionState,
}

impl DtlsSession {
    pub fn new() -> Self {
        Self {
            engine: Engine::new(),
            state: SessionState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn connect_inner(
        &mut self,
        host: &str,
        port: u16,
        admin_code: &str,
    ) -> Result<(), TransportError> {
        // Validation comes before any socket or engine work.
        let admin_code = AdminCode::new(admin_code)?;

        self.state = SessionState::Connecting;
        self.engine.reset_socket();
        if self.engine.is_setup() {
            self.engine.session_reset()?;
        }
        self.engine.seed_rng()?;
        self.engine.open_socket(host, port)?;
        self.engine.configure_client(READ_TIMEOUT_MS)?;
        self.engine.setup_or_reset()?;
        self.engine.set_ecjpake_password(admin_code.as_bytes())?;
        self.engine.install_io();

        self.state = SessionState::Handshaking;
        debug!(%host, port, "starting EC-JPAKE handshake");
        let mut rc = 0;
        for _ in 0..HANDSHAKE_MAX_STEPS {
            rc = self.engine.handshake();
            if rc == 0 {
                self.state = SessionState::Established;
                info!(%host, port, "DTLS session established");
                return Ok(());
            }
            if rc == mbedtls_sys::ERR_SSL_WANT_READ || rc == mbedtls_sys::ERR_SSL_WANT_WRITE {
                continue;
            }
            return Err(TransportError::HandshakeFailed {
                code: -rc,
                message: error_text(rc),
            });
        }
        Err(TransportError::HandshakeFailed {
            code: -rc,
            message: "handshake did not complete within the step cap".into(),
        })
    }
}

impl Default for DtlsSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureDatagram for DtlsSession {
    fn connect(&mut self, host: &str, port: u16, admin_code: &str) -> Result<(), TransportError> {
        let result = self.connect_inner(host, port, admin_code);
        if result.is_err() && self.state != SessionState::Idle {
            // Release whatever was acquired before the failure.
            self.engine.reset_socket();
            self.state = SessionState::Idle;
        }
        result
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if self.state != SessionState::Established {
            return Err(TransportError::NotEstablished);
        }
        let written = self.engine.write(payload);
        if written < 0 {
            return Err(TransportError::SendFailed(written));
        }
        // One payload, one record; a short write means the record layer
        // split it and the exchange is broken.
        if written as usize != payload.len() {
            return Err(TransportError::SendFailed(written));
        }
        Ok(())
    }

    fn receive(&mut self, max_len: usize) -> Result<Vec<u8>, TransportError> {
        if self.state != SessionState::Established {
            return Err(TransportError::NotEstablished);
        }
        let mut buffer = vec![0u8; max_len];
        let read = self.engine.read(&mut buffer);
        if read <= 0 {
            return Err(TransportError::ReceiveFailed(read));
        }
        buffer.truncate(read as usize);
        Ok(buffer)
    }

    fn close(&mut self) {
        // close_notify is skipped: sending it after certain error paths
        // is unsafe in the engine, and the peer times out regardless.
        self.engine.reset_socket();
        if self.engine.is_setup() {
            let _ = self.engine.session_reset();
        }
        self.state = SessionState::Closed;
    }
}
