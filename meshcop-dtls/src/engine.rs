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

//! Owned handle over the mbedTLS contexts.
//!
//! All unsafe FFI lives here. The handle owns every engine sub-context
//! as a heap allocation that never moves while the engine holds raw
//! pointers into it: the SSL context, its config, the entropy source,
//! the CTR_DRBG, the connected UDP socket, and the retransmission timer.
//! `Engine::new` initializes all of them; `Drop` frees all of them in
//! one fixed order. Every context is initialized before any can fail,
//! so the destructor is safe no matter how far configuration got.

use std::ffi::CString;
use std::ptr;

use mbedtls_sys::types::raw_types::{c_char, c_int, c_void};
use mbedtls_sys::types::size_t;
use meshcop_common::TransportError;
use tracing::{debug, error, trace};

/// `TLS_ECJPAKE_WITH_AES_128_CCM_8`, IANA number 0xC0FF.
const ECJPAKE_WITH_AES_128_CCM_8: c_int = 0xC0FF;

/// Ciphersuite list for `ssl_conf_ciphersuites`; zero-terminated, and
/// static because the config keeps a pointer to it.
static CIPHERSUITES: [c_int; 2] = [ECJPAKE_WITH_AES_128_CCM_8, 0];

/// Personalization string mixed into the DRBG seed.
const DRBG_PERSONALIZATION: &[u8] = b"meshcop-dtls-client";

pub(crate) struct Engine {
    ssl: Box<mbedtls_sys::ssl_context>,
    config: Box<mbedtls_sys::ssl_config>,
    entropy: Box<mbedtls_sys::entropy_context>,
    drbg: Box<mbedtls_sys::ctr_drbg_context>,
    socket: Box<mbedtls_sys::net_context>,
    timer: Box<mbedtls_sys::timing_delay_context>,
    ssl_ready: bool,
}

// The engine is owned exclusively by one session and driven from one
// task at a time; the contexts have no thread affinity.
unsafe impl Send for Engine {}

/// Heap allocation of a zeroable C struct.
fn boxed_zeroed<T>() -> Box<T> {
    unsafe { Box::new(std::mem::zeroed()) }
}

impl Engine {
    /// Allocate and initialize every sub-context.
    pub(crate) fn new() -> Self {
        let mut engine = Self {
            ssl: boxed_zeroed(),
            config: boxed_zeroed(),
            entropy: boxed_zeroed(),
            drbg: boxed_zeroed(),
            socket: boxed_zeroed(),
            timer: boxed_zeroed(),
            ssl_ready: false,
        };
        unsafe {
            mbedtls_sys::ssl_init(&mut *engine.ssl);
            mbedtls_sys::ssl_config_init(&mut *engine.config);
            mbedtls_sys::entropy_init(&mut *engine.entropy);
            mbedtls_sys::ctr_drbg_init(&mut *engine.drbg);
            mbedtls_sys::net_init(&mut *engine.socket);
        }
        engine
    }

    /// Whether `ssl_setup` has bound the SSL context to the config.
    pub(crate) fn is_setup(&self) -> bool {
        self.ssl_ready
    }

    /// Seed the CTR_DRBG from the OS entropy source.
    pub(crate) fn seed_rng(&mut self) -> Result<(), TransportError> {
        let rc = unsafe {
            mbedtls_sys::ctr_drbg_seed(
                &mut *self.drbg,
                Some(mbedtls_sys::entropy_func),
                &mut *self.entropy as *mut _ as *mut c_void,
                DRBG_PERSONALIZATION.as_ptr(),
                DRBG_PERSONALIZATION.len() as size_t,
            )
        };
        if rc != 0 {
            return Err(connection_failed("rng seed", rc));
        }
        Ok(())
    }

    /// Open a connected UDP socket to `(host, port)`. No bytes are sent
    /// until the handshake starts.
    pub(crate) fn open_socket(&mut self, host: &str, port: u16) -> Result<(), TransportError> {
        let host = CString::new(host)
            .map_err(|_| TransportError::ConnectionFailed("host contains NUL".into()))?;
        let port = CString::new(port.to_string()).expect("digits contain no NUL");
        let rc = unsafe {
            mbedtls_sys::net_connect(
                &mut *self.socket,
                host.as_ptr(),
                port.as_ptr(),
                mbedtls_sys::NET_PROTO_UDP as c_int,
            )
        };
        if rc != 0 {
            return Err(connection_failed("udp connect", rc));
        }
        Ok(())
    }

    /// Free the socket and re-initialize it for a later connect.
    pub(crate) fn reset_socket(&mut self) {
        unsafe {
            mbedtls_sys::net_free(&mut *self.socket);
            mbedtls_sys::net_init(&mut *self.socket);
        }
    }

    /// Configure the DTLS client: datagram transport, no certificate
    /// verification (authentication is EC-JPAKE only), the single
    /// EC-JPAKE ciphersuite, the read timeout, the DRBG, and the debug
    /// forwarder.
    pub(crate) fn configure_client(&mut self, read_timeout_ms: u32) -> Result<(), TransportError> {
        let rc = unsafe {
            mbedtls_sys::ssl_config_defaults(
                &mut *self.config,
                mbedtls_sys::SSL_IS_CLIENT as c_int,
                mbedtls_sys::SSL_TRANSPORT_DATAGRAM as c_int,
                mbedtls_sys::SSL_PRESET_DEFAULT as c_int,
            )
        };
        if rc != 0 {
            return Err(connection_failed("ssl config", rc));
        }
        unsafe {
            mbedtls_sys::ssl_conf_authmode(
                &mut *self.config,
                mbedtls_sys::SSL_VERIFY_NONE as c_int,
            );
            mbedtls_sys::ssl_conf_ciphersuites(&mut *self.config, CIPHERSUITES.as_ptr());
            mbedtls_sys::ssl_conf_read_timeout(&mut *self.config, read_timeout_ms);
            mbedtls_sys::ssl_conf_rng(
                &mut *self.config,
                Some(mbedtls_sys::ctr_drbg_random),
                &mut *self.drbg as *mut _ as *mut c_void,
            );
            mbedtls_sys::ssl_conf_dbg(&mut *self.config, Some(forward_debug), ptr::null_mut());
        }
        Ok(())
    }

    /// Bind the SSL context to the config (first connect only) or reset
    /// the previous session (reconnect).
    pub(crate) fn setup_or_reset(&mut self) -> Result<(), TransportError> {
        if self.ssl_ready {
            return self.session_reset();
        }
        let rc = unsafe { mbedtls_sys::ssl_setup(&mut *self.ssl, &*self.config) };
        if rc != 0 {
            return Err(connection_failed("ssl setup", rc));
        }
        self.ssl_ready = true;
        Ok(())
    }

    /// Reset handshake and record state for a fresh session.
    pub(crate) fn session_reset(&mut self) -> Result<(), TransportError> {
        let rc = unsafe { mbedtls_sys::ssl_session_reset(&mut *self.ssl) };
        if rc != 0 {
            return Err(connection_failed("session reset", rc));
        }
        Ok(())
    }

    /// Install the admin code bytes as the EC-JPAKE shared secret.
    /// Must be called after setup/reset, once per handshake.
    pub(crate) fn set_ecjpake_password(&mut self, password: &[u8]) -> Result<(), TransportError> {
        let rc = unsafe {
            mbedtls_sys::ssl_set_hs_ecjpake_password(
                &mut *self.ssl,
                password.as_ptr(),
                password.len() as size_t,
            )
        };
        if rc != 0 {
            return Err(connection_failed("ecjpake password", rc));
        }
        Ok(())
    }

    /// Wire record I/O to the connected socket and the retransmission
    /// timer to the engine's monotonic delay timer.
    pub(crate) fn install_io(&mut self) {
        unsafe {
            mbedtls_sys::ssl_set_timer_cb(
                &mut *self.ssl,
                &mut *self.timer as *mut _ as *mut c_void,
                Some(mbedtls_sys::timing_set_delay),
                Some(mbedtls_sys::timing_get_delay),
            );
            mbedtls_sys::ssl_set_bio(
                &mut *self.ssl,
                &mut *self.socket as *mut _ as *mut c_void,
                Some(mbedtls_sys::net_send),
                Some(mbedtls_sys::net_recv),
                Some(mbedtls_sys::net_recv_timeout),
            );
        }
    }

    /// One handshake driving call; 0 on completion, `ERR_SSL_WANT_READ`
    /// / `ERR_SSL_WANT_WRITE` to continue, anything else fatal.
    pub(crate) fn handshake(&mut self) -> c_int {
        unsafe { mbedtls_sys::ssl_handshake(&mut *self.ssl) }
    }

    /// Write one record; returns bytes written or a negative code.
    pub(crate) fn write(&mut self, payload: &[u8]) -> c_int {
        unsafe {
            mbedtls_sys::ssl_write(&mut *self.ssl, payload.as_ptr(), payload.len() as size_t)
        }
    }

    /// Read at most one record; returns bytes read or a negative code.
    pub(crate) fn read(&mut self, buffer: &mut [u8]) -> c_int {
        unsafe {
            mbedtls_sys::ssl_read(&mut *self.ssl, buffer.as_mut_ptr(), buffer.len() as size_t)
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // One fixed teardown order, mirroring construction.
        unsafe {
            mbedtls_sys::ssl_free(&mut *self.ssl);
            mbedtls_sys::ssl_config_free(&mut *self.config);
            mbedtls_sys::ctr_drbg_free(&mut *self.drbg);
            mbedtls_sys::entropy_free(&mut *self.entropy);
            mbedtls_sys::net_free(&mut *self.socket);
        }
    }
}

/// Engine error text for a (negative) return code.
pub(crate) fn error_text(code: c_int) -> String {
    let mut buffer = [0u8; 128];
    unsafe {
        mbedtls_sys::strerror(
            code,
            buffer.as_mut_ptr() as *mut c_char,
            buffer.len() as size_t,
        );
    }
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(0);
    String::from_utf8_lossy(&buffer[..end]).into_owned()
}

fn connection_failed(stage: &str, code: c_int) -> TransportError {
    TransportError::ConnectionFailed(format!("{stage}: -{:#06x} {}", -code, error_text(code)))
}

/// Engine debug callback; forwards to `tracing` without the admin code
/// ever passing through here (the engine does not log secrets).
unsafe extern "C" fn forward_debug(
    _ctx: *mut c_void,
    level: c_int,
    file: *const c_char,
    line: c_int,
    message: *const c_char,
) {
    if file.is_null() || message.is_null() {
        return;
    }
    let file = std::ffi::CStr::from_ptr(file).to_string_lossy();
    let message = std::ffi::CStr::from_ptr(message).to_string_lossy();
    let message = message.trim_end();
    match level {
        1 => error!(target: "meshcop_dtls::engine", "{file}:{line}: {message}"),
        2 | 3 => debug!(target: "meshcop_dtls::engine", "{file}:{line}: {message}"),
        _ => trace!(target: "meshcop_dtls::engine", "{file}:{line}: {message}"),
    }
}
