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

//! DTLS 1.2 session authenticated with EC-JPAKE, over mbedTLS.
//!
//! This crate provides [`DtlsSession`], the production implementation of
//! `meshcop_common::SecureDatagram`. The handshake runs EC-JPAKE with
//! the user's admin code as the shared secret; there is no certificate
//! chain, so verification mode is `none` and the single permitted
//! ciphersuite is `TLS_ECJPAKE_WITH_AES_128_CCM_8`. Restricting the
//! suite list makes a misconfigured peer fail the handshake instead of
//! negotiating a certificate-based flow nobody can authenticate.
//!
//! The mbedTLS contexts are wrapped in one owned handle (`engine`
//! module): a single constructor initializes every sub-context, a single
//! destructor frees them in order, and teardown is safe however far
//! setup got. Engine debug output is forwarded to `tracing`; the
//! threshold is set process-wide with [`set_log_level`].

mod engine;
pub mod session;

pub use session::{DtlsSession, SessionState};

use mbedtls_sys::types::raw_types::c_int;

/// Engine debug verbosity, forwarded to `tracing`.
///
/// The numeric values are the engine's own thresholds: everything at or
/// below the threshold is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(i32)]
pub enum LogLevel {
    /// No engine output
    None = 0,
    /// Errors only
    Error = 1,
    /// State changes and informational messages
    Info = 3,
    /// Full handshake tracing
    Verbose = 4,
}

/// Set the process-wide engine debug threshold.
pub fn set_log_level(level: LogLevel) {
    unsafe { mbedtls_sys::debug_set_threshold(level as c_int) }
}
