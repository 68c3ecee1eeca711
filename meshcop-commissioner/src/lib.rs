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

//! Thread 1.4 commercial commissioning client.
//!
//! Discovers a Thread Border Router advertising the ephemeral
//! commissioning service, authenticates a DTLS 1.2 session with
//! EC-JPAKE over the user's admin code, petitions for the
//! active-commissioner role, and retrieves the Active Operational
//! Dataset.
//!
//! ## Architecture
//!
//! - [`search_for_hub`] runs mDNS discovery on the async runtime and
//!   yields the first resolved `(host, port)`
//! - [`Commissioner`] is the synchronous state machine over any
//!   `SecureDatagram` transport, sequencing petition and
//!   MGMT_ACTIVE_GET with separate-response handling
//! - [`ThreadCommissioner`] binds the state machine to the DTLS session
//!   and offloads its blocking I/O to a worker
//!
//! The session is single-purpose: once the dataset is retrieved the
//! session idles and is closed; reconnecting means a fresh session.

pub mod api;
pub mod commissioner;
pub mod error;
pub mod state;

pub use api::{search_for_hub, ThreadCommissioner};
pub use commissioner::{Commissioner, DEFAULT_COMMISSIONER_ID};
pub use error::CommissionerError;
pub use state::CommissionerState;

pub use meshcop_common::{AdminCode, Dataset, ThreadHub};
pub use meshcop_dtls::LogLevel;
