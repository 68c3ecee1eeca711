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

//! Types shared across the MeshCoP commissioning client layers.
//!
//! This crate defines the data model the other crates exchange:
//!
//! - [`ThreadHub`]: a discovered border router endpoint
//! - [`AdminCode`]: the ephemeral commissioning password (ePSKc)
//! - [`Dataset`]: the parsed Active Operational Dataset
//! - [`SecureDatagram`]: the trait the commissioner drives its secure
//!   transport through, with [`TransportError`] as its error type
//!
//! It contains no I/O and no protocol logic; implementations live in the
//! transport and codec crates.

pub mod admin_code;
pub mod dataset;
pub mod transport;
pub mod types;

pub use admin_code::AdminCode;
pub use dataset::{ChannelMask, Dataset, RadioChannel, SecurityPolicy, Timestamp};
pub use transport::{SecureDatagram, TransportError, DEFAULT_MAX_RECORD};
pub use types::ThreadHub;
