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

//! mDNS-backed discovery of MeshCoP ephemeral commissioning services.
//!
//! Browses for `_meshcop-e._udp` with the `mdns-sd` crate and resolves
//! instances to `(IPv4 address, port)` endpoints. The port comes from
//! the SRV record; the commonly observed value is 49191, but it is
//! never assumed.

mod browser;
mod utils;

pub use browser::MdnsBrowser;

/// The DNS-SD service type a border router advertises while an admin
/// code is active.
pub const SERVICE_NAME: &str = "_meshcop-e._udp.local.";
