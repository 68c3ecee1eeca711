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

//! Discovery abstractions for the MeshCoP ephemeral commissioning
//! service.
//!
//! A Thread Border Router that is accepting commercial commissioning
//! advertises `_meshcop-e._udp` over DNS-SD for as long as the admin
//! code stays valid. This crate defines the browsing abstractions
//! without being tied to a specific mDNS implementation:
//!
//! - **Core trait**: [`HubBrowser`] for discovering border routers
//! - **Events**: [`HubEvent`] as hubs come and go
//! - **Waiting**: [`wait_for_hub`] and [`wait_for_hub_timeout`] turn the
//!   event stream into the single `(host, port)` the commissioner needs
//! - **Testing**: [`mock`] provides an in-memory backend and browser
//!
//! The mDNS-backed implementation lives in `meshcop-discovery-mdns`.

pub mod browser;
pub mod error;
pub mod mock;
pub mod wait;

pub use browser::{HubBrowser, HubEvent};
pub use error::DiscoveryError;
pub use wait::{wait_for_hub, wait_for_hub_timeout};
