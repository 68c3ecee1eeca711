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

//! Hub browser trait.

use crate::DiscoveryError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use meshcop_common::ThreadHub;

/// Discovers Thread Border Routers advertising the ephemeral
/// commissioning service.
///
/// Implementations browse DNS-SD for `_meshcop-e._udp` and resolve each
/// instance to an IPv4 address and UDP port.
#[async_trait]
pub trait HubBrowser: Send + Sync {
    /// Start browsing for commissioning services.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::BrowseFailed` if browsing cannot be
    /// started.
    async fn start_browsing(&mut self) -> Result<(), DiscoveryError>;

    /// Stop browsing.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::StopBrowseFailed` if browsing cannot be
    /// stopped.
    async fn stop_browsing(&mut self) -> Result<(), DiscoveryError>;

    /// Snapshot of the hubs resolved so far.
    fn discovered_hubs(&self) -> Vec<ThreadHub>;

    /// Stream of discovery events (hubs appearing and disappearing).
    fn event_stream(&self) -> BoxStream<'_, HubEvent>;
}

/// Discovery events.
#[derive(Debug, Clone)]
pub enum HubEvent {
    /// A commissioning service resolved to a usable endpoint
    HubFound(ThreadHub),

    /// A previously seen service went away
    HubLost {
        /// Instance name of the removed service
        instance_name: String,
    },
}
