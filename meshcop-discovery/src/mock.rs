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

//! In-memory discovery for deterministic tests.
//!
//! A [`MockBackend`] stands in for the network: tests publish hubs into
//! it and a [`MockBrowser`] observes them exactly as it would observe
//! mDNS resolutions.

use crate::{DiscoveryError, HubBrowser, HubEvent};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use meshcop_common::ThreadHub;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Shared in-memory service registry.
#[derive(Clone)]
pub struct MockBackend {
    hubs: Arc<RwLock<HashMap<String, ThreadHub>>>,
    events: broadcast::Sender<HubEvent>,
}

impl MockBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            hubs: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    /// Publish a hub under an instance name, as a resolution would.
    pub async fn publish_hub(&self, instance_name: &str, hub: ThreadHub) {
        self.hubs
            .write()
            .await
            .insert(instance_name.to_string(), hub.clone());
        let _ = self.events.send(HubEvent::HubFound(hub));
    }

    /// Remove a previously published hub.
    pub async fn remove_hub(&self, instance_name: &str) {
        if self.hubs.write().await.remove(instance_name).is_some() {
            let _ = self.events.send(HubEvent::HubLost {
                instance_name: instance_name.to_string(),
            });
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.events.subscribe()
    }

    async fn snapshot(&self) -> Vec<ThreadHub> {
        self.hubs.read().await.values().cloned().collect()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock implementation of [`HubBrowser`] over a [`MockBackend`].
pub struct MockBrowser {
    backend: MockBackend,
    browsing: Arc<RwLock<bool>>,
}

impl MockBrowser {
    pub fn new(backend: MockBackend) -> Self {
        Self {
            backend,
            browsing: Arc::new(RwLock::new(false)),
        }
    }
}

#[async_trait]
impl HubBrowser for MockBrowser {
    async fn start_browsing(&mut self) -> Result<(), DiscoveryError> {
        *self.browsing.write().await = true;
        Ok(())
    }

    async fn stop_browsing(&mut self) -> Result<(), DiscoveryError> {
        *self.browsing.write().await = false;
        Ok(())
    }

    fn discovered_hubs(&self) -> Vec<ThreadHub> {
        futures::executor::block_on(self.backend.snapshot())
    }

    fn event_stream(&self) -> BoxStream<'_, HubEvent> {
        let mut receiver = self.backend.subscribe();
        let browsing = self.browsing.clone();

        async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        if *browsing.read().await {
                            yield event;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        // Missed events; keep going with the next one.
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
        .boxed()
    }
}
