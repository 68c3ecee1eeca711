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

//! mDNS browser implementation.

use crate::utils::hub_from_service;
use crate::SERVICE_NAME;
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use meshcop_common::ThreadHub;
use meshcop_discovery::{DiscoveryError, HubBrowser, HubEvent};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// mDNS-based implementation of [`HubBrowser`].
///
/// The daemon's event channel has exactly one consumer: a pump task
/// spawned by `start_browsing` that folds every daemon event into the
/// hub snapshot and rebroadcasts the translated [`HubEvent`]. Event
/// streams are broadcast subscriptions, so any number of them can run
/// without contending for the daemon channel, and a caller that only
/// ever polls [`discovered_hubs`](HubBrowser::discovered_hubs) still
/// sees every resolution.
pub struct MdnsBrowser {
    mdns: mdns_sd::ServiceDaemon,
    hubs: Arc<RwLock<HashMap<String, ThreadHub>>>,
    events: broadcast::Sender<HubEvent>,
    browsing: bool,
}

impl MdnsBrowser {
    /// Create a browser on the standard mDNS port (5353).
    ///
    /// # Errors
    ///
    /// Returns an error if the mDNS daemon cannot be started.
    pub fn new() -> Result<Self, DiscoveryError> {
        Self::new_with_port(mdns_sd::MDNS_PORT)
    }

    /// Create a browser on a custom port.
    ///
    /// In production this should be 5353 per RFC 6762; a non-standard
    /// port is useful in development to avoid conflicts with system
    /// mDNS responders.
    ///
    /// # Errors
    ///
    /// Returns an error if the mDNS daemon cannot be started.
    pub fn new_with_port(port: u16) -> Result<Self, DiscoveryError> {
        let mdns = mdns_sd::ServiceDaemon::new_with_port(port)
            .map_err(|e| DiscoveryError::BrowseFailed(format!("mDNS daemon unavailable: {e}")))?;
        let (events, _) = broadcast::channel(32);

        Ok(Self {
            mdns,
            hubs: Arc::new(RwLock::new(HashMap::new())),
            events,
            browsing: false,
        })
    }

    /// Fold one daemon event into the snapshot, returning the event
    /// subscribers should see, if any.
    ///
    /// Resolutions that lack an IPv4 address or carry port 0 never
    /// enter the snapshot, and a removal is only reported for a hub
    /// that was actually being tracked.
    fn translate(
        hubs: &RwLock<HashMap<String, ThreadHub>>,
        event: mdns_sd::ServiceEvent,
    ) -> Option<HubEvent> {
        match event {
            mdns_sd::ServiceEvent::ServiceResolved(info) => match hub_from_service(&info) {
                Ok(hub) => {
                    log::debug!("{} resolved to {hub}", info.get_fullname());
                    hubs.write()
                        .unwrap()
                        .insert(info.get_fullname().to_string(), hub.clone());
                    Some(HubEvent::HubFound(hub))
                }
                Err(e) => {
                    log::warn!("ignoring commissioning service: {e}");
                    None
                }
            },
            mdns_sd::ServiceEvent::ServiceRemoved(_, fullname) => {
                hubs.write().unwrap().remove(&fullname).map(|hub| {
                    log::debug!("{fullname} ({hub}) is gone");
                    HubEvent::HubLost {
                        instance_name: fullname,
                    }
                })
            }
            _ => None,
        }
    }
}

#[async_trait]
impl HubBrowser for MdnsBrowser {
    async fn start_browsing(&mut self) -> Result<(), DiscoveryError> {
        if self.browsing {
            return Ok(());
        }
        let receiver = self
            .mdns
            .browse(SERVICE_NAME)
            .map_err(|e| DiscoveryError::BrowseFailed(e.to_string()))?;
        self.browsing = true;

        let hubs = self.hubs.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            // Sole consumer of the daemon channel; ends when the browse
            // is stopped or the daemon goes away.
            loop {
                match receiver.recv_async().await {
                    Ok(mdns_sd::ServiceEvent::SearchStopped(_)) | Err(_) => break,
                    Ok(event) => {
                        if let Some(hub_event) = Self::translate(&hubs, event) {
                            // No subscribers is fine; the snapshot is
                            // already up to date.
                            let _ = events.send(hub_event);
                        }
                    }
                }
            }
            log::debug!("mDNS pump finished");
        });

        log::info!("browsing for {SERVICE_NAME}");
        Ok(())
    }

    async fn stop_browsing(&mut self) -> Result<(), DiscoveryError> {
        if self.browsing {
            self.mdns
                .stop_browse(SERVICE_NAME)
                .map_err(|e| DiscoveryError::StopBrowseFailed(e.to_string()))?;
            self.browsing = false;
        }
        Ok(())
    }

    fn discovered_hubs(&self) -> Vec<ThreadHub> {
        self.hubs.read().unwrap().values().cloned().collect()
    }

    fn event_stream(&self) -> BoxStream<'_, HubEvent> {
        if !self.browsing {
            // Nothing will ever arrive; let waiters fail fast instead
            // of parking on a channel nobody feeds.
            return futures::stream::empty().boxed();
        }
        let mut receiver = self.events.subscribe();
        async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        log::warn!("event stream lagged, skipped {missed} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
        .boxed()
    }
}

impl Drop for MdnsBrowser {
    fn drop(&mut self) {
        if self.browsing {
            let _ = self.mdns.stop_browse(SERVICE_NAME);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved_info(addr: &str, port: u16) -> mdns_sd::ServiceInfo {
        let no_txt = HashMap::<String, String>::new();
        mdns_sd::ServiceInfo::new(SERVICE_NAME, "br", "br.local.", addr, port, no_txt)
            .expect("valid service info")
    }

    #[test]
    fn test_translate_tracks_snapshot() {
        let hubs = RwLock::new(HashMap::new());
        let info = resolved_info("192.168.7.1", 49191);
        let fullname = info.get_fullname().to_string();

        let found = MdnsBrowser::translate(&hubs, mdns_sd::ServiceEvent::ServiceResolved(info));
        assert!(matches!(found, Some(HubEvent::HubFound(_))));
        assert_eq!(hubs.read().unwrap().len(), 1);

        let lost = MdnsBrowser::translate(
            &hubs,
            mdns_sd::ServiceEvent::ServiceRemoved(SERVICE_NAME.to_string(), fullname),
        );
        assert!(matches!(lost, Some(HubEvent::HubLost { .. })));
        assert!(hubs.read().unwrap().is_empty());
    }

    #[test]
    fn test_translate_skips_unusable_resolution() {
        let hubs = RwLock::new(HashMap::new());
        let info = resolved_info("fe80::1", 49191);
        let found = MdnsBrowser::translate(&hubs, mdns_sd::ServiceEvent::ServiceResolved(info));
        assert!(found.is_none());
        assert!(hubs.read().unwrap().is_empty());
    }

    #[test]
    fn test_translate_ignores_unknown_removal() {
        let hubs = RwLock::new(HashMap::new());
        let lost = MdnsBrowser::translate(
            &hubs,
            mdns_sd::ServiceEvent::ServiceRemoved(SERVICE_NAME.to_string(), "ghost".to_string()),
        );
        assert!(lost.is_none());
    }

    #[test]
    fn test_mdns_browser_new() {
        // May fail where mDNS is unavailable; the assertion is only
        // that construction does not panic.
        match MdnsBrowser::new() {
            Ok(_) => log::debug!("mDNS browser created successfully"),
            Err(e) => log::debug!("mDNS not available (expected in some environments): {e}"),
        }
    }
}
