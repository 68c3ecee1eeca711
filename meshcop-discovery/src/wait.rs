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

//! Blocking-until-found helpers over a [`HubBrowser`].

use crate::{DiscoveryError, HubBrowser, HubEvent};
use futures::StreamExt;
use meshcop_common::ThreadHub;
use std::time::Duration;

/// Wait until the browser resolves a hub, returning the first one.
///
/// Checks the already-discovered snapshot first, so a hub resolved
/// between `start_browsing` and this call is not missed.
///
/// # Errors
///
/// Returns `DiscoveryError::HubNotFound` if the event stream ends.
pub async fn wait_for_hub<B: HubBrowser + ?Sized>(
    browser: &mut B,
) -> Result<ThreadHub, DiscoveryError> {
    if let Some(hub) = browser.discovered_hubs().into_iter().next() {
        return Ok(hub);
    }
    let mut events = browser.event_stream();
    while let Some(event) = events.next().await {
        if let HubEvent::HubFound(hub) = event {
            return Ok(hub);
        }
    }
    Err(DiscoveryError::HubNotFound)
}

/// Race [`wait_for_hub`] against a wall-clock deadline.
///
/// A timeout of zero or less waits indefinitely.
///
/// # Errors
///
/// Returns `DiscoveryError::Timeout` when the deadline expires first.
pub async fn wait_for_hub_timeout<B: HubBrowser + ?Sized>(
    browser: &mut B,
    timeout_seconds: f64,
) -> Result<ThreadHub, DiscoveryError> {
    if timeout_seconds <= 0.0 {
        return wait_for_hub(browser).await;
    }
    match tokio::time::timeout(
        Duration::from_secs_f64(timeout_seconds),
        wait_for_hub(browser),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(DiscoveryError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBackend, MockBrowser};

    #[tokio::test]
    async fn test_wait_returns_published_hub() {
        let backend = MockBackend::new();
        let mut browser = MockBrowser::new(backend.clone());
        browser.start_browsing().await.unwrap();

        let hub = ThreadHub::new("192.168.4.1", 49191).unwrap();
        let publish = {
            let backend = backend.clone();
            let hub = hub.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                backend.publish_hub("br1._meshcop-e._udp.local.", hub).await;
            })
        };

        let found = wait_for_hub(&mut browser).await.unwrap();
        assert_eq!(found, hub);
        publish.await.unwrap();
    }

    #[tokio::test]
    async fn test_snapshot_consulted_before_stream() {
        let backend = MockBackend::new();
        let hub = ThreadHub::new("192.168.4.2", 49191).unwrap();
        backend
            .publish_hub("br2._meshcop-e._udp.local.", hub.clone())
            .await;

        let mut browser = MockBrowser::new(backend);
        browser.start_browsing().await.unwrap();
        assert_eq!(wait_for_hub(&mut browser).await.unwrap(), hub);
    }

    #[tokio::test]
    async fn test_timeout_expires() {
        let backend = MockBackend::new();
        let mut browser = MockBrowser::new(backend);
        browser.start_browsing().await.unwrap();

        let err = wait_for_hub_timeout(&mut browser, 0.05).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Timeout));
    }

    #[tokio::test]
    async fn test_zero_timeout_waits_indefinitely() {
        let backend = MockBackend::new();
        let mut browser = MockBrowser::new(backend.clone());
        browser.start_browsing().await.unwrap();

        let hub = ThreadHub::new("192.168.4.3", 49191).unwrap();
        {
            let backend = backend.clone();
            let hub = hub.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                backend.publish_hub("br3._meshcop-e._udp.local.", hub).await;
            });
        }

        let found = wait_for_hub_timeout(&mut browser, 0.0).await.unwrap();
        assert_eq!(found, hub);
    }
}
