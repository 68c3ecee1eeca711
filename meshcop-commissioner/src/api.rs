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

//! The umbrella API over discovery, transport and the state machine.
//!
//! The DTLS handshake and the CoAP exchanges block on socket I/O, so
//! [`ThreadCommissioner`] moves the session onto a `spawn_blocking`
//! worker for each operation and takes it back afterwards. Discovery
//! stays on the async runtime and feeds the commissioning task a
//! [`ThreadHub`] through [`search_for_hub`].

use crate::commissioner::Commissioner;
use crate::error::CommissionerError;
use crate::state::CommissionerState;
use meshcop_common::{Dataset, ThreadHub};
use meshcop_discovery::{wait_for_hub_timeout, HubBrowser};
use meshcop_discovery_mdns::MdnsBrowser;
use meshcop_dtls::{DtlsSession, LogLevel};

/// Discover the first border router advertising the commissioning
/// service.
///
/// Races mDNS discovery against `timeout_seconds`; a timeout of zero or
/// less waits indefinitely.
///
/// # Errors
///
/// `Discovery(Timeout)` when the deadline expires, `Discovery(..)` when
/// browsing cannot start.
pub async fn search_for_hub(timeout_seconds: f64) -> Result<ThreadHub, CommissionerError> {
    let mut browser = MdnsBrowser::new()?;
    browser.start_browsing().await?;
    let result = wait_for_hub_timeout(&mut browser, timeout_seconds).await;
    let _ = browser.stop_browsing().await;
    Ok(result?)
}

/// A commissioning client over a DTLS/EC-JPAKE session.
///
/// One instance drives one session at a time, end to end:
///
/// ```no_run
/// # async fn run() -> Result<(), meshcop_commissioner::CommissionerError> {
/// use meshcop_commissioner::{search_for_hub, ThreadCommissioner};
///
/// let hub = search_for_hub(10.0).await?;
/// let mut commissioner = ThreadCommissioner::new();
/// commissioner.connect_to_hub(hub, "123456".to_string()).await?;
/// let dataset = commissioner.get_thread_dataset().await?;
/// commissioner.close().await;
/// # Ok(())
/// # }
/// ```
pub struct ThreadCommissioner {
    // Taken while an operation runs on the blocking worker.
    inner: Option<Commissioner<DtlsSession>>,
}

impl ThreadCommissioner {
    pub fn new() -> Self {
        Self {
            inner: Some(Commissioner::new(DtlsSession::new())),
        }
    }

    /// Session state as of the last completed operation.
    pub fn state(&self) -> CommissionerState {
        self.inner
            .as_ref()
            .map_or(CommissionerState::Disconnected, |c| c.state())
    }

    /// Perform the EC-JPAKE handshake against the hub.
    ///
    /// # Errors
    ///
    /// `InvalidAdminCode` without touching the network when the code is
    /// malformed; otherwise connection and handshake errors.
    pub async fn connect_to_hub(
        &mut self,
        hub: ThreadHub,
        admin_code: String,
    ) -> Result<(), CommissionerError> {
        self.run_blocking(move |commissioner| commissioner.connect(&hub, &admin_code))
            .await
    }

    /// Petition for the active-commissioner role and retrieve the
    /// Active Operational Dataset.
    ///
    /// # Errors
    ///
    /// `PetitionFailed` or `DatasetRequestFailed` with the offending
    /// response code; transport errors pass through.
    pub async fn get_thread_dataset(&mut self) -> Result<Dataset, CommissionerError> {
        self.run_blocking(Commissioner::get_active_dataset).await
    }

    /// Tear the session down. Idempotent; safe after a fault.
    pub async fn close(&mut self) {
        let _ = self
            .run_blocking(|commissioner| {
                commissioner.close();
                Ok(())
            })
            .await;
    }

    /// Set the DTLS engine debug threshold (process-wide).
    pub fn set_dtls_logging_level(level: LogLevel) {
        meshcop_dtls::set_log_level(level);
    }

    async fn run_blocking<R>(
        &mut self,
        op: impl FnOnce(&mut Commissioner<DtlsSession>) -> Result<R, CommissionerError>
            + Send
            + 'static,
    ) -> Result<R, CommissionerError>
    where
        R: Send + 'static,
    {
        let mut commissioner = self.inner.take().expect("session present between operations");
        let (commissioner, result) = tokio::task::spawn_blocking(move || {
            let result = op(&mut commissioner);
            (commissioner, result)
        })
        .await
        .expect("commissioning task panicked");
        self.inner = Some(commissioner);
        result
    }
}

impl Default for ThreadCommissioner {
    fn default() -> Self {
        Self::new()
    }
}
