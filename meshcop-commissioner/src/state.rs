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

//! State machine types for the commissioning session.

/// Commissioning session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommissionerState {
    /// No transport session
    Disconnected,
    /// DTLS session established, not yet petitioned
    Connected,
    /// Petition sent, awaiting the border router's verdict
    CommissionerPending,
    /// Accepted as the active commissioner
    CommissionerActive,
    /// MGMT_ACTIVE_GET in flight
    DatasetRequested,
    /// Dataset retrieved; the session has served its purpose
    Idle,
    /// An exchange failed; only `close` is valid from here
    Faulted,
}

impl CommissionerState {
    /// Whether a new `connect` may start from this state.
    pub fn can_connect(&self) -> bool {
        matches!(
            self,
            CommissionerState::Disconnected | CommissionerState::Faulted
        )
    }

    /// Whether the border router accepted us as active commissioner.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            CommissionerState::CommissionerActive
                | CommissionerState::DatasetRequested
                | CommissionerState::Idle
        )
    }
}

impl Default for CommissionerState {
    fn default() -> Self {
        Self::Disconnected
    }
}
