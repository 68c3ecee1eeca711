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

//! Discovered endpoint types.

/// A discovered Thread Border Router candidate.
///
/// Produced by discovery from a resolved `_meshcop-e._udp` service
/// instance and consumed once by the commissioner at connect time. The
/// `host` is a textual IPv4 address; the `port` is the ephemeral
/// commissioner port taken from the SRV record (never hardcoded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadHub {
    /// Textual IPv4 address of the border router
    pub host: String,

    /// UDP port of the ephemeral commissioner service (1-65535)
    pub port: u16,
}

impl ThreadHub {
    /// Create a hub endpoint, rejecting the reserved port 0.
    pub fn new(host: impl Into<String>, port: u16) -> Option<Self> {
        if port == 0 {
            return None;
        }
        Some(Self {
            host: host.into(),
            port,
        })
    }
}

impl std::fmt::Display for ThreadHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_rejects_port_zero() {
        assert!(ThreadHub::new("192.168.1.10", 0).is_none());
        let hub = ThreadHub::new("192.168.1.10", 49191).unwrap();
        assert_eq!(hub.to_string(), "192.168.1.10:49191");
    }
}
