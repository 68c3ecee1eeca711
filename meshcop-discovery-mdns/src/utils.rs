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

//! Conversion from resolved mDNS services to hub endpoints.

use meshcop_common::ThreadHub;
use meshcop_discovery::DiscoveryError;
use std::net::IpAddr;

/// Convert mdns-sd ScopedIp to IpAddr by stripping the scope ID if
/// present.
fn scoped_ip_to_ip_addr(host: &mdns_sd::ScopedIp) -> Option<IpAddr> {
    let host_str = host.to_string();
    let host_clean = match host_str.find('%') {
        Some(idx) => &host_str[..idx],
        None => &host_str,
    };
    host_clean.parse().ok()
}

/// Turn a resolved service into a hub endpoint.
///
/// The DTLS layer connects over IPv4, so IPv4 addresses are required;
/// a service that resolved only to IPv6 is treated as not found. The
/// port is taken from the SRV record and must be non-zero.
///
/// # Errors
///
/// Returns `DiscoveryError::InvalidService` when no IPv4 address is
/// present or the advertised port is zero.
pub(crate) fn hub_from_service(info: &mdns_sd::ServiceInfo) -> Result<ThreadHub, DiscoveryError> {
    let ipv4 = info
        .get_addresses()
        .iter()
        .filter_map(scoped_ip_to_ip_addr)
        .find(IpAddr::is_ipv4)
        .ok_or_else(|| {
            DiscoveryError::InvalidService(format!(
                "{} resolved without an IPv4 address",
                info.get_fullname()
            ))
        })?;

    ThreadHub::new(ipv4.to_string(), info.get_port()).ok_or_else(|| {
        DiscoveryError::InvalidService(format!("{} advertised port 0", info.get_fullname()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SERVICE_NAME;

    fn resolved(host: &str, addr: &str, port: u16) -> mdns_sd::ServiceInfo {
        let no_txt = std::collections::HashMap::<String, String>::new();
        mdns_sd::ServiceInfo::new(SERVICE_NAME, "br", host, addr, port, no_txt)
            .expect("valid service info")
    }

    #[test]
    fn test_ipv4_service_accepted() {
        let info = resolved("br.local.", "192.168.7.1", 49191);
        let hub = hub_from_service(&info).unwrap();
        assert_eq!(hub.host, "192.168.7.1");
        assert_eq!(hub.port, 49191);
    }

    #[test]
    fn test_ipv6_only_service_rejected() {
        let info = resolved("br.local.", "fe80::1", 49191);
        assert!(matches!(
            hub_from_service(&info),
            Err(DiscoveryError::InvalidService(_))
        ));
    }

    #[test]
    fn test_port_zero_rejected() {
        let info = resolved("br.local.", "192.168.7.1", 0);
        assert!(matches!(
            hub_from_service(&info),
            Err(DiscoveryError::InvalidService(_))
        ));
    }
}
