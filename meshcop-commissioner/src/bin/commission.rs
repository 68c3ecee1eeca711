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

//! Thread Commissioning CLI
//!
//! This binary:
//! 1. Discovers a border router advertising `_meshcop-e._udp` via mDNS
//! 2. Authenticates a DTLS session with the admin code (EC-JPAKE)
//! 3. Petitions for the active-commissioner role
//! 4. Retrieves and prints the Active Operational Dataset

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use meshcop_commissioner::{LogLevel, ThreadCommissioner, ThreadHub};
use meshcop_discovery::{wait_for_hub_timeout, HubBrowser};
use meshcop_discovery_mdns::MdnsBrowser;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "commission")]
#[command(about = "Thread 1.4 commercial commissioning client", long_about = None)]
struct Args {
    /// Admin code shown by the border router (6-12 digits)
    #[arg(short = 'c', long)]
    admin_code: String,

    /// Discovery timeout in seconds (0 waits indefinitely)
    #[arg(short, long, default_value_t = 10.0)]
    discovery_timeout: f64,

    /// Skip discovery and connect directly to this IPv4 address
    #[arg(long)]
    direct_host: Option<String>,

    /// Port for direct connection (requires --direct-host)
    #[arg(long, default_value_t = 49191)]
    direct_port: u16,

    /// mDNS port (5353 for production; a custom port avoids conflicts
    /// with system responders during development)
    #[arg(long, default_value_t = 5353)]
    mdns_port: u16,

    /// DTLS engine debug threshold: 0 none, 1 errors, 3 info, 4 verbose
    #[arg(long, default_value_t = 0)]
    dtls_log_level: i32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    println!();
    println!(
        "{}",
        "=== Thread Commissioning Client ===".bright_cyan().bold()
    );
    println!();

    match run_commissioner(&args).await {
        Ok(()) => {
            println!();
            println!("{}", "OK: Dataset retrieved!".bright_green().bold());
            Ok(())
        }
        Err(e) => {
            println!();
            error!("Commissioning failed: {:?}", e);
            println!("{} {:?}", "FAIL:".bright_red().bold(), e);
            std::process::exit(1);
        }
    }
}

async fn run_commissioner(args: &Args) -> Result<()> {
    ThreadCommissioner::set_dtls_logging_level(match args.dtls_log_level {
        0 => LogLevel::None,
        1 => LogLevel::Error,
        2 | 3 => LogLevel::Info,
        _ => LogLevel::Verbose,
    });

    // Step 1: discovery, unless a direct endpoint was given
    let hub = if let Some(host) = &args.direct_host {
        println!("- Using direct connection");
        ThreadHub::new(host.clone(), args.direct_port)
            .context("direct port must not be zero")?
    } else {
        println!(
            "- Browsing for {} ({}s timeout)",
            "_meshcop-e._udp".bright_cyan(),
            args.discovery_timeout
        );
        let mut browser =
            MdnsBrowser::new_with_port(args.mdns_port).context("Failed to start mDNS browser")?;
        browser
            .start_browsing()
            .await
            .context("Failed to start browsing")?;
        let hub = wait_for_hub_timeout(&mut browser, args.discovery_timeout)
            .await
            .context("No border router found")?;
        let _ = browser.stop_browsing().await;
        hub
    };
    println!("  Hub: {}", hub.to_string().bright_cyan());

    // Step 2: EC-JPAKE handshake
    println!("- Connecting (EC-JPAKE handshake)...");
    let mut commissioner = ThreadCommissioner::new();
    let connected = commissioner
        .connect_to_hub(hub, args.admin_code.clone())
        .await;
    if let Err(e) = connected {
        commissioner.close().await;
        return Err(e).context("Handshake failed (is the admin code correct?)");
    }
    println!("  {}", "Session established".bright_green());

    // Steps 3-4: petition, then MGMT_ACTIVE_GET
    println!("- Petitioning and requesting the dataset...");
    let dataset = commissioner.get_thread_dataset().await;
    commissioner.close().await;
    let dataset = dataset.context("Dataset retrieval failed")?;

    println!();
    println!("{}", "Active Operational Dataset".bold());
    if let Some(name) = &dataset.network_name {
        println!("  Network name:    {name}");
    }
    if let Some(channel) = dataset.channel {
        println!(
            "  Channel:         {} (page {})",
            channel.channel, channel.page
        );
    }
    if let Some(pan_id) = dataset.pan_id {
        println!("  PAN ID:          0x{pan_id:04X}");
    }
    if let Some(xpan_id) = dataset.xpan_id {
        println!("  Extended PAN:    {}", hex::encode(xpan_id));
    }
    if let Some(key) = dataset.network_key {
        println!("  Network key:     {}", hex::encode(key).bright_yellow());
    }
    if let Some(pskc) = dataset.pskc {
        println!("  PSKc:            {}", hex::encode(pskc));
    }
    if let Some(prefix) = dataset.mesh_local_prefix {
        println!("  Mesh-local /64:  {}", hex::encode(prefix));
    }
    if let Some(timestamp) = dataset.active_timestamp {
        println!(
            "  Timestamp:       {}s +{} ticks",
            timestamp.seconds, timestamp.ticks
        );
    }
    if let Some(policy) = dataset.security_policy {
        println!(
            "  Security policy: rotation {}h, flags 0x{:04X}",
            policy.rotation_hours, policy.flags
        );
    }
    if let Some(mask) = &dataset.channel_mask {
        let words: Vec<String> = mask.masks.iter().map(|m| format!("{m:08X}")).collect();
        println!(
            "  Channel mask:    page {} [{}]",
            mask.page,
            words.join(", ")
        );
    }

    Ok(())
}
