use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use wallboard_core::model::{NetworkBandwidthData, NetworkDevice, TrafficPair};

use crate::probe::run_cmd_capture;

/// Seconds covered by one vnstat five-minute bucket.
const FIVE_MINUTES_SECS: u64 = 300;

/// Why a bandwidth snapshot could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// vnstat missing, failing, or without any interface data yet.
    #[error("Network monitoring not available")]
    Unavailable,

    /// vnstat answered with something we could not shape.
    #[error("unexpected vnstat output: {0}")]
    Malformed(String),
}

/// `vnstat --json` (json version 2), reduced to the fields we read.
#[derive(Debug, Deserialize)]
pub struct VnstatReport {
    #[serde(default)]
    pub interfaces: Vec<VnstatInterface>,
}

#[derive(Debug, Deserialize)]
pub struct VnstatInterface {
    pub name: String,
    pub traffic: Option<VnstatTraffic>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VnstatTraffic {
    #[serde(default)]
    pub fiveminute: Vec<VnstatBucket>,
    #[serde(default)]
    pub day: Vec<VnstatBucket>,
    #[serde(default)]
    pub month: Vec<VnstatBucket>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct VnstatBucket {
    #[serde(default)]
    pub rx: u64,
    #[serde(default)]
    pub tx: u64,
}

impl VnstatBucket {
    fn totals(bucket: Option<&Self>) -> TrafficPair {
        bucket
            .map(|b| TrafficPair {
                download: b.rx,
                upload: b.tx,
            })
            .unwrap_or_default()
    }

    fn rate(bucket: Option<&Self>) -> TrafficPair {
        let per_sec = |bytes: u64| (bytes as f64 / FIVE_MINUTES_SECS as f64).round() as u64;
        bucket
            .map(|b| TrafficPair {
                download: per_sec(b.rx),
                upload: per_sec(b.tx),
            })
            .unwrap_or_default()
    }
}

/// Parses `arp -a` output (`host (ip) at mac [ether] on iface`).
///
/// Unresolved hosts (`?`) get no hostname; incomplete entries are skipped.
pub fn parse_arp(output: &str) -> Vec<NetworkDevice> {
    output.lines().filter_map(parse_arp_line).collect()
}

fn parse_arp_line(line: &str) -> Option<NetworkDevice> {
    let mut parts = line.split_whitespace();
    let host = parts.next()?;
    let ip = parts
        .next()?
        .strip_prefix('(')?
        .strip_suffix(')')?;
    if parts.next()? != "at" {
        return None;
    }
    let mac = parts.next()?;

    let octets: Vec<&str> = ip.split('.').collect();
    if octets.len() != 4 || octets.iter().any(|o| o.is_empty() || !o.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    if mac.is_empty() || !mac.bytes().all(|b| b.is_ascii_hexdigit() || b == b':') {
        return None;
    }

    Some(NetworkDevice {
        ip: ip.to_string(),
        mac: mac.to_ascii_uppercase(),
        hostname: (host != "?").then(|| host.to_string()),
        download: 0,
        upload: 0,
    })
}

/// Builds the response body from probe results.
///
/// The first vnstat interface is reported. Rates come from the latest
/// five-minute bucket; today and month from the latest day and month buckets.
pub fn shape_bandwidth(
    report: Option<VnstatReport>,
    mut devices: Vec<NetworkDevice>,
    max_devices: usize,
    now: DateTime<Utc>,
) -> Result<NetworkBandwidthData, ServiceError> {
    let iface = report
        .and_then(|r| r.interfaces.into_iter().next())
        .ok_or(ServiceError::Unavailable)?;
    let traffic = iface
        .traffic
        .ok_or_else(|| ServiceError::Malformed(format!("interface {} has no traffic section", iface.name)))?;

    devices.truncate(max_devices);

    Ok(NetworkBandwidthData {
        timestamp: now,
        interface: iface.name,
        current_rates: VnstatBucket::rate(traffic.fiveminute.last()),
        today: VnstatBucket::totals(traffic.day.last()),
        month: VnstatBucket::totals(traffic.month.last()),
        top_devices: devices,
    })
}

/// Shells out to vnstat and arp to answer bandwidth requests.
pub struct NetmonService {
    vnstat_bin: String,
    arp_bin: String,
    max_devices: usize,
    probe_timeout: Duration,
}

impl NetmonService {
    pub fn new(vnstat_bin: String, arp_bin: String, max_devices: usize, probe_timeout: Duration) -> Self {
        Self {
            vnstat_bin,
            arp_bin,
            max_devices,
            probe_timeout,
        }
    }

    /// Current snapshot. Both probes run concurrently.
    pub async fn bandwidth(&self) -> Result<NetworkBandwidthData, ServiceError> {
        let (report, devices) = tokio::join!(self.vnstat(), self.arp_devices());
        shape_bandwidth(report, devices, self.max_devices, Utc::now())
    }

    /// `None` on any failure; logged.
    async fn vnstat(&self) -> Option<VnstatReport> {
        let stdout = match run_cmd_capture(&self.vnstat_bin, &["--json"], self.probe_timeout).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "vnstat probe failed");
                return None;
            }
        };
        match serde_json::from_str(&stdout) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!(error = %e, "vnstat output is not valid json");
                None
            }
        }
    }

    /// Empty on failure; logged.
    async fn arp_devices(&self) -> Vec<NetworkDevice> {
        match run_cmd_capture(&self.arp_bin, &["-a"], self.probe_timeout).await {
            Ok(stdout) => parse_arp(&stdout),
            Err(e) => {
                tracing::warn!(error = %e, "arp probe failed");
                Vec::new()
            }
        }
    }
}
