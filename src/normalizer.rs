//! Reconciles raw engine findings into one stable result shape.
use crate::errors::EngineFault;
use crate::findings::{RawFindings, RawPort};
use crate::port_strategy::Protocol;
use itertools::Itertools;
use serde_derive::Serialize;
use std::fmt;

/// Placeholder for a service or version the engine did not report.
pub const NOT_AVAILABLE: &str = "N/A";

const UNREACHABLE_REASON: &str = "no data returned; host may be down or filtered";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Up,
    Down,
    Unknown,
}

impl HostStatus {
    /// Any state other than `up` or `down` collapses to `Unknown`.
    pub fn from_engine(state: &str) -> Self {
        match state.trim().to_ascii_lowercase().as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            _ => Self::Unknown,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported port. Two findings are the same port when their
/// `(port, protocol)` pair matches.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PortFinding {
    pub port: u16,
    pub protocol: Protocol,
    pub state: String,
    pub service: String,
    pub version: String,
}

impl PortFinding {
    pub const fn key(&self) -> (u16, Protocol) {
        (self.port, self.protocol)
    }
}

/// Normalized result for one scanned host. Only [`normalize`] builds these.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    target: String,
    status: HostStatus,
    ports: Vec<PortFinding>,
    duration: Option<f64>,
    raw_command: Option<String>,
}

impl ScanResult {
    /// Resolved hostname when the engine reported one, else the scanned target.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub const fn status(&self) -> HostStatus {
        self.status
    }

    /// Unique by `(port, protocol)`, ascending by port, tcp before udp.
    pub fn ports(&self) -> &[PortFinding] {
        &self.ports
    }

    pub const fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Duration for numeric consumers; `0.0` when the engine gave none.
    pub fn duration_secs(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    /// Duration for diagnostics.
    pub fn duration_label(&self) -> String {
        self.duration
            .map_or_else(|| "unavailable".to_owned(), |secs| format!("{secs:.2}"))
    }

    pub fn raw_command(&self) -> &str {
        self.raw_command.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Success(ScanResult),
    HostUnreachable { target: String, reason: String },
    EngineFault(EngineFault),
}

/// Builds the outcome for `scanned_target` out of whatever the engine returned.
///
/// A missing host record is `HostUnreachable`. Once a record is found the
/// outcome is always `Success`, open ports or not.
pub fn normalize(raw: &RawFindings, scanned_target: &str) -> ScanOutcome {
    let Some(host) = raw.host(scanned_target) else {
        return ScanOutcome::HostUnreachable {
            target: scanned_target.to_owned(),
            reason: UNREACHABLE_REASON.to_owned(),
        };
    };

    let tcp = host
        .ports(Protocol::Tcp.as_str())
        .iter()
        .filter(|p| p.state == "open")
        .map(|p| finding(p, Protocol::Tcp));

    // UDP cannot always tell open from filtered, so both are reported.
    let udp = host
        .ports(Protocol::Udp.as_str())
        .iter()
        .filter(|p| p.state == "open" || p.state == "open|filtered")
        .map(|p| finding(p, Protocol::Udp));

    let ports = tcp
        .chain(udp)
        .filter(|f| f.port != 0)
        .unique_by(PortFinding::key)
        .sorted_by_key(PortFinding::key)
        .collect();

    ScanOutcome::Success(ScanResult {
        target: host
            .hostnames
            .iter()
            .find(|name| !name.is_empty())
            .cloned()
            .unwrap_or_else(|| scanned_target.to_owned()),
        status: HostStatus::from_engine(&host.state),
        ports,
        duration: parse_elapsed(raw.elapsed.as_deref()),
        raw_command: raw.command.clone(),
    })
}

fn finding(raw: &RawPort, protocol: Protocol) -> PortFinding {
    PortFinding {
        port: raw.port,
        protocol,
        state: raw.state.clone(),
        service: or_sentinel(raw.service.as_deref()),
        version: or_sentinel(raw.version.as_deref()),
    }
}

fn or_sentinel(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_owned(),
        _ => NOT_AVAILABLE.to_owned(),
    }
}

fn parse_elapsed(elapsed: Option<&str>) -> Option<f64> {
    elapsed
        .and_then(|e| e.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
}
