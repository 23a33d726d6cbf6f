//! Raw per-host findings, the only shape a [`ScanExecutor`](crate::scanner::ScanExecutor)
//! is allowed to return.
//!
//! Nothing here is normalized: states are whatever the engine printed, ports
//! keep the order the engine reported them in and may repeat.
use std::collections::BTreeMap;

/// One port record as the engine reported it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPort {
    pub port: u16,
    pub state: String,
    pub service: Option<String>,
    pub version: Option<String>,
}

impl RawPort {
    pub fn new(port: u16, state: &str) -> Self {
        Self {
            port,
            state: state.to_owned(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_service(mut self, service: &str, version: Option<&str>) -> Self {
        self.service = Some(service.to_owned());
        self.version = version.map(str::to_owned);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHost {
    /// Engine host state, e.g. `up`.
    pub state: String,
    pub hostnames: Vec<String>,
    /// Protocol name (`tcp`, `udp`, ...) to ports in report order.
    pub protocols: BTreeMap<String, Vec<RawPort>>,
}

impl RawHost {
    pub fn new(state: &str) -> Self {
        Self {
            state: state.to_owned(),
            ..Self::default()
        }
    }

    /// Appends a port under `protocol`.
    #[must_use]
    pub fn with_port(mut self, protocol: &str, port: RawPort) -> Self {
        self.protocols
            .entry(protocol.to_owned())
            .or_default()
            .push(port);
        self
    }

    pub fn ports(&self, protocol: &str) -> &[RawPort] {
        self.protocols.get(protocol).map_or(&[][..], Vec::as_slice)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFindings {
    pub hosts: BTreeMap<String, RawHost>,
    /// Elapsed seconds as printed by the engine.
    pub elapsed: Option<String>,
    /// Command line the engine says it ran.
    pub command: Option<String>,
}

impl RawFindings {
    /// Looks the scanned target up, first by host key then by a reported
    /// hostname. Engines key hosts by address even when a name was scanned.
    pub fn host(&self, target: &str) -> Option<&RawHost> {
        self.hosts.get(target).or_else(|| {
            self.hosts.values().find(|host| {
                host.hostnames
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(target))
            })
        })
    }
}
