//! Reads the nmap XML report (`-oX -`) into [`RawFindings`].
//!
//! Only the parts we use are modelled; everything else in the report is
//! skipped by the deserializer.
use crate::findings::{RawFindings, RawHost, RawPort};
use serde_derive::Deserialize;

#[derive(Debug, Deserialize)]
struct NmapRun {
    #[serde(rename = "@args", default)]
    args: Option<String>,
    #[serde(rename = "host", default)]
    hosts: Vec<Host>,
    #[serde(default)]
    runstats: Option<RunStats>,
}

#[derive(Debug, Deserialize)]
struct Host {
    #[serde(default)]
    status: Option<Status>,
    #[serde(rename = "address", default)]
    addresses: Vec<Address>,
    #[serde(default)]
    hostnames: Option<Hostnames>,
    #[serde(default)]
    ports: Option<Ports>,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(rename = "@state")]
    state: String,
}

#[derive(Debug, Deserialize)]
struct Address {
    #[serde(rename = "@addr")]
    addr: String,
    #[serde(rename = "@addrtype", default)]
    addr_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Hostnames {
    #[serde(rename = "hostname", default)]
    hostnames: Vec<Hostname>,
}

#[derive(Debug, Deserialize)]
struct Hostname {
    #[serde(rename = "@name")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct Ports {
    #[serde(rename = "port", default)]
    ports: Vec<Port>,
}

#[derive(Debug, Deserialize)]
struct Port {
    #[serde(rename = "@protocol")]
    protocol: String,
    #[serde(rename = "@portid")]
    portid: u16,
    state: PortState,
    #[serde(default)]
    service: Option<Service>,
}

#[derive(Debug, Deserialize)]
struct PortState {
    #[serde(rename = "@state")]
    state: String,
}

#[derive(Debug, Deserialize)]
struct Service {
    #[serde(rename = "@name", default)]
    name: Option<String>,
    #[serde(rename = "@version", default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunStats {
    #[serde(default)]
    finished: Option<Finished>,
}

#[derive(Debug, Deserialize)]
struct Finished {
    #[serde(rename = "@elapsed", default)]
    elapsed: Option<String>,
}

/// Parses a complete nmap XML report.
///
/// Hosts are keyed by their IP address, falling back to the MAC address and
/// then the first hostname. A host with none of those is dropped.
pub fn parse_report(xml: &str) -> Result<RawFindings, quick_xml::de::DeError> {
    let run: NmapRun = quick_xml::de::from_str(xml)?;

    let mut findings = RawFindings {
        elapsed: run
            .runstats
            .and_then(|stats| stats.finished)
            .and_then(|finished| finished.elapsed),
        command: run.args,
        ..RawFindings::default()
    };

    for host in run.hosts {
        let hostnames: Vec<String> = host
            .hostnames
            .map(|h| h.hostnames.into_iter().map(|n| n.name).collect())
            .unwrap_or_default();

        let Some(key) = host_key(&host.addresses, &hostnames) else {
            continue;
        };

        let mut raw = RawHost {
            state: host.status.map(|s| s.state).unwrap_or_default(),
            hostnames,
            ..RawHost::default()
        };

        for port in host.ports.map(|p| p.ports).unwrap_or_default() {
            let (service, version) = port
                .service
                .map_or((None, None), |s| (s.name, s.version));
            raw.protocols.entry(port.protocol).or_default().push(RawPort {
                port: port.portid,
                state: port.state.state,
                service,
                version,
            });
        }

        findings.hosts.entry(key).or_insert(raw);
    }

    Ok(findings)
}

fn host_key(addresses: &[Address], hostnames: &[String]) -> Option<String> {
    addresses
        .iter()
        .find(|a| matches!(a.addr_type.as_deref(), Some("ipv4" | "ipv6") | None))
        .or_else(|| addresses.first())
        .map(|a| a.addr.clone())
        .or_else(|| hostnames.first().cloned())
}
