//! Provides a means to read, parse and hold configuration options for the service.
use crate::compiler::CompilerOptions;
use crate::port_strategy::{DEFAULT_PORT_SET, DEFAULT_TOP_PORTS};
use anyhow::{Context, Result};
use clap::Parser;
use serde_derive::Deserialize;
use std::fs;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "scanshape",
    version = env!("CARGO_PKG_VERSION"),
    max_term_width = 120,
    help_template = "{bin} {version}\n{about}\n\nUSAGE:\n    {usage}\n\nOPTIONS:\n{options}",
)]
#[allow(clippy::struct_excessive_bools)]
/// Compiles scan requests into nmap invocations and prints normalized results.
/// Requests are JSON documents: {"target": ..., "protocol": ..., "port_mode": ..., "ports": ...}.
/// A JSON array runs a batch. Without --request, --request-file or --target
/// the request is read from stdin.
pub struct Opts {
    /// The request document as a JSON string.
    #[arg(long, conflicts_with_all = ["request_file", "target"])]
    pub request: Option<String>,

    /// Path to a file holding the request document.
    #[arg(short = 'f', long, value_parser, conflicts_with = "target")]
    pub request_file: Option<PathBuf>,

    /// Build the request from flags: host or IP to scan.
    #[arg(short = 'a', long)]
    pub target: Option<String>,

    /// Protocol for a flag-built request. Anything but "udp" scans TCP.
    #[arg(long, requires = "target")]
    pub protocol: Option<String>,

    /// Port mode for a flag-built request, e.g. top100 or custom.
    #[arg(long, requires = "target")]
    pub port_mode: Option<String>,

    /// Port list for a flag-built request with --port-mode custom. Example: 22,80,443 or 1-1000.
    #[arg(long, requires = "target")]
    pub ports: Option<String>,

    /// Whether to ignore the configuration file or not.
    #[arg(short, long)]
    pub no_config: bool,

    /// Custom path to config file
    #[arg(short, long, value_parser)]
    pub config_path: Option<PathBuf>,

    /// Path to the nmap binary.
    #[arg(long, default_value = "nmap")]
    pub nmap_path: PathBuf,

    /// Seconds a single scan may run before it is killed.
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Number of scans allowed to run at once. Most nmap setups want 1.
    #[arg(short, long, default_value = "1")]
    pub workers: usize,

    /// Port count used when a top-N request carries no usable number.
    #[arg(long, default_value_t = NonZeroU32::new(DEFAULT_TOP_PORTS).unwrap_or(NonZeroU32::MIN))]
    pub default_top: NonZeroU32,

    /// Ports scanned when a request selects neither top-N nor custom ports.
    #[arg(long, default_value = DEFAULT_PORT_SET)]
    pub default_ports: String,

    /// Ask the engine to probe service versions (-sV).
    #[arg(long)]
    pub service_detection: bool,

    /// Add the engine command line and duration label to responses.
    #[arg(long)]
    pub include_details: bool,

    /// Pretty-print the JSON response.
    #[arg(long)]
    pub pretty: bool,

    /// Print a human readable report instead of JSON.
    #[arg(short, long)]
    pub summary: bool,

    /// Accessible mode. Turns off features which negatively affect screen readers.
    #[arg(long)]
    pub accessible: bool,
}

#[cfg(not(tarpaulin_include))]
impl Opts {
    pub fn read() -> Self {
        Self::parse()
    }

    /// Merges values found within the user configuration file into the
    /// command line options.
    pub fn merge(&mut self, config: &Config) {
        if !self.no_config {
            self.merge_required(config);
        }
    }

    fn merge_required(&mut self, config: &Config) {
        macro_rules! merge_required {
            ($($field: ident),+) => {
                $(
                    if let Some(e) = &config.$field {
                        self.$field = e.clone();
                    }
                )+
            }
        }

        merge_required!(
            nmap_path,
            timeout,
            workers,
            default_top,
            default_ports,
            service_detection,
            include_details,
            accessible
        );
    }

    pub fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            default_top: self.default_top,
            default_ports: self.default_ports.clone(),
            service_detection: self.service_detection,
        }
    }

    pub const fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            request: None,
            request_file: None,
            target: None,
            protocol: None,
            port_mode: None,
            ports: None,
            no_config: true,
            config_path: None,
            nmap_path: PathBuf::from("nmap"),
            timeout: DEFAULT_TIMEOUT_SECS,
            workers: 1,
            default_top: NonZeroU32::new(DEFAULT_TOP_PORTS).unwrap_or(NonZeroU32::MIN),
            default_ports: DEFAULT_PORT_SET.to_owned(),
            service_detection: false,
            include_details: false,
            pretty: false,
            summary: false,
            accessible: false,
        }
    }
}

/// Struct used to deserialize the options specified within our config file.
/// These will be further merged with our command line arguments in order to
/// generate the final Opts struct.
#[cfg(not(tarpaulin_include))]
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    nmap_path: Option<PathBuf>,
    timeout: Option<u64>,
    workers: Option<usize>,
    default_top: Option<NonZeroU32>,
    default_ports: Option<String>,
    service_detection: Option<bool>,
    include_details: Option<bool>,
    accessible: Option<bool>,
}

#[cfg(not(tarpaulin_include))]
impl Config {
    /// Reads the configuration file with TOML format and parses it into a
    /// Config struct. A missing file is an empty config.
    ///
    /// # Format
    ///
    /// nmap_path = "/usr/bin/nmap"
    /// timeout = 120
    /// workers = 1
    /// default_top = 100
    /// default_ports = "21,22,23,80,443"
    /// service_detection = false
    /// include_details = false
    ///
    pub fn read(custom_config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = match custom_config_path {
            Some(path) => path,
            None => default_config_path()?,
        };
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing {}", config_path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Constructs default path to config toml
pub fn default_config_path() -> Result<PathBuf> {
    let mut config_path = dirs::home_dir().context("Could not infer config file path.")?;
    config_path.push(".scanshape.toml");
    Ok(config_path)
}
