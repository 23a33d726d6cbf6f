//! Turns a scan request into the exact argument list handed to the engine.
use crate::errors::ValidationError;
use crate::port_strategy::{PortMode, Protocol, DEFAULT_PORT_SET, DEFAULT_TOP_PORTS};
use log::debug;
use std::fmt;
use std::num::NonZeroU32;

// Aggressive timing, no reverse DNS, no host discovery: liveness comes from
// the port probes themselves, which also works without raw-socket privileges.
const BASELINE_FLAGS: [&str; 3] = ["-T4", "-n", "-Pn"];

/// A validated scan request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    target: String,
    protocol: Protocol,
    port_mode: PortMode,
}

impl ScanConfig {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub const fn port_mode(&self) -> &PortMode {
        &self.port_mode
    }
}

/// Compiled engine invocation. Only [`ScanConfigCompiler`] can build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalArgs(Vec<String>);

impl CanonicalArgs {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for CanonicalArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Knobs of the compiler that come from configuration rather than the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub default_top: NonZeroU32,
    pub default_ports: String,
    pub service_detection: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            default_top: NonZeroU32::new(DEFAULT_TOP_PORTS).unwrap_or(NonZeroU32::MIN),
            default_ports: DEFAULT_PORT_SET.to_owned(),
            service_detection: false,
        }
    }
}

/// Stateless, so one instance can be shared by every request.
#[derive(Debug, Clone, Default)]
pub struct ScanConfigCompiler {
    options: CompilerOptions,
}

impl ScanConfigCompiler {
    pub const fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub const fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Validates the raw request fields into a [`ScanConfig`].
    ///
    /// Only the target can make this fail. Protocol and port mode always
    /// resolve to something.
    pub fn resolve(
        &self,
        target: Option<&str>,
        protocol: Option<&str>,
        port_mode: Option<&str>,
        ports: Option<&str>,
    ) -> Result<ScanConfig, ValidationError> {
        let target = target.map(str::trim).unwrap_or_default();
        if target.is_empty() {
            return Err(ValidationError::MissingTarget);
        }
        // The engine would read this as one of its own options.
        if target.starts_with('-') {
            return Err(ValidationError::InvalidTarget(target.to_owned()));
        }

        Ok(ScanConfig {
            target: target.to_owned(),
            protocol: Protocol::resolve(protocol),
            port_mode: PortMode::pick(port_mode, ports, self.options.default_top),
        })
    }

    /// Emits the engine arguments for an already validated config.
    pub fn emit(&self, config: &ScanConfig) -> CanonicalArgs {
        let mut args: Vec<String> = BASELINE_FLAGS.iter().map(|&f| f.to_owned()).collect();

        args.push(
            match config.protocol {
                Protocol::Udp => "-sU",
                Protocol::Tcp => "-sT",
            }
            .to_owned(),
        );

        if self.options.service_detection {
            args.push("-sV".to_owned());
        }

        match &config.port_mode {
            PortMode::TopN(count) => {
                args.push("--top-ports".to_owned());
                args.push(count.to_string());
            }
            PortMode::Custom(ports) => {
                args.push("-p".to_owned());
                args.push(ports.clone());
            }
            PortMode::Default => {
                args.push("-p".to_owned());
                args.push(self.options.default_ports.clone());
            }
        }

        let args = CanonicalArgs(args);
        debug!("Compiled engine arguments for {}: {}", config.target, args);
        args
    }

    pub fn compile(
        &self,
        target: Option<&str>,
        protocol: Option<&str>,
        port_mode: Option<&str>,
        ports: Option<&str>,
    ) -> Result<CanonicalArgs, ValidationError> {
        let config = self.resolve(target, protocol, port_mode, ports)?;
        Ok(self.emit(&config))
    }

    /// Human readable description of the ports a config covers.
    pub fn describe_ports(&self, config: &ScanConfig) -> String {
        match &config.port_mode {
            PortMode::TopN(count) => format!("top{count}"),
            PortMode::Custom(ports) => ports.clone(),
            PortMode::Default => self.options.default_ports.clone(),
        }
    }
}
