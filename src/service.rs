//! One request, start to finish: compile, execute, normalize.
use crate::boundary::ScanRequest;
use crate::compiler::{ScanConfig, ScanConfigCompiler};
use crate::errors::{ScanError, ValidationError};
use crate::normalizer::{normalize, ScanOutcome, ScanResult};
use crate::port_strategy::Protocol;
use crate::scanner::{ScanExecutor, ScanPool};
use log::info;

/// A successful scan together with the choices the compiler made for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub result: ScanResult,
    pub protocol: Protocol,
    pub ports_list: String,
}

/// Shared by every request; the compiler is pure and the pool serializes
/// engine access.
#[derive(Debug)]
pub struct ScanService<E> {
    compiler: ScanConfigCompiler,
    pool: ScanPool<E>,
}

impl<E: ScanExecutor> ScanService<E> {
    pub const fn new(compiler: ScanConfigCompiler, pool: ScanPool<E>) -> Self {
        Self { compiler, pool }
    }

    pub const fn compiler(&self) -> &ScanConfigCompiler {
        &self.compiler
    }

    /// Validates a request. Nothing reaches the engine when this fails.
    pub fn configure(&self, request: &ScanRequest) -> Result<ScanConfig, ValidationError> {
        self.compiler.resolve(
            request.target().as_deref(),
            request.protocol().as_deref(),
            request.port_mode().as_deref(),
            request.ports().as_deref(),
        )
    }

    /// Scans a validated config.
    pub async fn execute(&self, config: &ScanConfig) -> ScanOutcome {
        let args = self.compiler.emit(config);
        match self.pool.run(config.target(), &args).await {
            Ok(raw) => normalize(&raw, config.target()),
            Err(fault) => ScanOutcome::EngineFault(fault),
        }
    }

    pub async fn run(&self, request: &ScanRequest) -> Result<ScanReport, ScanError> {
        let config = self.configure(request)?;

        match self.execute(&config).await {
            ScanOutcome::Success(result) => {
                info!(
                    "Scan of {} finished: host {}, {} open port(s)",
                    config.target(),
                    result.status(),
                    result.ports().len()
                );
                Ok(ScanReport {
                    result,
                    protocol: config.protocol(),
                    ports_list: self.compiler.describe_ports(&config),
                })
            }
            ScanOutcome::HostUnreachable { target, reason } => {
                Err(ScanError::HostUnreachable { target, reason })
            }
            ScanOutcome::EngineFault(fault) => Err(ScanError::Engine(fault)),
        }
    }
}
