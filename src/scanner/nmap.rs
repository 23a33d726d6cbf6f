use super::xml::parse_report;
use super::ScanExecutor;
use crate::compiler::CanonicalArgs;
use crate::errors::EngineFault;
use crate::findings::RawFindings;
use async_trait::async_trait;
use log::{debug, info};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time;

// stderr fragments nmap prints when it refuses its command line
const ARGUMENT_ERRORS: [&str; 4] = [
    "port specification",
    "illegal",
    "unrecognized option",
    "invalid argument",
];

/// Runs the `nmap` binary and reads back its XML report.
#[derive(Debug, Clone)]
pub struct NmapExecutor {
    program: PathBuf,
}

impl NmapExecutor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, target: &str, args: &CanonicalArgs) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(args.as_slice())
            .args(["-oX", "-"])
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

impl Default for NmapExecutor {
    fn default() -> Self {
        Self::new("nmap")
    }
}

#[async_trait]
impl ScanExecutor for NmapExecutor {
    async fn execute(
        &self,
        target: &str,
        args: &CanonicalArgs,
        timeout: Duration,
    ) -> Result<RawFindings, EngineFault> {
        info!(
            "Executing scan on {} with arguments: {}",
            target, args
        );

        // Dropping the output future on timeout kills the child.
        let output = time::timeout(timeout, self.command(target, args).output())
            .await
            .map_err(|_| EngineFault::Timeout {
                seconds: timeout.as_secs(),
            })?
            .map_err(|e| {
                EngineFault::InvocationError(format!("{}: {e}", self.program.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr, output.status.code()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("Engine produced {} bytes of XML", stdout.len());

        parse_report(&stdout)
            .map_err(|e| EngineFault::InvocationError(format!("unreadable engine report: {e}")))
    }
}

fn classify_failure(stderr: &str, code: Option<i32>) -> EngineFault {
    let detail = stderr.trim();
    let detail = if detail.is_empty() {
        code.map_or_else(
            || "engine terminated by signal".to_owned(),
            |c| format!("engine exited with status {c}"),
        )
    } else {
        detail.to_owned()
    };

    let lowered = detail.to_ascii_lowercase();
    if ARGUMENT_ERRORS.iter().any(|marker| lowered.contains(marker)) {
        EngineFault::MalformedArguments(detail)
    } else {
        EngineFault::InvocationError(detail)
    }
}
