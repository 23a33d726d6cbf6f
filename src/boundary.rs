//! JSON documents exchanged with callers, and the request handler that
//! produces them.
//!
//! Transport is somebody else's problem: [`handle`] takes a request body and
//! returns the status code and JSON body to send back.
use crate::errors::ScanError;
use crate::normalizer::{PortFinding, ScanResult};
use crate::port_strategy::Protocol;
use crate::scanner::ScanExecutor;
use crate::service::{ScanReport, ScanService};
use anyhow::Context;
use futures::future::join_all;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

/// A scan request as sent by callers. Every field is optional here; the
/// compiler decides what is acceptable.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ScanRequest {
    #[serde(default)]
    pub target: Option<Value>,
    #[serde(default)]
    pub target_ip: Option<Value>,
    #[serde(default)]
    pub protocol: Option<Value>,
    #[serde(default)]
    pub port_mode: Option<Value>,
    #[serde(default)]
    pub ports: Option<Value>,
}

impl ScanRequest {
    pub fn new(target: &str) -> Self {
        Self {
            target: Some(Value::String(target.to_owned())),
            ..Self::default()
        }
    }

    /// `target`, falling back to `target_ip`. Numbers and booleans are
    /// taken as written; null, arrays and objects count as absent.
    pub fn target(&self) -> Option<String> {
        [&self.target, &self.target_ip]
            .into_iter()
            .flatten()
            .find_map(|value| scalar_text(value).filter(|t| !t.trim().is_empty()))
    }

    pub fn protocol(&self) -> Option<String> {
        self.protocol.as_ref().and_then(scalar_text)
    }

    pub fn port_mode(&self) -> Option<String> {
        self.port_mode.as_ref().and_then(scalar_text)
    }

    /// The custom port expression. A bare number is a single port.
    pub fn ports(&self) -> Option<String> {
        self.ports.as_ref().and_then(scalar_text)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ScanDetails {
    pub command: String,
    pub duration: String,
}

/// Body of a successful scan.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ScanResponse {
    pub target_ip: String,
    pub status: String,
    pub open_ports: Vec<PortFinding>,
    pub scan_duration: f64,
    pub protocol: Protocol,
    pub ports_list: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_details: Option<ScanDetails>,
}

impl ScanResponse {
    pub fn from_report(report: &ScanReport, include_details: bool) -> Self {
        let result: &ScanResult = &report.result;
        Self {
            target_ip: result.target().to_owned(),
            status: result.status().to_string(),
            open_ports: result.ports().to_vec(),
            scan_duration: result.duration_secs(),
            protocol: report.protocol,
            ports_list: report.ports_list.clone(),
            scan_details: include_details.then(|| ScanDetails {
                command: result.raw_command().to_owned(),
                duration: result.duration_label(),
            }),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Status code plus JSON body.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub const fn is_success(&self) -> bool {
        self.status == 200
    }

    fn ok<T: serde::Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::from_error(&ScanError::Unexpected(
                anyhow::Error::new(e).context("serializing response"),
            )),
        }
    }

    pub fn from_error(error: &ScanError) -> Self {
        let class = error.classify();
        Self {
            status: class.status,
            body: serde_json::json!({ "error": class.message }),
        }
    }
}

/// Answers one request body. A top-level array is a batch whose entries run
/// concurrently through the service's pool; the batch itself answers 200
/// with one `{status, body}` entry per request.
pub async fn handle<E: ScanExecutor>(
    service: &ScanService<E>,
    body: &str,
    include_details: bool,
) -> Response {
    let document: Value = match serde_json::from_str(body).context("request body is not valid JSON")
    {
        Ok(document) => document,
        Err(e) => return Response::from_error(&ScanError::Unexpected(e)),
    };

    match document {
        Value::Array(items) => {
            let responses = join_all(
                items
                    .into_iter()
                    .map(|item| handle_value(service, item, include_details)),
            )
            .await;
            Response::ok(&responses)
        }
        other => handle_value(service, other, include_details).await,
    }
}

async fn handle_value<E: ScanExecutor>(
    service: &ScanService<E>,
    document: Value,
    include_details: bool,
) -> Response {
    let request: ScanRequest = match serde_json::from_value(document)
        .context("request document does not have the expected shape")
    {
        Ok(request) => request,
        Err(e) => return Response::from_error(&ScanError::Unexpected(e)),
    };
    respond(service, &request, include_details).await
}

/// Runs a parsed request and shapes the answer.
pub async fn respond<E: ScanExecutor>(
    service: &ScanService<E>,
    request: &ScanRequest,
    include_details: bool,
) -> Response {
    match service.run(request).await {
        Ok(report) => Response::ok(&ScanResponse::from_report(&report, include_details)),
        Err(e) => Response::from_error(&e),
    }
}
