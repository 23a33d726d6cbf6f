//! Terminal output for people rather than programs.
use crate::boundary::Response;
use colored::Colorize;
use std::fmt::Write as _;

/// Prints a warning to stderr, without colour in accessible mode.
#[macro_export]
macro_rules! warning {
    ($name:expr, $accessible:expr) => {
        if $accessible {
            eprintln!("[!] {}", $name);
        } else {
            eprintln!("{} {}", ::colored::Colorize::red("[!]"), $name);
        }
    };
}

/// Renders a response as a short report. Batches render each entry in turn.
pub fn summary(response: &Response, accessible: bool) -> String {
    if let Some(items) = response.body.as_array() {
        return items
            .iter()
            .map(|item| {
                let status = item["status"].as_u64().and_then(|s| u16::try_from(s).ok());
                let body = item["body"].clone();
                summary(
                    &Response {
                        status: status.unwrap_or(500),
                        body,
                    },
                    accessible,
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
    }

    let body = &response.body;
    if let Some(error) = body["error"].as_str() {
        let line = format!("Scan failed ({}): {error}", response.status);
        return if accessible { line } else { line.red().to_string() };
    }

    let target = body["target_ip"].as_str().unwrap_or_default();
    let status = body["status"].as_str().unwrap_or("unknown");
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Host {} is {} ({} {}, {:.2}s)",
        target,
        paint(status, accessible),
        body["protocol"].as_str().unwrap_or_default(),
        body["ports_list"].as_str().unwrap_or_default(),
        body["scan_duration"].as_f64().unwrap_or_default()
    );

    let ports = body["open_ports"].as_array().map(Vec::as_slice).unwrap_or_default();
    if ports.is_empty() {
        let _ = writeln!(out, "No open ports found with the selected options.");
    }
    for port in ports {
        let label = format!(
            "{}/{}",
            port["port"].as_u64().unwrap_or_default(),
            port["protocol"].as_str().unwrap_or_default()
        );
        let label = if accessible {
            label
        } else {
            label.purple().to_string()
        };
        let _ = writeln!(
            out,
            "Open {label} {} {} {}",
            port["state"].as_str().unwrap_or_default(),
            port["service"].as_str().unwrap_or_default(),
            port["version"].as_str().unwrap_or_default()
        );
    }

    if let Some(details) = body.get("scan_details") {
        let _ = writeln!(
            out,
            "Command: {} ({})",
            details["command"].as_str().unwrap_or_default(),
            details["duration"].as_str().unwrap_or_default()
        );
    }

    out.trim_end().to_owned()
}

fn paint(status: &str, accessible: bool) -> String {
    if accessible {
        return status.to_owned();
    }
    match status {
        "up" => status.green().to_string(),
        "down" => status.red().to_string(),
        _ => status.yellow().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::summary;
    use crate::boundary::Response;
    use serde_json::json;

    #[test]
    fn success_lists_open_ports() {
        let response = Response {
            status: 200,
            body: json!({
                "target_ip": "203.0.113.5",
                "status": "up",
                "open_ports": [
                    {"port": 22, "protocol": "tcp", "state": "open", "service": "ssh", "version": "N/A"}
                ],
                "scan_duration": 2.47,
                "protocol": "tcp",
                "ports_list": "top100"
            }),
        };

        let text = summary(&response, true);

        assert!(text.starts_with("Host 203.0.113.5 is up (tcp top100, 2.47s)"));
        assert!(text.contains("Open 22/tcp open ssh N/A"));
    }

    #[test]
    fn empty_host_says_so() {
        let response = Response {
            status: 200,
            body: json!({"target_ip": "h", "status": "down", "open_ports": [], "scan_duration": 0.0,
                         "protocol": "udp", "ports_list": "53"}),
        };

        assert!(summary(&response, true).contains("No open ports found"));
    }

    #[test]
    fn errors_show_status_and_message() {
        let response = Response {
            status: 400,
            body: json!({"error": "Target IP or Host is required."}),
        };

        assert_eq!(
            summary(&response, true),
            "Scan failed (400): Target IP or Host is required."
        );
    }

    #[test]
    fn batches_render_every_entry() {
        let response = Response {
            status: 200,
            body: json!([
                {"status": 400, "body": {"error": "first"}},
                {"status": 500, "body": {"error": "second"}}
            ]),
        };

        let text = summary(&response, true);
        assert!(text.contains("Scan failed (400): first"));
        assert!(text.contains("Scan failed (500): second"));
    }
}
