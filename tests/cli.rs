use std::io::Read;
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

const TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the binary without a config file and returns (exit success, stdout).
fn run_scanshape(args: &[&str]) -> (bool, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_scanshape"))
        .arg("--no-config")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start scanshape");

    let status = child
        .wait_timeout(TIMEOUT)
        .expect("failed to wait for scanshape")
        .unwrap_or_else(|| {
            child.kill().unwrap();
            panic!("scanshape did not finish within {TIMEOUT:?}");
        });

    let mut stdout = String::new();
    child
        .stdout
        .take()
        .unwrap()
        .read_to_string(&mut stdout)
        .unwrap();

    (status.success(), stdout)
}

#[test]
fn empty_target_is_rejected_without_running_nmap() {
    let (ok, stdout) = run_scanshape(&[
        "--nmap-path",
        "/nonexistent/nmap",
        "--request",
        r#"{"target": "", "protocol": "udp"}"#,
    ]);

    assert!(!ok);
    let body: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(body, serde_json::json!({"error": "Target IP or Host is required."}));
}

#[test]
fn missing_engine_is_a_server_error() {
    let (ok, stdout) = run_scanshape(&[
        "--nmap-path",
        "/nonexistent/nmap",
        "--target",
        "192.0.2.1",
        "--port-mode",
        "top10",
    ]);

    assert!(!ok);
    let body: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        body["error"],
        "Scan engine execution failed. Check the server logs for details."
    );
}

#[test]
fn summary_mode_prints_plain_text_when_accessible() {
    let (ok, stdout) = run_scanshape(&[
        "--summary",
        "--accessible",
        "--request",
        r#"{"port_mode": "top10"}"#,
    ]);

    assert!(!ok);
    assert_eq!(stdout.trim(), "Scan failed (400): Target IP or Host is required.");
}

#[test]
fn invalid_request_json_fails() {
    let (ok, stdout) = run_scanshape(&["--request", "not json"]);

    assert!(!ok);
    assert!(stdout.contains("An unexpected server error occurred."));
}
