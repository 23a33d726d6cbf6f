//! This crate turns loosely specified scan requests into canonical
//! [nmap](https://nmap.org) invocations and turns nmap's reports into one
//! stable result shape.
//!
//! The scan itself is delegated to an external engine. What lives here are
//! the two layers around it:
//!
//! 1. **Request compilation**: [`ScanConfigCompiler`](crate::compiler::ScanConfigCompiler)
//!    validates the target and maps protocol and port-mode input, malformed
//!    or not, onto a deterministic argument list.
//! 2. **Execution**: a [`ScanExecutor`](crate::scanner::ScanExecutor) runs the
//!    arguments. [`ScanPool`](crate::scanner::ScanPool) bounds concurrent
//!    invocations and enforces the timeout.
//! 3. **Normalization**: [`normalize`](crate::normalizer::normalize) filters,
//!    deduplicates and orders the raw findings into a
//!    [`ScanOutcome`](crate::normalizer::ScanOutcome).
//! 4. **Boundary**: [`boundary::handle`] answers a JSON request body with a
//!    status code and JSON body, classifying failures through
//!    [`ScanError`](crate::errors::ScanError).
//!
//! ## Usage Example
//!
//! ```rust
//! use scanshape::compiler::ScanConfigCompiler;
//! use scanshape::findings::{RawFindings, RawHost, RawPort};
//! use scanshape::normalizer::{normalize, ScanOutcome};
//!
//! let compiler = ScanConfigCompiler::default();
//! let args = compiler
//!     .compile(Some("203.0.113.5"), Some("tcp"), Some("custom"), Some("22, 80"))
//!     .unwrap();
//! assert_eq!(args.to_string(), "-T4 -n -Pn -sT -p 22,80");
//!
//! let mut raw = RawFindings::default();
//! raw.hosts.insert(
//!     "203.0.113.5".to_owned(),
//!     RawHost::new("up")
//!         .with_port("tcp", RawPort::new(22, "open"))
//!         .with_port("tcp", RawPort::new(80, "closed")),
//! );
//!
//! match normalize(&raw, "203.0.113.5") {
//!     ScanOutcome::Success(result) => assert_eq!(result.ports().len(), 1),
//!     other => panic!("unexpected outcome {other:?}"),
//! }
//! ```
#![doc(html_root_url = "https://docs.rs/scanshape/0.3.0")]

pub mod tui;

pub mod input;

pub mod port_strategy;

pub mod compiler;

pub mod findings;

pub mod scanner;

pub mod normalizer;

pub mod errors;

pub mod service;

pub mod boundary;
