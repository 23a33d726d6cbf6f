#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown, clippy::if_not_else, clippy::non_ascii_literal)]

use anyhow::{Context, Result};
use log::debug;
use scanshape::boundary::{self, ScanRequest};
use scanshape::compiler::ScanConfigCompiler;
use scanshape::input::{Config, Opts};
use scanshape::scanner::{NmapExecutor, ScanPool};
use scanshape::service::ScanService;
use scanshape::tui::summary;
use scanshape::warning;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            warning!(format!("{e:#}"), false);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the request was answered with status 200.
async fn run() -> Result<bool> {
    let mut opts = Opts::read();
    if !opts.no_config {
        let config = Config::read(opts.config_path.clone())?;
        opts.merge(&config);
    }

    debug!("Main() `opts` arguments are {:?}", opts);

    let body = request_body(&opts)?;

    let service = ScanService::new(
        ScanConfigCompiler::new(opts.compiler_options()),
        ScanPool::new(
            NmapExecutor::new(opts.nmap_path.clone()),
            opts.workers,
            opts.scan_timeout(),
        ),
    );

    let response = boundary::handle(&service, &body, opts.include_details).await;

    if opts.summary {
        println!("{}", summary(&response, opts.accessible));
    } else if opts.pretty {
        println!("{}", serde_json::to_string_pretty(&response.body)?);
    } else {
        println!("{}", response.body);
    }

    Ok(response.is_success())
}

fn request_body(opts: &Opts) -> Result<String> {
    if let Some(request) = &opts.request {
        return Ok(request.clone());
    }

    if let Some(path) = &opts.request_file {
        return fs::read_to_string(path)
            .with_context(|| format!("reading request from {}", path.display()));
    }

    if let Some(target) = &opts.target {
        let request = ScanRequest {
            protocol: opts.protocol.clone().map(Value::String),
            port_mode: opts.port_mode.clone().map(Value::String),
            ports: opts.ports.clone().map(Value::String),
            ..ScanRequest::new(target)
        };
        return Ok(serde_json::to_string(&request)?);
    }

    let mut body = String::new();
    io::stdin()
        .read_to_string(&mut body)
        .context("reading request from stdin")?;
    Ok(body)
}
