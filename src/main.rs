mod backup;
mod config;
mod consistency;
mod db;
mod error;
mod import;
mod ipc;
mod model;
mod query;
mod store;

use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cfg = config::Config::from_env();

    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_ansi(false))
        .with(EnvFilter::try_new(&cfg.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut state = ipc::AppState::new();
    if let Some(path) = cfg.workspace.clone() {
        if let Err(e) = state.open_workspace(path) {
            tracing::error!(error = %e, "failed to open configured workspace");
        }
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "schoold ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            Err(e) => {
                tracing::warn!(error = %e, "malformed request line");
                ipc::bad_json(&e.to_string())
            }
        };

        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
