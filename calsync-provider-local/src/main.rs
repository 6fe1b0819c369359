//! calsync-provider-local - file-backed event store for calsync
//!
//! This binary implements the calsync provider protocol, reading JSON
//! requests from stdin and answering on stdout. Events live in a JSON file:
//!   `local_path` from the remote config, or
//!   {data_dir}/calsync/events.json

mod commands;
mod store;

use anyhow::Result;
use calsync_core::remote::protocol::{Command, Request, Response};
use std::io::{self, BufRead, Write};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request).await,
            Err(e) => Response::<()>::error(&format!("Failed to parse request: {}", e)),
        };

        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }

    Ok(())
}

/// Logs go to stderr: stdout is reserved for protocol responses.
fn init_logging() {
    let filter = EnvFilter::try_from_env("CALSYNC_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn handle_request(request: Request) -> String {
    debug!(command = ?request.command, "handling request");

    let result = match request.command {
        Command::ListEvents => commands::list_events::handle(&request.params).await,
        Command::CreateEvent => commands::create_event::handle(&request.params).await,
        Command::DeleteEvent => commands::delete_event::handle(&request.params).await,
    };

    match result {
        Ok(data) => Response::success(data),
        Err(e) => {
            error!(command = ?request.command, "{:#}", e);
            Response::<()>::error(&format!("{:#}", e))
        }
    }
}
