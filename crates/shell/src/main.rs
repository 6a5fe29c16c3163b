use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fittrack_backend::{BackendConfig, InMemoryAuthProvider, InMemoryDocumentStore};
use fittrack_client::{AppState, ClientConfig};
use fittrack_events::{AppEvent, EventLogger};

mod command;
mod shell;

use command::Command;
use shell::{render_event, Shell};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    // Logs go to stderr so they never interleave with command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fittrack_shell=info,fittrack_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let backend_config = BackendConfig::from_env().context("Invalid backend configuration")?;
    let client_config = ClientConfig::from_env().context("Invalid client configuration")?;
    tracing::info!(
        collection = %client_config.workouts_collection,
        min_password_length = client_config.min_password_length,
        "Loaded configuration"
    );

    // --- Providers and client state ---
    let auth = Arc::new(InMemoryAuthProvider::new(backend_config));
    let store = Arc::new(InMemoryDocumentStore::new());
    let state = AppState::init(client_config, auth, store);

    // --- Event services ---
    let logger_handle = tokio::spawn(EventLogger::run(state.bus.subscribe()));
    let mut events = state.bus.subscribe();

    // --- REPL ---
    let mut shell = Shell::new(state.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("FitTrack. Type `help` for a list of commands.");
    prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                let mut quit = false;
                match Command::parse(&line) {
                    None => {}
                    Some(Err(e)) => println!("{e}"),
                    Some(Ok(command)) => {
                        let reply = shell.execute(command).await;
                        for line in &reply.lines {
                            println!("{line}");
                        }
                        quit = reply.quit;
                    }
                }
                print_pending(&mut events);
                if quit {
                    break;
                }
                prompt();
            }
            received = events.recv() => match received {
                Ok(event) => {
                    if let Some(line) = render_event(&event) {
                        println!("{line}");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Console fell behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    // --- Shutdown ---
    tracing::info!("Shutting down");
    shell.close().await;
    drop(shell);
    drop(events);
    state.shutdown();

    // The bus closed with the last state handle, so the logger drains and exits.
    match tokio::time::timeout(Duration::from_secs(5), logger_handle).await {
        Ok(Ok(logged)) => tracing::info!(logged, "Event logger stopped"),
        Ok(Err(e)) => tracing::error!(error = %e, "Event logger task failed"),
        Err(_) => tracing::warn!("Event logger did not stop in time"),
    }

    Ok(())
}

/// Print events a command already queued, so they show before the prompt.
fn print_pending(events: &mut broadcast::Receiver<AppEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => {
                if let Some(line) = render_event(&event) {
                    println!("{line}");
                }
            }
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "Console fell behind the event bus");
            }
            Err(_) => break,
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
