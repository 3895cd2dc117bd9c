//! slcmd - interactive console for the command engine.
//!
//! Reads one command per line from stdin. Lines starting with `?` print
//! completions for the rest of the line; `!player <name> [perm...]` switches
//! to a simulated player, `!console` switches back, `!help <command>` prints
//! usage, `!metrics` dumps Prometheus metrics and `!quit` exits.

mod console;

use crate::console::{ConsoleSender, DemoPlayer};
use slcmd::config::{Config, validate};
use slcmd::dispatch::{CommandEngine, Outcome};
use slcmd::metrics;
use slcmd::sender::CommandSender;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration (optional)
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).map_err(|e| {
            error!(path = %path, error = %e, "Failed to load config");
            e
        })?,
        None => Config::default(),
    };

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "Refusing to start with {} configuration error(s)",
            errors.len()
        ));
    }

    metrics::init();

    let engine = CommandEngine::builder().config(config).build();
    console::register_demo_commands(&engine)?;
    let sweeper = engine.spawn_cooldown_sweeper();

    info!(
        commands = engine.tree().len(),
        parsers = engine.parsers().len(),
        "slcmd console ready"
    );

    let mut sender: Arc<dyn CommandSender> = Arc::new(ConsoleSender);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('?') {
            println!("{}", engine.complete_line(&sender, rest).join("  "));
            continue;
        }

        if let Some(directive) = line.strip_prefix('!') {
            let mut words = directive.split_whitespace();
            match words.next() {
                Some("quit") => break,
                Some("metrics") => print!("{}", metrics::gather_metrics()),
                Some("console") => sender = Arc::new(ConsoleSender),
                Some("player") => {
                    let name = words.next().unwrap_or("player");
                    let perms: Vec<&str> = words.collect();
                    sender = Arc::new(DemoPlayer::new(name, &perms));
                    println!("Now acting as {name}");
                }
                Some("help") => {
                    for usage in engine.help(sender.as_ref(), words.next().unwrap_or_default()) {
                        println!("{usage}");
                    }
                }
                _ => println!("Unknown directive"),
            }
            continue;
        }

        match engine.dispatch(sender.clone(), line).await {
            Outcome::Completed(result) => debug!(?result, "Dispatch finished"),
            Outcome::Pending(pending) => {
                tokio::spawn(async move {
                    let result = pending.await;
                    debug!(?result, "Scheduled dispatch finished");
                });
            }
        }
    }

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!("Goodbye");
    Ok(())
}
