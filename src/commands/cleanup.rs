//! Cleanup command: drop the benchmark databases.

use anyhow::Context;
use loadtest_mysql::{drop_databases, list_databases, MySQLConnectionProvider};
use mysql_async::Conn;
use std::io::{BufRead, Write};
use tracing::{info, warn};

use crate::config::CleanupArgs;
use crate::logging::mask_connection_password;

/// Drop every database starting with the configured prefix. Uses the first
/// configured host.
pub async fn run_cleanup(args: CleanupArgs) -> anyhow::Result<()> {
    let prefix = args.connection.prefix.clone();
    let provider = MySQLConnectionProvider::from_args(&args.connection)
        .context("Invalid connection settings")?;
    let endpoint = provider
        .endpoints()
        .first()
        .context("No database host configured")?;

    let url = mask_connection_password(&args.connection.connection_url(endpoint));
    let mut conn = Conn::new(provider.opts(endpoint, None))
        .await
        .with_context(|| format!("Failed to connect to {url}"))?;
    info!("Connected to {url}");

    let names = list_databases(&mut conn, &prefix)
        .await
        .context("Failed to list databases")?;

    if names.is_empty() {
        info!("No databases found with prefix {prefix}");
        return Ok(());
    }

    info!("Found {} benchmark databases:", names.len());
    for name in &names {
        info!("  - {name}");
    }

    if !args.yes {
        let prompt = format!(
            "Do you want to drop these {} databases? (y/N): ",
            names.len()
        );
        let confirmed = tokio::task::spawn_blocking(move || confirm(&prompt))
            .await
            .context("Confirmation prompt failed")??;
        if !confirmed {
            info!("Cleanup cancelled");
            return Ok(());
        }
    }

    let summary = drop_databases(&mut conn, &names).await;
    if let Err(e) = conn.disconnect().await {
        warn!("Failed to close connection: {e}");
    }

    info!(
        "Cleanup completed: dropped {} of {} databases",
        summary.dropped.len(),
        names.len()
    );
    if !summary.failed.is_empty() {
        anyhow::bail!("Failed to drop {} database(s)", summary.failed.len());
    }
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

/// Only an explicit `y` confirms.
pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
