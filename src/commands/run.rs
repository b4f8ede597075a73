//! Run command: drive the workload and emit the report.

use anyhow::Context;
use loadtest_engine::{report, RowCounts, WorkloadDriver};
use loadtest_mysql::{discover_bounds, MySQLConnectionProvider};
use mysql_async::Conn;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::RunArgs;
use crate::logging::mask_connection_password;

pub async fn run_benchmark(args: RunArgs) -> anyhow::Result<()> {
    let config = args.bench_config()?;
    let provider = MySQLConnectionProvider::from_args(&args.connection)
        .context("Invalid connection settings")?;

    for endpoint in provider.endpoints() {
        info!(
            "Cluster node: {}",
            mask_connection_password(&args.connection.connection_url(endpoint))
        );
    }

    let discovered = discover_existing_rows(&provider, &args).await?;
    let registry = args.bounded_registry(&discovered);

    let mut driver = WorkloadDriver::new(config, registry, Arc::new(provider));

    let token = driver.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight queries");
            token.cancel();
        }
    });

    let report = driver.run().await.context("Benchmark aborted")?;
    report::log_summary(&report);

    let rendered =
        report::render(&report, args.format.into()).context("Failed to render report")?;
    write_report(&rendered, args.output.as_deref())
}

/// Contiguous key range of every configured target, read through the first
/// cluster node.
async fn discover_existing_rows(
    provider: &MySQLConnectionProvider,
    args: &RunArgs,
) -> anyhow::Result<Vec<(String, RowCounts)>> {
    let endpoint = provider
        .endpoints()
        .first()
        .context("No database host configured")?;
    let url = mask_connection_password(&args.connection.connection_url(endpoint));
    let mut conn = Conn::new(provider.opts(endpoint, None))
        .await
        .with_context(|| format!("Failed to connect to {url}"))?;

    let mut discovered = Vec::new();
    for name in args.registry().names() {
        let found = discover_bounds(&mut conn, &name)
            .await
            .with_context(|| format!("Failed to read row counts from {name}"))?;
        discovered.push((name, found));
    }
    if let Err(e) = conn.disconnect().await {
        warn!("Failed to close connection: {e}");
    }
    Ok(discovered)
}

/// Write the rendered report to `output`, or stdout when unset.
pub fn write_report(rendered: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
