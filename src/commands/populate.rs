//! Populate command runner.

use anyhow::Context;
use loadtest_engine::target::database_name;
use loadtest_mysql::{MySQLConnectionProvider, MySQLPopulator};
use tracing::{error, info, warn};

use crate::config::PopulateArgs;
use crate::logging::mask_connection_password;

/// Create `{prefix}test1 ..= {prefix}test{databases}` and fill them with
/// deterministic test data. Uses the first configured host.
pub async fn run_populate(args: PopulateArgs) -> anyhow::Result<()> {
    let provider = MySQLConnectionProvider::from_args(&args.connection)
        .context("Invalid connection settings")?;
    let endpoint = provider
        .endpoints()
        .first()
        .context("No database host configured")?;
    let counts = args.dataset.row_counts();

    info!(
        "Populating {} database(s) via {} (seed={})",
        args.dataset.databases,
        mask_connection_password(&args.connection.connection_url(endpoint)),
        args.seed
    );
    info!(
        "Rows per database: users={} products={} orders={} order_items={}",
        counts.users, counts.products, counts.orders, counts.order_items
    );

    let populator =
        MySQLPopulator::new(provider.opts(endpoint, None)).with_batch_size(args.batch_size);

    let mut total_rows = 0u64;
    let mut errors = Vec::new();

    for index in 1..=args.dataset.databases {
        let name = database_name(&args.connection.prefix, index);
        // Each database gets its own data, reproducible from the run seed.
        let seed = args.seed.wrapping_add(index as u64 - 1);

        match populator.populate_database(&name, counts, seed).await {
            Ok((found, metrics)) => {
                total_rows += metrics.rows_inserted;
                info!(
                    "Populated {}: {} rows in {} batches, {:?} ({:.0} rows/sec)",
                    name,
                    found.total(),
                    metrics.batch_count,
                    metrics.total_duration,
                    metrics.rows_per_second()
                );
            }
            Err(e) => {
                let error_msg = format!("Failed to populate database '{name}': {e}");
                error!("{}", error_msg);
                errors.push(error_msg);
            }
        }
    }

    if let Err(e) = populator.disconnect().await {
        warn!("Failed to close connection pool: {e}");
    }

    if !errors.is_empty() {
        anyhow::bail!(
            "Population completed with {} error(s): {}",
            errors.len(),
            errors.join("; ")
        );
    }

    info!("Test data generation completed: {total_rows} rows inserted");
    Ok(())
}
