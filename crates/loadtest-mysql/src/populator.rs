//! Creates the benchmark databases and fills them with test data.

use crate::error::MySQLBenchError;
use crate::rows::{self, RowGenerator};
use crate::schema;
use loadtest_engine::{Entity, RowCounts};
use mysql_async::prelude::*;
use mysql_async::{Conn, Opts, Params, Pool, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default batch size for INSERT operations.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Placeholder limit of a single prepared statement.
const MAX_PLACEHOLDERS: usize = 65_535;

/// Metrics for one populated database.
#[derive(Debug, Clone, Default)]
pub struct PopulateMetrics {
    pub rows_inserted: u64,
    pub batch_count: u64,
    pub total_duration: Duration,
}

impl PopulateMetrics {
    pub fn rows_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.rows_inserted as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

pub struct MySQLPopulator {
    pool: Pool,
    batch_size: usize,
}

impl MySQLPopulator {
    /// `opts` must not select a database; the populator creates them.
    pub fn new(opts: Opts) -> Self {
        Self {
            pool: Pool::new(opts),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Drop and recreate `database`, create its tables, and insert `counts`
    /// rows generated from `seed`.
    ///
    /// Returns the row counts actually found in each table afterwards.
    pub async fn populate_database(
        &self,
        database: &str,
        counts: RowCounts,
        seed: u64,
    ) -> Result<(RowCounts, PopulateMetrics), MySQLBenchError> {
        rows::validate_counts(&counts)?;
        let start = Instant::now();
        let mut conn = self.pool.get_conn().await?;

        conn.query_drop(schema::drop_database(database)?).await?;
        conn.query_drop(schema::create_database(database)?).await?;
        conn.query_drop(schema::use_database(database)?).await?;
        info!("Created database {database}");

        for entity in schema::CREATION_ORDER {
            conn.query_drop(schema::create_table(entity)).await?;
            debug!("Created table {database}.{entity}");
        }

        let mut generator = RowGenerator::new(seed, counts);
        let mut metrics = PopulateMetrics::default();
        let mut found = RowCounts::default();

        for entity in schema::CREATION_ORDER {
            let wanted = counts.get(entity);
            let batch_size = self.batch_size.min(MAX_PLACEHOLDERS / rows::columns(entity).len());
            let mut next_id = 1u64;
            while next_id <= wanted {
                let end = (next_id + batch_size as u64 - 1).min(wanted);
                let batch: Vec<Vec<Value>> = (next_id..=end)
                    .map(|id| generator.row(entity, id))
                    .collect();
                metrics.rows_inserted += insert_batch(&mut conn, entity, batch).await?;
                metrics.batch_count += 1;
                next_id = end + 1;
            }

            let count = count_rows(&mut conn, entity).await?;
            info!("Inserted {count} rows into {database}.{entity}");
            match entity {
                Entity::Users => found.users = count,
                Entity::Products => found.products = count,
                Entity::Orders => found.orders = count,
                Entity::OrderItems => found.order_items = count,
            }
        }

        metrics.total_duration = start.elapsed();
        Ok((found, metrics))
    }

    pub async fn disconnect(self) -> Result<(), MySQLBenchError> {
        self.pool.disconnect().await?;
        Ok(())
    }
}

/// Multi-row `INSERT` for `row_count` rows of `entity`.
pub fn insert_sql(entity: Entity, row_count: usize) -> String {
    let columns = rows::columns(entity);
    let row_template = format!("({})", vec!["?"; columns.len()].join(", "));
    format!(
        "INSERT INTO `{}` ({}) VALUES {}",
        entity.table_name(),
        columns
            .iter()
            .map(|c| format!("`{c}`"))
            .collect::<Vec<_>>()
            .join(", "),
        vec![row_template.as_str(); row_count].join(", ")
    )
}

/// Insert a batch of rows into the table for `entity`.
pub async fn insert_batch(
    conn: &mut Conn,
    entity: Entity,
    rows: Vec<Vec<Value>>,
) -> Result<u64, MySQLBenchError> {
    if rows.is_empty() {
        return Ok(0);
    }
    let sql = insert_sql(entity, rows.len());
    let row_count = rows.len() as u64;
    let params: Vec<Value> = rows.into_iter().flatten().collect();
    conn.exec_drop(sql, Params::Positional(params)).await?;
    Ok(row_count)
}

async fn count_rows(conn: &mut Conn, entity: Entity) -> Result<u64, MySQLBenchError> {
    let count: Option<u64> = conn
        .query_first(format!("SELECT COUNT(*) FROM `{}`", entity.table_name()))
        .await?;
    Ok(count.unwrap_or(0))
}

/// Query for the largest `n` such that ids `1..=n` all exist in the table for
/// `entity`. Yields 0 when id 1 is missing.
pub fn key_bound_sql(database: &str, entity: Entity) -> Result<String, MySQLBenchError> {
    let table = format!("{}.`{}`", schema::quote_identifier(database)?, entity.table_name());
    Ok(format!(
        "SELECT COALESCE(MIN(a.id), 0) FROM {table} a \
         LEFT JOIN {table} b ON b.id = a.id + 1 \
         WHERE b.id IS NULL AND EXISTS (SELECT 1 FROM {table} c WHERE c.id = 1)"
    ))
}

/// Contiguous key range per entity of an existing benchmark database.
///
/// Rows inserted by earlier runs get server-assigned ids, which may leave
/// gaps on Galera, so only the gap-free prefix counts.
pub async fn discover_bounds(
    conn: &mut Conn,
    database: &str,
) -> Result<RowCounts, MySQLBenchError> {
    let mut bounds = [0u64; 4];
    for (slot, entity) in bounds.iter_mut().zip(Entity::ALL) {
        let bound: Option<u64> = conn.query_first(key_bound_sql(database, entity)?).await?;
        *slot = bound.unwrap_or(0);
    }
    debug!(
        "Existing keys in {database}: users={} products={} orders={} order_items={}",
        bounds[0], bounds[1], bounds[2], bounds[3]
    );
    Ok(RowCounts::new(bounds[0], bounds[1], bounds[2], bounds[3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bound_sql() {
        let sql = key_bound_sql("bench_test1", Entity::Users).unwrap();
        assert_eq!(
            sql,
            "SELECT COALESCE(MIN(a.id), 0) FROM `bench_test1`.`users` a \
             LEFT JOIN `bench_test1`.`users` b ON b.id = a.id + 1 \
             WHERE b.id IS NULL AND EXISTS (SELECT 1 FROM `bench_test1`.`users` c WHERE c.id = 1)"
        );
        assert!(key_bound_sql("bench`x", Entity::Users).is_err());
    }

    #[test]
    fn test_insert_sql() {
        let sql = insert_sql(Entity::OrderItems, 2);
        assert_eq!(
            sql,
            "INSERT INTO `order_items` (`id`, `order_id`, `product_id`, `quantity`, `price`) \
             VALUES (?, ?, ?, ?, ?), (?, ?, ?, ?, ?)"
        );
    }

    #[test]
    fn test_rows_per_second() {
        let metrics = PopulateMetrics {
            rows_inserted: 500,
            batch_count: 1,
            total_duration: Duration::from_secs(2),
        };
        assert_eq!(metrics.rows_per_second(), 250.0);
        assert_eq!(PopulateMetrics::default().rows_per_second(), 0.0);
    }
}
