//! Deterministic test-data rows for the benchmark tables.
//!
//! Every row carries an explicit id in `1..=count`. Galera's
//! `auto_increment_increment` leaves gaps in generated ids, and the run-time
//! selector assumes every key up to the configured bound exists.

use crate::error::MySQLBenchError;
use loadtest_engine::synth;
use loadtest_engine::{Entity, RowCounts};
use mysql_async::Value;
use rand::rngs::StdRng;
use rand::SeedableRng;

const USER_COLUMNS: &[&str] = &["id", "username", "email", "first_name", "last_name", "status"];
const PRODUCT_COLUMNS: &[&str] = &["id", "name", "description", "price", "category", "stock"];
const ORDER_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "status",
    "total_amount",
    "shipping_address",
    "payment_method",
];
const ORDER_ITEM_COLUMNS: &[&str] = &["id", "order_id", "product_id", "quantity", "price"];

/// Columns written for `entity`, in row order.
pub fn columns(entity: Entity) -> &'static [&'static str] {
    match entity {
        Entity::Users => USER_COLUMNS,
        Entity::Products => PRODUCT_COLUMNS,
        Entity::Orders => ORDER_COLUMNS,
        Entity::OrderItems => ORDER_ITEM_COLUMNS,
    }
}

/// Reject counts that would need foreign keys into an empty table.
pub fn validate_counts(counts: &RowCounts) -> Result<(), MySQLBenchError> {
    if counts.orders > 0 && counts.users == 0 {
        return Err(MySQLBenchError::MissingParent {
            table: "orders",
            parent: "users",
        });
    }
    if counts.order_items > 0 && counts.orders == 0 {
        return Err(MySQLBenchError::MissingParent {
            table: "order_items",
            parent: "orders",
        });
    }
    if counts.order_items > 0 && counts.products == 0 {
        return Err(MySQLBenchError::MissingParent {
            table: "order_items",
            parent: "products",
        });
    }
    Ok(())
}

/// Seeded row source for one database.
pub struct RowGenerator {
    rng: StdRng,
    counts: RowCounts,
}

impl RowGenerator {
    pub fn new(seed: u64, counts: RowCounts) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            counts,
        }
    }

    /// Values for row `id` of `entity`, matching [`columns`].
    pub fn row(&mut self, entity: Entity, id: u64) -> Vec<Value> {
        let rng = &mut self.rng;
        let id = Value::UInt(id);
        match entity {
            Entity::Users => {
                let username = synth::username(rng);
                let email = synth::email(&username);
                vec![
                    id,
                    text(username),
                    text(email),
                    text(synth::first_name(rng)),
                    text(synth::last_name(rng)),
                    text(synth::one_of(rng, &synth::USER_STATUSES)),
                ]
            }
            Entity::Products => vec![
                id,
                text(synth::product_name(rng)),
                text(synth::text(rng, 200)),
                text(synth::decimal_range(rng, 5.0, 1000.0)),
                text(synth::one_of(rng, &synth::CATEGORIES)),
                Value::Int(synth::int_range(rng, 0, 1000)),
            ],
            Entity::Orders => vec![
                id,
                Value::UInt(foreign_key(rng, self.counts.users)),
                text(synth::one_of(rng, &synth::ORDER_STATUSES)),
                text(synth::decimal_range(rng, 10.0, 5000.0)),
                text(synth::address(rng)),
                text(synth::one_of(rng, &synth::PAYMENT_METHODS)),
            ],
            Entity::OrderItems => vec![
                id,
                Value::UInt(foreign_key(rng, self.counts.orders)),
                Value::UInt(foreign_key(rng, self.counts.products)),
                Value::Int(synth::int_range(rng, 1, 10)),
                text(synth::decimal_range(rng, 5.0, 500.0)),
            ],
        }
    }
}

fn text(value: impl Into<String>) -> Value {
    Value::Bytes(value.into().into_bytes())
}

fn foreign_key(rng: &mut StdRng, parent_count: u64) -> u64 {
    synth::int_range(rng, 1, parent_count.max(1) as i64) as u64
}
