//! Query selection: turns a pseudo-random source into concrete work items.
//!
//! Selection is pure data synthesis. Given the same RNG state and registry it
//! always produces the same sequence of work items, which is what makes a
//! seeded run reproducible per worker.

use crate::error::RunError;
use crate::operation::{OperationKind, OperationWeights};
use crate::statement::{Param, Statement};
use crate::synth;
use crate::target::{Entity, Target, TargetRegistry};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

const READ_USER: &str = "SELECT * FROM users WHERE id = ?";
const READ_PRODUCT: &str = "SELECT * FROM products WHERE id = ?";
const READ_ORDER: &str = "SELECT o.id, o.status, o.total_amount, oi.product_id, oi.quantity, oi.price \
     FROM orders o LEFT JOIN order_items oi ON oi.order_id = o.id WHERE o.id = ?";
const READ_ORDER_ITEM: &str = "SELECT * FROM order_items WHERE id = ?";

const INSERT_USER: &str = "INSERT INTO users (username, email, first_name, last_name, status) \
     VALUES (?, ?, ?, ?, ?)";
const INSERT_PRODUCT: &str = "INSERT INTO products (name, description, price, category, stock) \
     VALUES (?, ?, ?, ?, ?)";

const UPDATE_USER: &str = "UPDATE users SET status = ? WHERE id = ?";
const UPDATE_PRODUCT: &str = "UPDATE products SET stock = ? WHERE id = ?";
const UPDATE_ORDER: &str = "UPDATE orders SET status = ? WHERE id = ?";

const READABLE: [Entity; 4] = Entity::ALL;
const INSERTABLE: [Entity; 2] = [Entity::Users, Entity::Products];
const UPDATABLE: [Entity; 3] = [Entity::Users, Entity::Products, Entity::Orders];

/// One concrete statement plus the target it runs against.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem<'a> {
    pub kind: OperationKind,
    pub target: &'a Target,
    pub statement: Statement,
}

/// Chooses operation kinds and targets, and synthesises statements.
#[derive(Debug, Clone)]
pub struct QuerySelector {
    weights: OperationWeights,
    kinds: WeightedIndex<u32>,
}

impl QuerySelector {
    pub fn new(weights: OperationWeights) -> Result<Self, RunError> {
        let kinds = WeightedIndex::new(weights.as_array()).map_err(|_| RunError::ZeroWeights)?;
        Ok(Self { weights, kinds })
    }

    pub fn weights(&self) -> OperationWeights {
        self.weights
    }

    /// Draw the next work item.
    ///
    /// # Panics
    ///
    /// If `registry` is empty. The driver validates the registry before any
    /// worker starts.
    pub fn next<'a, R: Rng + ?Sized>(&self, rng: &mut R, registry: &'a TargetRegistry) -> WorkItem<'a> {
        let kind = OperationKind::ALL[self.kinds.sample(rng)];
        let targets = registry.targets();
        let target = &targets[rng.gen_range(0..targets.len())];

        let statement = match kind {
            OperationKind::Read => read_statement(rng, target),
            OperationKind::Insert => insert_statement(rng),
            OperationKind::Update => update_statement(rng, target),
        };

        WorkItem {
            kind,
            target,
            statement,
        }
    }
}

/// Pick an entity with at least one existing row. `users` always qualifies on
/// a validated target.
fn keyed_entity<R: Rng + ?Sized>(rng: &mut R, target: &Target, candidates: &[Entity]) -> Entity {
    let available: Vec<Entity> = candidates
        .iter()
        .copied()
        .filter(|e| target.bound(*e) > 0)
        .collect();
    available.choose(rng).copied().unwrap_or(Entity::Users)
}

/// Uniform key in `1..=bound`.
fn existing_key<R: Rng + ?Sized>(rng: &mut R, target: &Target, entity: Entity) -> Param {
    let bound = target.bound(entity).max(1);
    Param::Int(rng.gen_range(1..=bound) as i64)
}

fn read_statement<R: Rng + ?Sized>(rng: &mut R, target: &Target) -> Statement {
    let entity = keyed_entity(rng, target, &READABLE);
    let sql = match entity {
        Entity::Users => READ_USER,
        Entity::Products => READ_PRODUCT,
        Entity::Orders => READ_ORDER,
        Entity::OrderItems => READ_ORDER_ITEM,
    };
    Statement::new(sql, vec![existing_key(rng, target, entity)])
}

fn insert_statement<R: Rng + ?Sized>(rng: &mut R) -> Statement {
    match INSERTABLE.choose(rng).copied().unwrap_or(Entity::Users) {
        Entity::Products => {
            let name = synth::product_name(rng);
            let description = synth::text(rng, 200);
            let price = synth::decimal_range(rng, 5.0, 1000.0);
            let category = synth::one_of(rng, &synth::CATEGORIES);
            let stock = synth::int_range(rng, 0, 1000);
            Statement::new(
                INSERT_PRODUCT,
                vec![
                    name.into(),
                    description.into(),
                    Param::Decimal(price),
                    category.into(),
                    stock.into(),
                ],
            )
        }
        _ => {
            let username = synth::username(rng);
            let email = synth::email(&username);
            let first_name = synth::first_name(rng);
            let last_name = synth::last_name(rng);
            let status = synth::one_of(rng, &synth::USER_STATUSES);
            Statement::new(
                INSERT_USER,
                vec![
                    username.into(),
                    email.into(),
                    first_name.into(),
                    last_name.into(),
                    status.into(),
                ],
            )
        }
    }
}

fn update_statement<R: Rng + ?Sized>(rng: &mut R, target: &Target) -> Statement {
    let entity = keyed_entity(rng, target, &UPDATABLE);
    match entity {
        Entity::Products => {
            let stock = synth::int_range(rng, 0, 1000);
            let key = existing_key(rng, target, entity);
            Statement::new(UPDATE_PRODUCT, vec![stock.into(), key])
        }
        Entity::Orders => {
            let status = synth::one_of(rng, &synth::ORDER_STATUSES);
            let key = existing_key(rng, target, entity);
            Statement::new(UPDATE_ORDER, vec![status.into(), key])
        }
        _ => {
            let status = synth::one_of(rng, &synth::USER_STATUSES);
            let key = existing_key(rng, target, Entity::Users);
            Statement::new(UPDATE_USER, vec![status.into(), key])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::RowCounts;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn registry() -> TargetRegistry {
        TargetRegistry::new(vec![
            Target::new("bench_test1", RowCounts::new(100, 20, 15, 30)),
            Target::new("bench_test2", RowCounts::new(50, 0, 0, 0)),
        ])
    }

    fn key_of(statement: &Statement) -> i64 {
        match statement.params().last() {
            Some(Param::Int(key)) => *key,
            other => panic!("expected trailing integer key, got {other:?}"),
        }
    }

    fn entity_of(statement: &Statement) -> Entity {
        let sql = statement.sql();
        if sql.contains("order_items WHERE") {
            Entity::OrderItems
        } else if sql.contains("orders") {
            Entity::Orders
        } else if sql.contains("products") {
            Entity::Products
        } else {
            Entity::Users
        }
    }

    #[test]
    fn test_zero_weights_rejected() {
        let result = QuerySelector::new(OperationWeights::new(0, 0, 0));
        assert!(matches!(result, Err(RunError::ZeroWeights)));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let selector = QuerySelector::new(OperationWeights::default()).unwrap();
        let registry = registry();

        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let a = selector.next(&mut rng1, &registry);
            let b = selector.next(&mut rng2, &registry);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let selector = QuerySelector::new(OperationWeights::default()).unwrap();
        let registry = registry();

        let mut rng1 = StdRng::seed_from_u64(1);
        let mut rng2 = StdRng::seed_from_u64(2);

        let a: Vec<_> = (0..50).map(|_| selector.next(&mut rng1, &registry)).collect();
        let b: Vec<_> = (0..50).map(|_| selector.next(&mut rng2, &registry)).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_forced_read() {
        let selector = QuerySelector::new(OperationWeights::only(OperationKind::Read)).unwrap();
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..100 {
            let item = selector.next(&mut rng, &registry);
            assert_eq!(item.kind, OperationKind::Read);
            assert!(item.statement.sql().starts_with("SELECT"));
        }
    }

    #[test]
    fn test_keys_stay_within_bounds() {
        let selector = QuerySelector::new(OperationWeights::new(1, 0, 1)).unwrap();
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(123);

        for _ in 0..2_000 {
            let item = selector.next(&mut rng, &registry);
            let entity = entity_of(&item.statement);
            let bound = item.target.bound(entity) as i64;
            let key = key_of(&item.statement);
            assert!(bound > 0, "{entity} has no rows on {}", item.target.name());
            assert!(
                (1..=bound).contains(&key),
                "key {key} outside 1..={bound} for {entity}"
            );
        }
    }

    #[test]
    fn test_all_targets_and_kinds_selected() {
        let selector = QuerySelector::new(OperationWeights::default()).unwrap();
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(5);

        let mut kinds = std::collections::HashSet::new();
        let mut targets = std::collections::HashSet::new();
        for _ in 0..500 {
            let item = selector.next(&mut rng, &registry);
            kinds.insert(item.kind);
            targets.insert(item.target.name().to_string());
        }
        assert_eq!(kinds.len(), 3);
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_statements_are_parameter_bound() {
        let selector = QuerySelector::new(OperationWeights::default()).unwrap();
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(77);

        for _ in 0..500 {
            let item = selector.next(&mut rng, &registry);
            let statement = &item.statement;
            assert_eq!(
                statement.sql().matches('?').count(),
                statement.params().len()
            );
            assert!(!statement.sql().contains("bench_"));
        }
    }

    #[test]
    fn test_insert_fields_in_fixed_ranges() {
        let selector = QuerySelector::new(OperationWeights::only(OperationKind::Insert)).unwrap();
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..200 {
            let item = selector.next(&mut rng, &registry);
            let params = item.statement.params();
            if item.statement.sql() == INSERT_PRODUCT {
                let Param::Decimal(price) = &params[2] else {
                    panic!("expected decimal price");
                };
                let price: f64 = price.parse().unwrap();
                assert!((5.0..=1000.0).contains(&price));
                let Param::Int(stock) = &params[4] else {
                    panic!("expected integer stock");
                };
                assert!((0..=1000).contains(stock));
            } else {
                assert_eq!(item.statement.sql(), INSERT_USER);
                let Param::Text(status) = &params[4] else {
                    panic!("expected text status");
                };
                assert!(synth::USER_STATUSES.contains(&status.as_str()));
            }
        }
    }
}
