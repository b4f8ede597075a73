//! Target registry: the databases under test and the key space of each.

use crate::error::RunError;
use serde::{Deserialize, Serialize};

/// Entity kinds present in every benchmark database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Users,
    Products,
    Orders,
    OrderItems,
}

impl Entity {
    /// All entities, in parent-before-child order.
    pub const ALL: [Entity; 4] = [
        Entity::Users,
        Entity::Products,
        Entity::Orders,
        Entity::OrderItems,
    ];

    /// Table name backing this entity.
    pub fn table_name(&self) -> &'static str {
        match self {
            Entity::Users => "users",
            Entity::Products => "products",
            Entity::Orders => "orders",
            Entity::OrderItems => "order_items",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Upper bounds on existing row ids, per entity.
///
/// Ids `1..=bound` are guaranteed to exist; a bound of zero means the entity
/// has no rows to look up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCounts {
    pub users: u64,
    pub products: u64,
    pub orders: u64,
    pub order_items: u64,
}

impl RowCounts {
    pub fn new(users: u64, products: u64, orders: u64, order_items: u64) -> Self {
        Self {
            users,
            products,
            orders,
            order_items,
        }
    }

    /// Bound for a single entity.
    pub fn get(&self, entity: Entity) -> u64 {
        match entity {
            Entity::Users => self.users,
            Entity::Products => self.products,
            Entity::Orders => self.orders,
            Entity::OrderItems => self.order_items,
        }
    }

    /// Sum over all entities.
    pub fn total(&self) -> u64 {
        self.users + self.products + self.orders + self.order_items
    }

    /// Per-entity minimum of `self` and `existing`.
    pub fn capped_at(&self, existing: &RowCounts) -> RowCounts {
        RowCounts::new(
            self.users.min(existing.users),
            self.products.min(existing.products),
            self.orders.min(existing.orders),
            self.order_items.min(existing.order_items),
        )
    }
}

/// One addressable database under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    name: String,
    rows: RowCounts,
}

impl Target {
    pub fn new(name: impl Into<String>, rows: RowCounts) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &RowCounts {
        &self.rows
    }

    /// Highest id known to exist for `entity`.
    pub fn bound(&self, entity: Entity) -> u64 {
        self.rows.get(entity)
    }
}

/// Read-only set of targets shared by every worker for the whole run.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: Vec<Target>,
}

impl TargetRegistry {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }

    /// Build the registry for `{prefix}test1 ..= {prefix}test{count}`, all
    /// sharing the same row bounds.
    pub fn from_prefix(prefix: &str, count: usize, rows: RowCounts) -> Self {
        let targets = (1..=count)
            .map(|i| Target::new(database_name(prefix, i), rows))
            .collect();
        Self { targets }
    }

    /// Reject registries the selector cannot draw valid work from.
    ///
    /// Every op kind can address `users`, so each target needs a positive
    /// users bound.
    pub fn validate(&self) -> Result<(), RunError> {
        if self.targets.is_empty() {
            return Err(RunError::EmptyRegistry);
        }
        if let Some(target) = self.targets.iter().find(|t| t.bound(Entity::Users) == 0) {
            return Err(RunError::EmptyTarget(target.name.clone()));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn names(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.name.clone()).collect()
    }
}

/// Name of the `index`-th (1-based) benchmark database.
pub fn database_name(prefix: &str, index: usize) -> String {
    format!("{prefix}test{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_names_follow_prefix() {
        let registry = TargetRegistry::from_prefix("bench_", 3, RowCounts::new(10, 0, 0, 0));
        assert_eq!(
            registry.names(),
            vec!["bench_test1", "bench_test2", "bench_test3"]
        );
    }

    #[test]
    fn test_validate_empty_registry() {
        let registry = TargetRegistry::default();
        assert_eq!(registry.validate(), Err(RunError::EmptyRegistry));
    }

    #[test]
    fn test_validate_target_without_users() {
        let registry = TargetRegistry::new(vec![
            Target::new("a", RowCounts::new(5, 5, 5, 5)),
            Target::new("b", RowCounts::new(0, 5, 5, 5)),
        ]);
        assert_eq!(
            registry.validate(),
            Err(RunError::EmptyTarget("b".to_string()))
        );
    }

    #[test]
    fn test_row_counts_lookup() {
        let rows = RowCounts::new(1, 2, 3, 4);
        assert_eq!(rows.get(Entity::Orders), 3);
        assert_eq!(rows.get(Entity::OrderItems), 4);
        assert_eq!(rows.total(), 10);
    }

    #[test]
    fn test_capped_at_existing_rows() {
        let configured = RowCounts::new(1000, 500, 2000, 5000);
        let existing = RowCounts::new(100, 800, 2000, 0);
        assert_eq!(
            configured.capped_at(&existing),
            RowCounts::new(100, 500, 2000, 0)
        );
    }
}
