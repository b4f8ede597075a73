//! Operation kinds and the weight table used to pick between them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Category of statement issued against a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Read,
    Insert,
    Update,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::Read,
        OperationKind::Insert,
        OperationKind::Update,
    ];

    /// Position in [`OperationKind::ALL`].
    pub fn index(&self) -> usize {
        match self {
            OperationKind::Read => 0,
            OperationKind::Insert => 1,
            OperationKind::Update => 2,
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Read => write!(f, "read"),
            OperationKind::Insert => write!(f, "insert"),
            OperationKind::Update => write!(f, "update"),
        }
    }
}

/// Relative weights for read, insert and update selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationWeights {
    pub read: u32,
    pub insert: u32,
    pub update: u32,
}

impl Default for OperationWeights {
    fn default() -> Self {
        Self {
            read: 1,
            insert: 1,
            update: 1,
        }
    }
}

impl OperationWeights {
    pub fn new(read: u32, insert: u32, update: u32) -> Self {
        Self {
            read,
            insert,
            update,
        }
    }

    /// Weights that always select `kind`.
    pub fn only(kind: OperationKind) -> Self {
        let mut weights = Self::new(0, 0, 0);
        match kind {
            OperationKind::Read => weights.read = 1,
            OperationKind::Insert => weights.insert = 1,
            OperationKind::Update => weights.update = 1,
        }
        weights
    }

    pub fn is_zero(&self) -> bool {
        self.read == 0 && self.insert == 0 && self.update == 0
    }

    /// Weights in [`OperationKind::ALL`] order.
    pub fn as_array(&self) -> [u32; 3] {
        [self.read, self.insert, self.update]
    }
}

impl std::fmt::Display for OperationWeights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.read, self.insert, self.update)
    }
}

/// Parses `read:insert:update`, e.g. `1:1:1` or `8:1:1`.
impl FromStr for OperationWeights {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 3 {
            return Err(format!(
                "expected weights as read:insert:update, got '{s}'"
            ));
        }

        let mut values = [0u32; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .trim()
                .parse()
                .map_err(|e| format!("invalid weight '{part}': {e}"))?;
        }

        Ok(Self::new(values[0], values[1], values[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weights() {
        assert_eq!(
            "8:1:1".parse::<OperationWeights>().unwrap(),
            OperationWeights::new(8, 1, 1)
        );
        assert_eq!(
            " 1 : 0 : 0 ".parse::<OperationWeights>().unwrap(),
            OperationWeights::only(OperationKind::Read)
        );
    }

    #[test]
    fn test_parse_weights_rejects_malformed() {
        assert!("1:1".parse::<OperationWeights>().is_err());
        assert!("1:x:1".parse::<OperationWeights>().is_err());
        assert!("1:-1:1".parse::<OperationWeights>().is_err());
    }

    #[test]
    fn test_zero_weights() {
        assert!(OperationWeights::new(0, 0, 0).is_zero());
        assert!(!OperationWeights::default().is_zero());
    }

    #[test]
    fn test_display_round_trip() {
        let weights = OperationWeights::new(3, 2, 1);
        assert_eq!(weights.to_string(), "3:2:1");
    }

    #[test]
    fn test_kind_index_matches_all() {
        for (i, kind) in OperationKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
