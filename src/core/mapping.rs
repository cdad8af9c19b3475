// special-case override table: alpha path <-> numeric path
use std::collections::HashMap;

use crate::core::error::IntegrityViolation;
use crate::core::types::{AlphaPath, NumericPath};

/// Explicit numeric triples for paths whose codes must not come from the
/// generic table lookup (regression pins such as `S.POP.HPM -> 2.001.007`).
///
/// Indexed both ways so forward and reverse conversions are O(1).
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    //insertion order, used for reports
    entries: Vec<(AlphaPath, NumericPath)>,
    //keyed by AlphaPath::key()
    forward: HashMap<AlphaPath, usize>,
    reverse: HashMap<NumericPath, usize>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    //1. each alpha path has at most one override (identical re-insert is a no-op)
    //2. two different alpha paths may not claim the same numeric path
    pub fn insert(&mut self, path: AlphaPath, numeric: NumericPath) -> Result<(), IntegrityViolation> {
        let key = path.key();

        match self.forward.get(&key).copied() {
            None => {}
            Some(idx) if self.entries[idx].1 == numeric => return Ok(()),
            Some(idx) => {
                return Err(IntegrityViolation::OverrideConflict {
                    path: key.to_string(),
                    existing: self.entries[idx].1.to_string(),
                    requested: numeric.to_string(),
                });
            }
        }

        if let Some(&idx) = self.reverse.get(&numeric) {
            return Err(IntegrityViolation::OverrideCollision {
                numeric: numeric.to_string(),
                first: self.entries[idx].0.to_string(),
                second: path.to_string(),
            });
        }

        let idx = self.entries.len();
        self.entries.push((path, numeric));
        self.forward.insert(key, idx);
        self.reverse.insert(numeric, idx);
        Ok(())
    }

    pub fn numeric_for(&self, path: &AlphaPath) -> Option<NumericPath> {
        self.forward.get(&path.key()).map(|&idx| self.entries[idx].1)
    }

    pub fn path_for(&self, numeric: NumericPath) -> Option<&AlphaPath> {
        self.reverse.get(&numeric).map(|&idx| &self.entries[idx].0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AlphaPath, NumericPath)> + '_ {
        self.entries.iter().map(|(p, n)| (p, *n))
    }
}
