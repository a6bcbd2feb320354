//! Structural invariant checks.

use std::collections::HashSet;

use thiserror::Error;

use crate::node::NodeId;
use crate::{Cursor, TieredList};

/// A broken structural invariant found by [`TieredList::check_invariants`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("keys on level {level} are not strictly increasing")]
    Unordered { level: usize },
    #[error("node on level {level} is not linked on level 0")]
    Detached { level: usize },
    #[error("node on level {level} has no link slot for that level")]
    MissingLink { level: usize },
    #[error("level {level} links {found} nodes but {expected} nodes reach it")]
    Unlinked {
        level: usize,
        expected: usize,
        found: usize,
    },
    #[error("current level is {current} but the highest occupied level is {highest}")]
    StaleLevel { current: usize, highest: usize },
    #[error("level {level} exceeds the cap of {max_level}")]
    AboveCap { level: usize, max_level: usize },
    #[error("list reports {expected} entries but level 0 holds {found}")]
    LengthMismatch { expected: usize, found: usize },
}

impl<K: Ord, V, L> TieredList<K, V, L> {
    /// Verify every structural invariant of the list.
    ///
    /// Level 0 must be strictly increasing and hold exactly `len` nodes. Each
    /// higher level must be strictly increasing, made only of level-0 nodes tall
    /// enough to sit there, and must link every such node. `current_level` must
    /// equal the tallest node's height (0 when empty), stay within the cap, and
    /// match the number of head links.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.current_level > self.max_level {
            return Err(InvariantViolation::AboveCap {
                level: self.current_level,
                max_level: self.max_level,
            });
        }

        let ground = self.walk(0)?;
        if ground.len() != self.len {
            return Err(InvariantViolation::LengthMismatch {
                expected: self.len,
                found: ground.len(),
            });
        }
        let on_ground: HashSet<NodeId> = ground.iter().copied().collect();

        let mut highest = 0;
        for &id in &ground {
            if let Some(node) = self.nodes.get(id) {
                highest = highest.max(node.height());
            }
        }
        if highest > self.max_level {
            return Err(InvariantViolation::AboveCap {
                level: highest,
                max_level: self.max_level,
            });
        }
        if highest != self.current_level {
            return Err(InvariantViolation::StaleLevel {
                current: self.current_level,
                highest,
            });
        }

        for level in 1..=self.current_level {
            let linked = self.walk(level)?;
            if linked.iter().any(|id| !on_ground.contains(id)) {
                return Err(InvariantViolation::Detached { level });
            }
            let expected = ground
                .iter()
                .filter_map(|&id| self.nodes.get(id))
                .filter(|node| node.height() >= level)
                .count();
            if linked.len() != expected {
                return Err(InvariantViolation::Unlinked {
                    level,
                    expected,
                    found: linked.len(),
                });
            }
        }

        if self.head.len() != self.current_level + 1 {
            return Err(InvariantViolation::StaleLevel {
                current: self.current_level,
                highest: self.head.len().saturating_sub(1),
            });
        }

        Ok(())
    }

    /// Collect the ids on one level, checking order and link slots on the way.
    fn walk(&self, level: usize) -> Result<Vec<NodeId>, InvariantViolation> {
        let limit = self.nodes.occupied();
        let mut ids = Vec::new();
        let mut prev: Option<&K> = None;
        let mut next = self.link(Cursor::Head, level);

        while let Some(id) = next {
            let node = self
                .nodes
                .get(id)
                .ok_or(InvariantViolation::Detached { level })?;
            if node.height() < level {
                return Err(InvariantViolation::MissingLink { level });
            }
            if let Some(prev) = prev
                && !prev.cmp(&node.key).is_lt()
            {
                return Err(InvariantViolation::Unordered { level });
            }
            ids.push(id);
            if ids.len() > limit {
                return Err(InvariantViolation::LengthMismatch {
                    expected: self.len,
                    found: ids.len(),
                });
            }
            prev = Some(&node.key);
            next = node.next(level);
        }

        Ok(ids)
    }
}
