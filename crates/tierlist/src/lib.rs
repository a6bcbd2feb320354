//! An in-memory ordered map built on a probabilistic tiered list.
//!
//! Every entry lives on level 0; each entry also climbs to a random height drawn
//! from a truncated geometric distribution, so higher levels hold a thinned
//! subset of the keys. Searches start on the highest active level and drop a level
//! whenever the next key would overshoot, giving expected logarithmic search,
//! insert and delete without any rebalancing.
//!
//! ```
//! use tierlist::TieredList;
//!
//! let mut list = TieredList::new();
//! list.insert(7, "Seven");
//! list.insert(3, "Three");
//!
//! assert_eq!(list.search(&7), Some(&"Seven"));
//! assert_eq!(list.search(&10), None);
//!
//! list.delete(&3);
//! assert_eq!(list.keys().copied().collect::<Vec<_>>(), vec![7]);
//! ```
//!
//! Level selection goes through a [`LevelSource`]; pass a [`FixedLevels`] or a
//! seeded [`RandomLevels`] to [`TieredList::with_config_and_source`] for a
//! reproducible shape.

mod check;
mod node;

use std::borrow::Borrow;
use std::fmt;

use log::{debug, trace};

pub use check::InvariantViolation;
pub use tierlist_config::{ConfigError, OnDuplicate, TieredListConfig};
pub use tierlist_levels::{FixedLevels, LevelSource, RandomLevels};

use node::{Arena, Node, NodeId};

/// Position during a descent: the head sentinel or a real node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Head,
    Node(NodeId),
}

/// Ordered map from `K` to `V` backed by a tiered (skip) list.
///
/// The list exclusively owns its nodes. The head sentinel carries no key and has
/// exactly one link per active level `0..=current_level`. It grows when a taller
/// node arrives and shrinks when the tallest level empties, so its size tracks
/// the nodes present rather than `max_level`.
pub struct TieredList<K, V, L = RandomLevels> {
    head: Vec<Option<NodeId>>,
    nodes: Arena<K, V>,
    current_level: usize,
    len: usize,
    max_level: usize,
    level_probability: f64,
    on_duplicate: OnDuplicate,
    levels: L,
}

impl<K: Ord, V> TieredList<K, V, RandomLevels> {
    /// Empty list with a level cap of 16, probability 0.5 and random levels.
    pub fn new() -> Self {
        Self::build(TieredListConfig::default(), RandomLevels::new())
    }

    /// Empty list with the given cap and level probability.
    pub fn construct(max_level: usize, level_probability: f64) -> Result<Self, ConfigError> {
        Self::with_config(
            TieredListConfig::new()
                .with_max_level(max_level)
                .with_level_probability(level_probability),
        )
    }

    pub fn with_config(config: TieredListConfig) -> Result<Self, ConfigError> {
        Self::with_config_and_source(config, RandomLevels::new())
    }
}

impl<K: Ord, V> Default for TieredList<K, V, RandomLevels> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, L> TieredList<K, V, L> {
    fn build(config: TieredListConfig, levels: L) -> Self {
        Self {
            head: vec![None],
            nodes: Arena::new(),
            current_level: 0,
            len: 0,
            max_level: config.max_level,
            level_probability: config.level_probability,
            on_duplicate: config.on_duplicate,
            levels,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Highest level any node currently occupies.
    pub fn current_level(&self) -> usize {
        self.current_level
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    pub fn level_probability(&self) -> f64 {
        self.level_probability
    }

    pub fn on_duplicate(&self) -> OnDuplicate {
        self.on_duplicate
    }

    /// The level source driving node heights.
    pub fn level_source(&self) -> &L {
        &self.levels
    }

    /// Keys in ascending order, read off level 0.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.level(0).map(|(key, _)| key)
    }

    /// Every active level with its keys in ascending order, level 0 first.
    pub fn display(&self) -> Vec<(usize, Vec<&K>)> {
        (0..=self.current_level)
            .map(|level| (level, self.level(level).map(|(key, _)| key).collect()))
            .collect()
    }

    /// Drop every node and return to a single active level.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head.clear();
        self.head.push(None);
        self.current_level = 0;
        self.len = 0;
    }

    fn level(&self, level: usize) -> LevelIter<'_, K, V> {
        LevelIter {
            nodes: &self.nodes,
            next: self.link(Cursor::Head, level),
            level,
        }
    }

    fn link(&self, cursor: Cursor, level: usize) -> Option<NodeId> {
        match cursor {
            Cursor::Head => self.head.get(level).copied().flatten(),
            Cursor::Node(id) => self.nodes.get(id).and_then(|node| node.next(level)),
        }
    }

    fn successor(&self, cursor: Cursor, level: usize) -> Option<(NodeId, &Node<K, V>)> {
        let id = self.link(cursor, level)?;
        self.nodes.get(id).map(|node| (id, node))
    }

    fn set_link(&mut self, cursor: Cursor, level: usize, next: Option<NodeId>) {
        match cursor {
            Cursor::Head => {
                if let Some(link) = self.head.get_mut(level) {
                    *link = next;
                }
            }
            Cursor::Node(id) => {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.set_next(level, next);
                }
            }
        }
    }
}

impl<K: Ord, V, L: LevelSource> TieredList<K, V, L> {
    /// Empty list with the given parameters and level source.
    pub fn with_config_and_source(config: TieredListConfig, levels: L) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, levels))
    }

    /// Draw a height for a new node, never above `max_level`.
    pub fn random_level(&mut self) -> usize {
        self.levels
            .next_level(self.max_level, self.level_probability)
            .min(self.max_level)
    }

    /// Value stored under `key`.
    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let found = self.find(key)?;
        self.nodes.get(found).map(|node| &node.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let found = self.find(key)?;
        self.nodes.get_mut(found).map(|node| &mut node.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Insert `key` with `value`.
    ///
    /// Returns `true` when a new node was linked in. An existing key is left in
    /// place; its value is kept or replaced according to [`OnDuplicate`], and
    /// `false` is returned either way.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let mut update = vec![Cursor::Head; self.current_level + 1];
        let pred = self.descend(&key, Some(update.as_mut_slice()));

        if let Some(existing) = self.link(pred, 0)
            && let Some(node) = self.nodes.get_mut(existing)
            && node.key.cmp(&key).is_eq()
        {
            match self.on_duplicate {
                OnDuplicate::Keep => trace!("duplicate key kept existing value"),
                OnDuplicate::Replace => {
                    node.value = value;
                    trace!("duplicate key replaced value");
                }
            }
            return false;
        }

        let height = self.random_level();
        if height > self.current_level {
            // New levels start empty, so the head precedes the node on each.
            update.resize(height + 1, Cursor::Head);
            self.head.resize(height + 1, None);
            debug!(
                "active level raised from {} to {}",
                self.current_level, height
            );
            self.current_level = height;
        }

        let id = self.nodes.insert(Node::new(key, value, height));
        for (level, &pred) in update.iter().enumerate().take(height + 1) {
            let next = self.link(pred, level);
            self.set_link(Cursor::Node(id), level, next);
            self.set_link(pred, level, Some(id));
        }
        self.len += 1;
        trace!("linked node {} with height {}", id.index(), height);
        true
    }

    /// Remove `key`, returning its value. Absent keys are a no-op.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut update = vec![Cursor::Head; self.current_level + 1];
        let pred = self.descend(key, Some(update.as_mut_slice()));

        let (target, next) = match self.successor(pred, 0) {
            Some((id, node)) if key.cmp(node.key.borrow()).is_eq() => (id, node.forward.clone()),
            _ => return None,
        };

        for (level, &pred) in update.iter().enumerate() {
            if self.link(pred, level) != Some(target) {
                break;
            }
            self.set_link(pred, level, next.get(level).copied().flatten());
        }

        let node = self.nodes.remove(target)?;
        self.len -= 1;
        trace!("released node {} with height {}", target.index(), node.height());

        let before = self.current_level;
        while self.current_level > 0 && self.head[self.current_level].is_none() {
            self.current_level -= 1;
        }
        self.head.truncate(self.current_level + 1);
        if self.current_level != before {
            debug!(
                "active level lowered from {} to {}",
                before, self.current_level
            );
        }

        Some(node.value)
    }

    /// Walk down from the top active level to level 0, stopping each level on
    /// the last node whose key is below `key`. The cursor reached on each level
    /// is recorded in `update` when given. Returns the level-0 predecessor.
    fn descend<Q>(&self, key: &Q, mut update: Option<&mut [Cursor]>) -> Cursor
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = Cursor::Head;
        for level in (0..=self.current_level).rev() {
            while let Some((id, node)) = self.successor(cursor, level) {
                if key.cmp(node.key.borrow()).is_gt() {
                    cursor = Cursor::Node(id);
                } else {
                    break;
                }
            }
            if let Some(update) = update.as_deref_mut() {
                update[level] = cursor;
            }
        }
        cursor
    }

    fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let pred = self.descend(key, None);
        match self.successor(pred, 0) {
            Some((id, node)) if key.cmp(node.key.borrow()).is_eq() => Some(id),
            _ => None,
        }
    }
}

/// Entries of one level in ascending key order.
struct LevelIter<'a, K, V> {
    nodes: &'a Arena<K, V>,
    next: Option<NodeId>,
    level: usize,
}

impl<'a, K, V> Iterator for LevelIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.next?)?;
        self.next = node.next(self.level);
        Some((&node.key, &node.value))
    }
}

impl<K: fmt::Debug, V: fmt::Debug, L> fmt::Debug for TieredList<K, V, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.level(0)).finish()
    }
}

/// One line per active level, e.g. `Level 0: 3 -> 7 -> None`.
impl<K: fmt::Display, V, L> fmt::Display for TieredList<K, V, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in 0..=self.current_level {
            write!(f, "Level {level}: ")?;
            for (key, _) in self.level(level) {
                write!(f, "{key} -> ")?;
            }
            writeln!(f, "None")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted<K: Ord, V>(script: Vec<usize>) -> TieredList<K, V, FixedLevels> {
        TieredList::with_config_and_source(TieredListConfig::default(), FixedLevels::new(script))
            .unwrap()
    }

    fn reference_list() -> TieredList<i32, &'static str, FixedLevels> {
        let mut list = scripted(vec![1, 0, 2, 0, 1, 0]);
        list.insert(3, "Three");
        list.insert(6, "Six");
        list.insert(7, "Seven");
        list.insert(9, "Nine");
        list.insert(13, "Thirteen");
        list.insert(15, "Fifteen");
        list
    }

    fn level_keys<L>(list: &TieredList<i32, &str, L>) -> Vec<(usize, Vec<i32>)> {
        list.display()
            .into_iter()
            .map(|(level, keys)| (level, keys.into_iter().copied().collect()))
            .collect()
    }

    #[test]
    fn new_list_is_empty() {
        let list: TieredList<i32, String> = TieredList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.current_level(), 0);
        assert_eq!(list.max_level(), 16);
        assert_eq!(list.level_probability(), 0.5);
        assert_eq!(list.display(), vec![(0, vec![])]);
    }

    #[test]
    fn construct_rejects_bad_parameters() {
        assert_eq!(
            TieredList::<i32, ()>::construct(0, 0.5).unwrap_err(),
            ConfigError::InvalidMaxLevel(0)
        );
        assert!(matches!(
            TieredList::<i32, ()>::construct(4, 1.0),
            Err(ConfigError::InvalidProbability(_))
        ));
        assert!(TieredList::<i32, ()>::construct(4, 0.25).is_ok());
    }

    #[test]
    fn construct_accepts_large_cap() {
        let list = TieredList::<i32, ()>::construct(100, 0.5).unwrap();
        assert_eq!(list.max_level(), 100);
        assert_eq!(list.current_level(), 0);
        assert_eq!(list.check_invariants(), Ok(()));
    }

    #[test]
    fn tall_node_links_every_level() {
        let config = TieredListConfig::new().with_max_level(100);
        let mut list =
            TieredList::with_config_and_source(config, FixedLevels::new(vec![0, 100, 0])).unwrap();
        list.insert(5, "five");
        list.insert(10, "ten");
        list.insert(20, "twenty");
        assert_eq!(list.current_level(), 100);
        assert_eq!(list.head.len(), 101);
        assert_eq!(list.check_invariants(), Ok(()));

        let levels = level_keys(&list);
        assert_eq!(levels.len(), 101);
        assert_eq!(levels[0], (0, vec![5, 10, 20]));
        assert!(levels[1..].iter().all(|(_, keys)| keys == &vec![10]));
        assert_eq!(list.search(&10), Some(&"ten"));
        assert_eq!(list.search(&20), Some(&"twenty"));

        assert_eq!(list.delete(&10), Some("ten"));
        assert_eq!(list.current_level(), 0);
        assert_eq!(list.head.len(), 1);
        assert_eq!(level_keys(&list), vec![(0, vec![5, 20])]);
        assert_eq!(list.check_invariants(), Ok(()));
    }

    #[test]
    fn reference_scenario() {
        let mut list = reference_list();

        assert_eq!(list.search(&7), Some(&"Seven"));
        assert_eq!(list.search(&10), None);

        assert_eq!(list.delete(&6), Some("Six"));
        assert_eq!(list.search(&6), None);
        assert_eq!(list.search(&7), Some(&"Seven"));
        assert_eq!(
            list.keys().copied().collect::<Vec<_>>(),
            vec![3, 7, 9, 13, 15]
        );
        assert_eq!(list.check_invariants(), Ok(()));
    }

    #[test]
    fn scripted_shape_per_level() {
        let list = reference_list();
        assert_eq!(list.current_level(), 2);
        assert_eq!(
            level_keys(&list),
            vec![
                (0, vec![3, 6, 7, 9, 13, 15]),
                (1, vec![3, 7, 13]),
                (2, vec![7]),
            ]
        );
    }

    #[test]
    fn display_renders_each_level() {
        let list = reference_list();
        insta::assert_snapshot!(list.to_string(), @r"
        Level 0: 3 -> 6 -> 7 -> 9 -> 13 -> 15 -> None
        Level 1: 3 -> 7 -> 13 -> None
        Level 2: 7 -> None
        ");
    }

    #[test]
    fn deleting_tallest_node_lowers_level() {
        let mut list = reference_list();
        assert_eq!(list.delete(&7), Some("Seven"));
        assert_eq!(list.current_level(), 1);
        assert_eq!(
            level_keys(&list),
            vec![(0, vec![3, 6, 9, 13, 15]), (1, vec![3, 13])]
        );

        list.delete(&3);
        list.delete(&13);
        assert_eq!(list.current_level(), 0);
        assert_eq!(list.check_invariants(), Ok(()));
    }

    #[test]
    fn delete_absent_key_is_noop() {
        let mut list = reference_list();
        let before = level_keys(&list);
        assert_eq!(list.delete(&10), None);
        assert_eq!(list.delete(&100), None);
        assert_eq!(list.delete(&-1), None);
        assert_eq!(level_keys(&list), before);
        assert_eq!(list.len(), 6);
    }

    #[test]
    fn delete_twice_is_idempotent() {
        let mut list = reference_list();
        assert_eq!(list.delete(&9), Some("Nine"));
        assert_eq!(list.delete(&9), None);
        assert_eq!(list.len(), 5);
        assert_eq!(list.check_invariants(), Ok(()));
    }

    #[test]
    fn duplicate_insert_keeps_value_by_default() {
        let mut list = reference_list();
        assert!(!list.insert(7, "Sieben"));
        assert_eq!(list.search(&7), Some(&"Seven"));
        assert_eq!(list.len(), 6);
        // No level was drawn for the rejected insert.
        assert_eq!(list.level_source().drawn(), 6);
    }

    #[test]
    fn duplicate_insert_replaces_when_configured() {
        let config = TieredListConfig::new().with_on_duplicate(OnDuplicate::Replace);
        let mut list = TieredList::with_config_and_source(config, FixedLevels::new(vec![1, 0]))
            .unwrap();
        assert!(list.insert(1, "one"));
        assert!(!list.insert(1, "uno"));
        assert_eq!(list.search(&1), Some(&"uno"));
        assert_eq!(list.len(), 1);
        assert_eq!(list.current_level(), 1);
    }

    #[test]
    fn levels_are_capped() {
        let config = TieredListConfig::new().with_max_level(2);
        let mut list = TieredList::with_config_and_source(config, FixedLevels::constant(9)).unwrap();
        assert_eq!(list.random_level(), 2);
        list.insert("a", 1);
        assert_eq!(list.current_level(), 2);
        assert_eq!(list.check_invariants(), Ok(()));
    }

    #[test]
    fn level_jump_links_through_head() {
        let mut list = scripted(vec![0, 0, 3]);
        list.insert(10, "ten");
        list.insert(20, "twenty");
        list.insert(15, "fifteen");
        assert_eq!(
            level_keys(&list),
            vec![
                (0, vec![10, 15, 20]),
                (1, vec![15]),
                (2, vec![15]),
                (3, vec![15]),
            ]
        );
    }

    #[test]
    fn get_mut_and_contains_key() {
        let mut list = reference_list();
        if let Some(value) = list.get_mut(&9) {
            *value = "nine";
        }
        assert_eq!(list.search(&9), Some(&"nine"));
        assert!(list.contains_key(&13));
        assert!(!list.contains_key(&14));
        assert!(list.get_mut(&14).is_none());
    }

    #[test]
    fn borrowed_key_lookup() {
        let mut list: TieredList<String, usize, FixedLevels> = scripted(vec![0, 1]);
        list.insert("beta".to_string(), 2);
        list.insert("alpha".to_string(), 1);
        assert_eq!(list.search("alpha"), Some(&1));
        assert_eq!(list.delete("beta"), Some(2));
        assert!(!list.contains_key("beta"));
    }

    #[test]
    fn clear_resets_everything() {
        let mut list = reference_list();
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.current_level(), 0);
        assert_eq!(list.search(&7), None);
        assert_eq!(list.check_invariants(), Ok(()));

        list.insert(1, "one");
        assert_eq!(list.search(&1), Some(&"one"));
    }

    #[test]
    fn deleted_slots_are_reused() {
        let mut list = scripted(vec![0]);
        list.insert(1, "one");
        list.insert(2, "two");
        list.delete(&1);
        list.insert(0, "zero");
        assert_eq!(list.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(list.nodes.occupied(), 2);
    }

    #[test]
    fn debug_prints_entries_in_order() {
        let mut list = scripted(vec![0, 2, 1]);
        list.insert(3, 'c');
        list.insert(1, 'a');
        list.insert(2, 'b');
        assert_eq!(format!("{list:?}"), "{1: 'a', 2: 'b', 3: 'c'}");
    }

    #[test]
    fn random_levels_keep_invariants() {
        let config = TieredListConfig::new().with_max_level(8);
        let mut list = TieredList::with_config_and_source(config, RandomLevels::seeded(11)).unwrap();
        for key in (0..500).rev() {
            list.insert(key, key * 2);
        }
        assert_eq!(list.check_invariants(), Ok(()));
        assert!(list.current_level() <= 8);
        for key in (0..500).step_by(3) {
            assert_eq!(list.delete(&key), Some(key * 2));
        }
        assert_eq!(list.check_invariants(), Ok(()));
        assert_eq!(list.search(&1), Some(&2));
        assert_eq!(list.search(&3), None);
    }
}
