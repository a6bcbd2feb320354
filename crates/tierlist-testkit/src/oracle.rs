//! A `BTreeMap` model of the list for differential tests.

use std::collections::BTreeMap;

use tierlist::TieredList;
use tierlist_config::OnDuplicate;
use tierlist_levels::LevelSource;

/// One step of a generated workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op<K = i32, V = u32> {
    Insert(K, V),
    Delete(K),
    Search(K),
}

/// What an operation reported back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed<V> {
    Inserted(bool),
    Deleted(Option<V>),
    Found(Option<V>),
}

/// Reference model applying the same duplicate policy as the list.
#[derive(Debug, Clone)]
pub struct Oracle<K, V> {
    map: BTreeMap<K, V>,
    on_duplicate: OnDuplicate,
}

impl<K: Ord + Clone, V: Clone> Oracle<K, V> {
    pub fn new(on_duplicate: OnDuplicate) -> Self {
        Self {
            map: BTreeMap::new(),
            on_duplicate,
        }
    }

    pub fn apply(&mut self, op: &Op<K, V>) -> Observed<V> {
        match op {
            Op::Insert(key, value) => {
                if let Some(existing) = self.map.get_mut(key) {
                    if self.on_duplicate == OnDuplicate::Replace {
                        *existing = value.clone();
                    }
                    Observed::Inserted(false)
                } else {
                    self.map.insert(key.clone(), value.clone());
                    Observed::Inserted(true)
                }
            }
            Op::Delete(key) => Observed::Deleted(self.map.remove(key)),
            Op::Search(key) => Observed::Found(self.map.get(key).cloned()),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    pub fn keys(&self) -> Vec<K> {
        self.map.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Run one operation against a list and report what it returned.
pub fn apply<K, V, L>(list: &mut TieredList<K, V, L>, op: &Op<K, V>) -> Observed<V>
where
    K: Ord + Clone,
    V: Clone,
    L: LevelSource,
{
    match op {
        Op::Insert(key, value) => Observed::Inserted(list.insert(key.clone(), value.clone())),
        Op::Delete(key) => Observed::Deleted(list.delete(key)),
        Op::Search(key) => Observed::Found(list.search(key).cloned()),
    }
}
