//! Fixture builders, operation scripts and a reference oracle for tierlist tests.
//!
//! Keeping these in a microcrate avoids copy-paste across the core and property
//! tests.

pub mod oracle;
pub mod proptest;

pub use oracle::{Observed, Op, Oracle, apply};

use tierlist::TieredList;
use tierlist_config::TieredListConfig;
use tierlist_levels::FixedLevels;

/// The six entries from the reference usage, in insertion order.
pub const REFERENCE_ENTRIES: [(i32, &str); 6] = [
    (3, "Three"),
    (6, "Six"),
    (7, "Seven"),
    (9, "Nine"),
    (13, "Thirteen"),
    (15, "Fifteen"),
];

/// Heights giving the reference entries three levels: `3 7 13` on level 1 and
/// `7` on level 2.
pub fn reference_levels() -> FixedLevels {
    FixedLevels::new(vec![1, 0, 2, 0, 1, 0])
}

/// A list with scripted heights and the given config.
pub fn scripted_list<K: Ord, V>(
    config: TieredListConfig,
    script: Vec<usize>,
) -> TieredList<K, V, FixedLevels> {
    TieredList::with_config_and_source(config, FixedLevels::new(script))
        .unwrap_or_else(|err| panic!("fixture config must be valid: {err}"))
}

/// The reference entries loaded with [`reference_levels`].
pub fn reference_list() -> TieredList<i32, &'static str, FixedLevels> {
    let mut list = TieredList::with_config_and_source(TieredListConfig::default(), reference_levels())
        .unwrap_or_else(|err| panic!("default config must be valid: {err}"));
    for (key, value) in REFERENCE_ENTRIES {
        list.insert(key, value);
    }
    list
}

/// Level-0 keys, copied out.
pub fn ground_keys<K: Clone, V, L>(list: &TieredList<K, V, L>) -> Vec<K> {
    list.keys().cloned().collect()
}

/// Per-level keys, copied out.
pub fn level_keys<K: Clone, V, L>(list: &TieredList<K, V, L>) -> Vec<(usize, Vec<K>)> {
    list.display()
        .into_iter()
        .map(|(level, keys)| (level, keys.into_iter().cloned().collect()))
        .collect()
}
