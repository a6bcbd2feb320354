//! Proptest strategies shared by the tierlist crates.

use proptest::prelude::*;
use tierlist_config::{OnDuplicate, TieredListConfig};

use crate::oracle::Op;

// ============================================================================
// Base Strategies
// ============================================================================

/// Keys from a narrow range so inserts, deletes and searches collide often
pub fn strategy_key() -> impl Strategy<Value = i32> {
    -64i32..64
}

pub fn strategy_value() -> impl Strategy<Value = u32> {
    any::<u32>()
}

pub fn strategy_on_duplicate() -> impl Strategy<Value = OnDuplicate> {
    prop_oneof![Just(OnDuplicate::Keep), Just(OnDuplicate::Replace)]
}

/// Valid configs with small caps so tall nodes show up
pub fn strategy_config() -> impl Strategy<Value = TieredListConfig> {
    (1usize..=12, 0.05f64..0.95, strategy_on_duplicate()).prop_map(
        |(max_level, level_probability, on_duplicate)| TieredListConfig {
            max_level,
            level_probability,
            on_duplicate,
        },
    )
}

/// Level scripts that sometimes overshoot the cap of `max_level`
pub fn strategy_levels(max_level: usize) -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(0..=max_level + 2, 1..32)
}

// ============================================================================
// Workload Strategies
// ============================================================================

pub fn strategy_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (strategy_key(), strategy_value()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => strategy_key().prop_map(Op::Delete),
        2 => strategy_key().prop_map(Op::Search),
    ]
}

pub fn strategy_ops(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(strategy_op(), len)
}
