//! Proptest strategies for tierlist property-based testing.

pub mod strategies;

pub use strategies::{
    strategy_config, strategy_key, strategy_levels, strategy_on_duplicate, strategy_op,
    strategy_ops, strategy_value,
};
