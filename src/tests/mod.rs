//! Crate-internal test suites for Mauka Tables.
//!
//! Per-file unit tests live next to the code they cover. The suites here exercise
//! behaviour that spans modules:
//! - configuration loading and validation
//! - error types and reporting
//! - index/ordering consistency and eviction order across every container, driven by
//!   proptest
//! - concurrent access to the LRU cache
//! - open-addressed resize, shrink and rehash correctness

pub mod config_tests;
pub mod consistency_tests;
pub mod error_tests;

pub use test_utils::{
    create_test_dir, deque_op_strategy, op_sequence_over, op_sequence_strategy, DequeOp, TableOp,
    TestFixture,
};
