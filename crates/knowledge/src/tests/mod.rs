//! Cross-module tests: ranking over realistic indexes and the
//! learn/search/stats/clean pipeline on a temporary workspace.

mod pipeline;
