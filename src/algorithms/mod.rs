//! Implementation of search algorithms.
//!
//! These algorithms can do path-finding on generic search problems.

pub mod strategy;
pub mod tree_search;
