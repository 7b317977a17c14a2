//! Containers used by the search engine.

pub mod d_ary_heap;
pub mod frontier;
pub mod sorted_frontier;
