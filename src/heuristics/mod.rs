//! Heuristics module for route planning.
//!
//! This module exports the construction heuristic and the improvement heuristics.

pub mod construction;
pub mod local_search;

pub use construction::*;
pub use local_search::*;
