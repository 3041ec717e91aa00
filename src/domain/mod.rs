//! Contract model and the pure matching logic built on top of it.

pub mod compare;
pub mod contract;
pub mod matching;
pub mod matrix;
