//! Core vector data structures (vector, distance).

pub mod distance;
pub mod vector;
