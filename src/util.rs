//! Utility helpers.

pub mod id;
