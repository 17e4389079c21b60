//! Core data model: action records, patterns, and the frame algebra.

pub mod frame;
pub mod pattern;
pub mod record;
