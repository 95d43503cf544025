//! Builders for test inputs

mod fixtures;

pub use fixtures::{FixtureDir, pattern_bytes};
