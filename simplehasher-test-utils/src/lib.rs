//! Test utilities for SimpleHasher
//!
//! Fixture builders for files with deterministic contents and progress
//! providers that record or react to scheduler events.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::{FixtureDir, pattern_bytes};
pub use mocks::{CancellingProvider, RecordingProvider};
