//! Progress reporting module for the CLI
//!
//! Turns the core's `ProgressUpdate` stream into `indicatif` bars on stderr.

pub mod renderer;
pub mod utils;

pub use renderer::render_progress;
