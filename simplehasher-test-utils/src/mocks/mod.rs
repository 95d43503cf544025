//! Progress provider implementations for testing

mod progress;

pub use progress::{CancellingProvider, RecordingProvider};
