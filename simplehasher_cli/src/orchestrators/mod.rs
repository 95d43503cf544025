//! Command orchestrators
//!
//! Each orchestrator wires discovery, the core scheduler, progress rendering
//! and output together for one subcommand and reports overall success.

pub mod check;
pub mod hash;

pub use check::{CheckOptions, run_check};
pub use hash::{HashOptions, run_hash};

use crate::progress::render_progress;
use colored::*;
use simplehasher_core::progress::{ChannelProvider, NullProvider, ProgressProvider};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancel `token` when the user presses Ctrl-C.
///
/// The listener ends on its own once the token is cancelled; callers abort
/// it after the batch returns.
pub(crate) fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => {
                    eprintln!("\n{}", "Interrupted, finishing running tasks...".yellow());
                    token.cancel();
                }
                Err(e) => log::warn!("Failed to listen for Ctrl-C: {e}"),
            },
            _ = token.cancelled() => {}
        }
    })
}

/// Provider handed to the scheduler plus the renderer draining it
pub(crate) struct ProgressSink {
    pub provider: Arc<dyn ProgressProvider>,
    renderer: Option<JoinHandle<()>>,
}

impl ProgressSink {
    /// Render bars when `show` is set, otherwise discard every update
    pub fn new(show: bool, total_bytes: u64) -> Self {
        if !show {
            return Self {
                provider: Arc::new(NullProvider),
                renderer: None,
            };
        }

        let (provider, rx) = ChannelProvider::new();
        Self {
            provider: Arc::new(provider),
            renderer: Some(tokio::spawn(render_progress(rx, total_bytes))),
        }
    }

    /// Wait until the renderer has drawn the final state.
    ///
    /// The scheduler completes the provider when the batch ends, which
    /// closes the channel and lets the renderer return.
    pub async fn finish(self) {
        drop(self.provider);
        if let Some(handle) = self.renderer
            && let Err(e) = handle.await
        {
            log::debug!("Progress renderer stopped abnormally: {e}");
        }
    }
}
