//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each handler:
//! 1. Builds the collaborators its mode needs (plugin registry, account
//!    store, certificate authority)
//! 2. Hands off to the engine or to a single installer operation
//! 3. Reports fatal outcomes on stderr and returns the exit status
//!
//! Handlers do NOT decide workflow policy; that lives in [`crate::engine`].

mod completion;
mod config_changes;
mod obtain;
mod revoke;
mod rollback;

pub use completion::completion;
pub use config_changes::view_config_changes;
pub use obtain::obtain;
pub use revoke::revoke;
pub use rollback::rollback;

use anyhow::Result;
use tracing::error;

use crate::cli::args::Mode;
use crate::engine::{Context, Outcome};

/// Dispatch a mode to its handler.
pub fn dispatch(mode: Mode, ctx: &Context) -> Result<u8> {
    match mode {
        Mode::ViewConfigChanges => view_config_changes(ctx),
        Mode::Revoke => revoke(ctx),
        Mode::Rollback(checkpoints) => rollback(ctx, checkpoints),
        Mode::Obtain => obtain(ctx),
    }
}

/// Exit status for an outcome, reporting fatal stops on stderr.
fn finish<T>(outcome: &Outcome<T>) -> u8 {
    if let Outcome::Fatal(e) = outcome {
        error!(error = %e, "Fatal stop");
        eprintln!("Error: {}", e);
    }
    outcome.exit_code()
}
