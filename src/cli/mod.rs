//! cli
//!
//! Command-line interface layer for certward.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and set up logging
//! - Refuse to run without root, after `--help`, `--version` and
//!   `--completions` have had their chance
//! - Resolve configuration, build the [`Context`] and dispatch to a handler
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers in [`commands`] wire collaborators
//! together and hand off to the [`crate::engine`]; the exit status they
//! return is the process exit status.

pub mod args;
pub mod commands;

pub use args::{Cli, Mode, Shell};

use std::rc::Rc;

use anyhow::{Context as _, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::engine::Context;
use crate::ui::{Display, FileDisplay, NoninteractiveDisplay};

/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "CERTWARD_LOG";

/// Run the CLI application and return the process exit status.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<u8> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    if let Some(shell) = cli.completions {
        commands::completion(shell)?;
        return Ok(0);
    }

    if !is_root() {
        eprintln!("Root is required to run certward. Please use sudo.");
        return Ok(1);
    }

    let config = Config::load(cli.config.as_deref(), cli.to_overlay())
        .context("failed to load configuration")?;
    debug!(source = ?config.loaded_from(), server = config.server(), "Configuration loaded");

    let display: Rc<dyn Display> = if cli.non_interactive {
        Rc::new(NoninteractiveDisplay::stdout())
    } else {
        Rc::new(FileDisplay::stdio().context("failed to open standard input")?)
    };
    let ctx = Context::new(config, display);

    commands::dispatch(cli.mode(), &ctx)
}

/// Install the stderr log subscriber.
///
/// `CERTWARD_LOG` takes precedence over `--debug`.
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // A second call (e.g. from a test harness) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}
