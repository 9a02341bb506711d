//! engine::outcome
//!
//! How a workflow step ends.
//!
//! # Design
//!
//! A step either hands a value to the next step, stops quietly (nothing left
//! to do, or the operator declined), or stops fatally because the
//! configuration or environment is wrong. All three are ordinary results,
//! carried by [`Outcome`]. Failures nobody anticipated travel separately as
//! `Err(EngineError)` and are never turned into an `Outcome`.
//!
//! Exit status follows from the outcome alone: quiet stops exit 0, fatal
//! stops exit 1.
//!
//! # Example
//!
//! ```
//! use certward::engine::outcome::{Outcome, StopReason};
//!
//! let stopped: Outcome<()> = Outcome::QuietStop(StopReason::NoDomains);
//! assert_eq!(stopped.exit_code(), 0);
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Why a run stopped without doing anything wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// No account was chosen or created.
    AccountDeclined,
    /// No authenticator was available or chosen.
    NoAuthenticator,
    /// No installer was available or chosen.
    NoInstaller,
    /// The domain list came back empty.
    NoDomains,
    /// Registration with the certificate authority did not complete.
    RegistrationFailed(String),
    /// The operator declined a confirmation.
    Declined,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::AccountDeclined => write!(f, "no account selected"),
            StopReason::NoAuthenticator => write!(f, "no authenticator selected"),
            StopReason::NoInstaller => write!(f, "no installer selected"),
            StopReason::NoDomains => write!(f, "no domains selected"),
            StopReason::RegistrationFailed(reason) => write!(f, "registration failed: {}", reason),
            StopReason::Declined => write!(f, "declined by operator"),
        }
    }
}

/// Why a run stopped because something is misconfigured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    /// An account could be neither loaded nor created.
    #[error("could not load or create an account for '{email}': {reason}")]
    AccountUnavailable { email: String, reason: String },

    /// The configured authenticator was not discovered.
    #[error("unknown authenticator '{name}' (available: {})", .available.join(", "))]
    UnknownAuthenticator { name: String, available: Vec<String> },

    /// A named plugin lacks a role it was chosen for.
    #[error("plugin '{name}' cannot act as {role}")]
    WrongCapability { name: String, role: String },

    /// The key given with `--authkey` could not be read.
    #[error("cannot use key at '{}': {reason}", .path.display())]
    UnreadableKey { path: PathBuf, reason: String },

    /// The account key does not validate.
    #[error("invalid account key: {0}")]
    InvalidKey(String),
}

/// Result of a workflow step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Continue with this value.
    Proceed(T),
    /// Stop, exit 0.
    QuietStop(StopReason),
    /// Stop, exit 1.
    Fatal(FatalError),
}

impl<T> Outcome<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Proceed(value) => Outcome::Proceed(f(value)),
            Outcome::QuietStop(reason) => Outcome::QuietStop(reason),
            Outcome::Fatal(error) => Outcome::Fatal(error),
        }
    }

    pub fn is_proceed(&self) -> bool {
        matches!(self, Outcome::Proceed(_))
    }

    /// Process exit status for a run ending here.
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Proceed(_) | Outcome::QuietStop(_) => 0,
            Outcome::Fatal(_) => 1,
        }
    }
}

/// Unwrap `Outcome::Proceed`, or return the stop from the enclosing
/// function, which must return `Result<Outcome<_>, _>`.
macro_rules! proceed {
    ($outcome:expr) => {
        match $outcome {
            $crate::engine::outcome::Outcome::Proceed(value) => value,
            $crate::engine::outcome::Outcome::QuietStop(reason) => {
                return Ok($crate::engine::outcome::Outcome::QuietStop(reason))
            }
            $crate::engine::outcome::Outcome::Fatal(error) => {
                return Ok($crate::engine::outcome::Outcome::Fatal(error))
            }
        }
    };
}

pub(crate) use proceed;
