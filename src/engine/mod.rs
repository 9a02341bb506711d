//! engine
//!
//! Orchestrates the certificate lifecycle:
//! Init -> SelectPlugins -> CollectDomains -> ValidateKey -> Register ->
//! Acquire -> Deploy -> Enhance.
//!
//! # Architecture
//!
//! The engine is the central coordinator for a certward run. Each stage is a
//! small function returning an [`Outcome`]; the [`workflow`] chains them and
//! stops at the first stage that does not proceed.
//!
//! 1. **Init**: resolve the local account ([`account`])
//! 2. **SelectPlugins**: choose authenticator and installer ([`select`])
//! 3. **CollectDomains**: decide which names to certify ([`domains`])
//! 4. **ValidateKey**: check the account key before using it
//! 5. **Register**: register the account if it never was
//! 6. **Acquire**: prove control and obtain the certificate
//! 7. **Deploy**: install the certificate (installer only)
//! 8. **Enhance**: apply hardening such as redirects (installer only)
//!
//! # Invariants
//!
//! - Nothing is deployed or enhanced without an installer
//! - Nothing is acquired without an authenticator and at least one domain
//! - Quiet stops and fatal stops are outcomes; unexpected failures are errors
//!
//! # Example
//!
//! ```no_run
//! use std::rc::Rc;
//! use certward::acme::create_authority;
//! use certward::core::account::FileAccountStore;
//! use certward::core::config::{Config, ConfigFile};
//! use certward::core::paths::StoragePaths;
//! use certward::engine::{workflow, Collaborators, Context};
//! use certward::plugins::{builtin_entry_points, discover, Capability};
//! use certward::ui::FileDisplay;
//!
//! let config = Config::load(None, ConfigFile::default()).unwrap();
//! let ctx = Context::new(config, Rc::new(FileDisplay::stdio().unwrap()));
//! let registry = discover(&ctx, builtin_entry_points(), Capability::Authenticator);
//! let accounts = FileAccountStore::new(StoragePaths::from_config(ctx.config()));
//! let authority = create_authority(ctx.config().server()).unwrap();
//!
//! let report = workflow::run(&ctx, &Collaborators {
//!     registry: &registry,
//!     accounts: &accounts,
//!     authority: authority.as_ref(),
//! }).unwrap();
//! std::process::exit(report.exit_code().into());
//! ```

pub mod account;
pub mod domains;
pub mod outcome;
pub mod select;
pub mod workflow;

use std::rc::Rc;

use thiserror::Error;

use crate::acme::ClientError;
use crate::core::account::AccountError;
use crate::core::config::Config;
use crate::plugins::PluginError;
use crate::ui::{Display, DisplayError};

pub use outcome::{FatalError, Outcome, StopReason};
pub use workflow::{Collaborators, RunReport, Stage};

/// What every stage and plugin needs from the run: the resolved
/// configuration and the operator display.
///
/// Built once in `cli::run` and passed down explicitly.
#[derive(Clone)]
pub struct Context {
    config: Rc<Config>,
    display: Rc<dyn Display>,
}

impl Context {
    pub fn new(config: Config, display: Rc<dyn Display>) -> Self {
        Self {
            config: Rc::new(config),
            display,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn display(&self) -> &dyn Display {
        self.display.as_ref()
    }

    /// The display handle, for plugins that keep it.
    pub fn shared_display(&self) -> Rc<dyn Display> {
        Rc::clone(&self.display)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Failures the engine does not know how to turn into an outcome.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;
    use std::rc::Rc;

    use super::Context;
    use crate::core::config::{Config, ConfigFile, DirsConfig};
    use crate::ui::scripted::{Reply, ScriptedDisplay};

    /// Flags placing every directory under `root`.
    pub fn flags_in(root: &Path) -> ConfigFile {
        ConfigFile {
            server: Some("mock://ca".to_string()),
            dirs: Some(DirsConfig {
                config_dir: Some(root.join("etc")),
                work_dir: Some(root.join("work")),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn context_with(flags: ConfigFile, replies: Vec<Reply>) -> (Context, Rc<ScriptedDisplay>) {
        let config = Config::resolve(ConfigFile::default(), flags).expect("valid test config");
        let display = Rc::new(ScriptedDisplay::new(replies));
        (Context::new(config, display.clone()), display)
    }

    /// Context rooted at `root` answering from `replies`.
    pub fn context_in(root: &Path, replies: Vec<Reply>) -> (Context, Rc<ScriptedDisplay>) {
        context_with(flags_in(root), replies)
    }

    /// Context with default configuration and no scripted replies.
    pub fn test_context() -> (Context, Rc<ScriptedDisplay>) {
        context_with(ConfigFile::default(), Vec::new())
    }
}
