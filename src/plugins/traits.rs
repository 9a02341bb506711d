//! plugins::traits
//!
//! Plugin contracts.
//!
//! # Design
//!
//! Every plugin implements [`Plugin`]. A plugin that can prove domain control
//! also implements [`Authenticator`]; one that can configure a server also
//! implements [`Installer`]. Capability is verified, not assumed: the
//! registry asks each plugin to up-cast itself through
//! [`Plugin::as_authenticator`] / [`Plugin::as_installer`], and a plugin that
//! answers `None` is not treated as having that capability regardless of
//! what its name suggests.
//!
//! Plugins are shared through `Rc` because one object can serve as both
//! authenticator and installer in a single run. Methods take `&self`;
//! implementations that keep state use interior mutability.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use certward::plugins::mock::MockPlugin;
//! use certward::plugins::Plugin;
//!
//! let plugin: Rc<dyn Plugin> = Rc::new(MockPlugin::authenticator("mock"));
//! assert!(plugin.clone().as_authenticator().is_some());
//! assert!(plugin.as_installer().is_none());
//! ```

use std::path::Path;
use std::rc::Rc;

use thiserror::Error;

use crate::acme::{Challenge, ChallengeKind, ChallengeResponse};
use crate::ui::DisplayError;

/// Errors raised by plugins.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin's own configuration is wrong (e.g. missing server binary).
    #[error("plugin misconfigured: {0}")]
    Misconfiguration(String),

    /// The plugin cannot work on this system or with this request.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// The plugin tried and failed.
    #[error("{0}")]
    Failed(String),

    /// Talking to the operator failed.
    #[error(transparent)]
    Display(#[from] DisplayError),
}

/// Server configuration enhancements an installer may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Enhancement {
    /// Redirect plain HTTP to HTTPS
    Redirect,
    /// Send Strict-Transport-Security
    Hsts,
    /// Staple OCSP responses
    OcspStapling,
}

impl Enhancement {
    pub fn name(&self) -> &'static str {
        match self {
            Enhancement::Redirect => "redirect",
            Enhancement::Hsts => "hsts",
            Enhancement::OcspStapling => "staple-ocsp",
        }
    }
}

impl std::fmt::Display for Enhancement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Base contract every plugin satisfies.
pub trait Plugin {
    /// One-line description shown in menus.
    fn description(&self) -> &str;

    /// Longer human-readable details.
    fn more_info(&self) -> String {
        self.description().to_string()
    }

    /// Check prerequisites and get ready to work.
    fn prepare(&self) -> Result<(), PluginError>;

    /// Hidden plugins stay out of menus and implicit choices but can be
    /// named explicitly.
    fn hidden(&self) -> bool {
        false
    }

    /// View this plugin as an authenticator, if it is one.
    fn as_authenticator(self: Rc<Self>) -> Option<Rc<dyn Authenticator>> {
        None
    }

    /// View this plugin as an installer, if it is one.
    fn as_installer(self: Rc<Self>) -> Option<Rc<dyn Installer>> {
        None
    }
}

/// A plugin that proves control of domains.
pub trait Authenticator: Plugin {
    /// Challenge kinds this authenticator can answer for `domain`, best
    /// first.
    fn challenge_preferences(&self, domain: &str) -> Vec<ChallengeKind>;

    /// Put responses in place. Returns one response per challenge, in
    /// order.
    fn perform(&self, challenges: &[Challenge]) -> Result<Vec<ChallengeResponse>, PluginError>;

    /// Remove whatever `perform` put in place.
    fn cleanup(&self, challenges: &[Challenge]) -> Result<(), PluginError>;
}

/// Certificate paths handed to an installer.
#[derive(Debug, Clone, Copy)]
pub struct CertPaths<'a> {
    pub cert: &'a Path,
    pub key: &'a Path,
    pub chain: Option<&'a Path>,
    pub fullchain: Option<&'a Path>,
}

/// A plugin that configures a server to use certificates.
pub trait Installer: Plugin {
    /// Every name the server is configured for.
    fn get_all_names(&self) -> Result<Vec<String>, PluginError>;

    /// Point the server block for `domain` at the certificate.
    fn deploy_cert(&self, domain: &str, paths: CertPaths<'_>) -> Result<(), PluginError>;

    /// Apply an enhancement to the configuration for `domain`.
    fn enhance(
        &self,
        domain: &str,
        enhancement: Enhancement,
        options: Option<&str>,
    ) -> Result<(), PluginError>;

    fn supported_enhancements(&self) -> Vec<Enhancement>;

    /// Persist pending changes as a checkpoint.
    fn save(&self, title: Option<&str>, temporary: bool) -> Result<(), PluginError>;

    /// Revert the last `rollback` checkpoints.
    fn rollback_checkpoints(&self, rollback: usize) -> Result<(), PluginError>;

    /// Undo unsaved changes after a failed deployment.
    fn recovery_routine(&self) -> Result<(), PluginError>;

    /// Check the configuration parses.
    fn config_test(&self) -> Result<(), PluginError>;

    /// Reload the server.
    fn restart(&self) -> Result<(), PluginError>;
}
