//! plugins::mock
//!
//! Mock plugin for deterministic testing.
//!
//! # Design
//!
//! `MockPlugin` implements both [`Authenticator`] and [`Installer`] but only
//! up-casts to the roles it was built with, so tests can exercise
//! capability verification with a single type. State lives behind
//! `Rc<RefCell<...>>`; clones share it, which lets a test keep a handle
//! while the registry owns the plugin.
//!
//! # Example
//!
//! ```
//! use certward::plugins::mock::{MockPlugin, PluginOperation};
//! use certward::plugins::{Installer, Plugin};
//!
//! let plugin = MockPlugin::installer("Test installer")
//!     .with_names(vec!["example.com".to_string()]);
//! plugin.prepare().unwrap();
//! assert_eq!(plugin.get_all_names().unwrap(), vec!["example.com"]);
//! assert_eq!(
//!     plugin.operations(),
//!     vec![PluginOperation::Prepare, PluginOperation::GetAllNames]
//! );
//! ```

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use super::capabilities::{Capability, CapabilitySet};
use super::traits::{Authenticator, CertPaths, Enhancement, Installer, Plugin, PluginError};
use crate::acme::{Challenge, ChallengeKind, ChallengeResponse};

/// Mock plugin.
#[derive(Debug, Clone)]
pub struct MockPlugin {
    description: String,
    roles: CapabilitySet,
    hidden: bool,
    inner: Rc<RefCell<MockPluginInner>>,
}

#[derive(Debug, Default)]
struct MockPluginInner {
    names: Vec<String>,
    enhancements: Vec<Enhancement>,
    forge_responses: bool,
    fail_on: Option<FailOn>,
    operations: Vec<PluginOperation>,
}

/// Which operation should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Prepare,
    Perform,
    Cleanup,
    GetAllNames,
    DeployCert,
    Enhance,
    Save,
    RollbackCheckpoints,
    Restart,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginOperation {
    Prepare,
    Perform { domains: Vec<String> },
    Cleanup { domains: Vec<String> },
    GetAllNames,
    DeployCert { domain: String, cert: PathBuf, key: PathBuf },
    Enhance { domain: String, enhancement: Enhancement },
    Save { title: Option<String>, temporary: bool },
    RollbackCheckpoints(usize),
    RecoveryRoutine,
    ConfigTest,
    Restart,
}

impl MockPlugin {
    fn with_roles(description: &str, roles: CapabilitySet) -> Self {
        Self {
            description: description.to_string(),
            roles,
            hidden: false,
            inner: Rc::new(RefCell::new(MockPluginInner::default())),
        }
    }

    /// A plugin that only authenticates.
    pub fn authenticator(description: &str) -> Self {
        Self::with_roles(description, CapabilitySet::with([Capability::Authenticator]))
    }

    /// A plugin that only installs.
    pub fn installer(description: &str) -> Self {
        Self::with_roles(description, CapabilitySet::with([Capability::Installer]))
    }

    /// A plugin that does both.
    pub fn both(description: &str) -> Self {
        Self::with_roles(
            description,
            CapabilitySet::with([Capability::Authenticator, Capability::Installer]),
        )
    }

    /// Keep out of menus and implicit selection.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Names reported by `get_all_names`.
    pub fn with_names(self, names: Vec<String>) -> Self {
        self.inner.borrow_mut().names = names;
        self
    }

    /// Enhancements reported as supported.
    pub fn with_enhancements(self, enhancements: Vec<Enhancement>) -> Self {
        self.inner.borrow_mut().enhancements = enhancements;
        self
    }

    /// Answer challenges with a wrong key authorization.
    pub fn with_forged_responses(self) -> Self {
        self.inner.borrow_mut().forge_responses = true;
        self
    }

    /// Make one operation fail.
    pub fn fail_on(&self, fail_on: FailOn) {
        self.inner.borrow_mut().fail_on = Some(fail_on);
    }

    /// All recorded operations, oldest first.
    pub fn operations(&self) -> Vec<PluginOperation> {
        self.inner.borrow().operations.clone()
    }

    fn record(&self, op: PluginOperation) {
        self.inner.borrow_mut().operations.push(op);
    }

    fn check(&self, op: FailOn) -> Result<(), PluginError> {
        if self.inner.borrow().fail_on == Some(op) {
            return Err(PluginError::Failed(format!("mock failure in {:?}", op)));
        }
        Ok(())
    }
}

fn domains_of(challenges: &[Challenge]) -> Vec<String> {
    challenges.iter().map(|c| c.domain.clone()).collect()
}

impl Plugin for MockPlugin {
    fn description(&self) -> &str {
        &self.description
    }

    fn prepare(&self) -> Result<(), PluginError> {
        self.record(PluginOperation::Prepare);
        self.check(FailOn::Prepare)
    }

    fn hidden(&self) -> bool {
        self.hidden
    }

    fn as_authenticator(self: Rc<Self>) -> Option<Rc<dyn Authenticator>> {
        if self.roles.has(&Capability::Authenticator) {
            Some(self)
        } else {
            None
        }
    }

    fn as_installer(self: Rc<Self>) -> Option<Rc<dyn Installer>> {
        if self.roles.has(&Capability::Installer) {
            Some(self)
        } else {
            None
        }
    }
}

impl Authenticator for MockPlugin {
    fn challenge_preferences(&self, _domain: &str) -> Vec<ChallengeKind> {
        vec![ChallengeKind::Http01, ChallengeKind::Dns01]
    }

    fn perform(&self, challenges: &[Challenge]) -> Result<Vec<ChallengeResponse>, PluginError> {
        self.record(PluginOperation::Perform {
            domains: domains_of(challenges),
        });
        self.check(FailOn::Perform)?;

        let forge = self.inner.borrow().forge_responses;
        Ok(challenges
            .iter()
            .map(|c| {
                let mut response = ChallengeResponse::for_challenge(c);
                if forge {
                    response.key_authorization = format!("{}.forged", c.token);
                }
                response
            })
            .collect())
    }

    fn cleanup(&self, challenges: &[Challenge]) -> Result<(), PluginError> {
        self.record(PluginOperation::Cleanup {
            domains: domains_of(challenges),
        });
        self.check(FailOn::Cleanup)
    }
}

impl Installer for MockPlugin {
    fn get_all_names(&self) -> Result<Vec<String>, PluginError> {
        self.record(PluginOperation::GetAllNames);
        self.check(FailOn::GetAllNames)?;
        Ok(self.inner.borrow().names.clone())
    }

    fn deploy_cert(&self, domain: &str, paths: CertPaths<'_>) -> Result<(), PluginError> {
        self.record(PluginOperation::DeployCert {
            domain: domain.to_string(),
            cert: paths.cert.to_path_buf(),
            key: paths.key.to_path_buf(),
        });
        self.check(FailOn::DeployCert)
    }

    fn enhance(
        &self,
        domain: &str,
        enhancement: Enhancement,
        _options: Option<&str>,
    ) -> Result<(), PluginError> {
        self.record(PluginOperation::Enhance {
            domain: domain.to_string(),
            enhancement,
        });
        self.check(FailOn::Enhance)
    }

    fn supported_enhancements(&self) -> Vec<Enhancement> {
        self.inner.borrow().enhancements.clone()
    }

    fn save(&self, title: Option<&str>, temporary: bool) -> Result<(), PluginError> {
        self.record(PluginOperation::Save {
            title: title.map(str::to_string),
            temporary,
        });
        self.check(FailOn::Save)
    }

    fn rollback_checkpoints(&self, rollback: usize) -> Result<(), PluginError> {
        self.record(PluginOperation::RollbackCheckpoints(rollback));
        self.check(FailOn::RollbackCheckpoints)
    }

    fn recovery_routine(&self) -> Result<(), PluginError> {
        self.record(PluginOperation::RecoveryRoutine);
        Ok(())
    }

    fn config_test(&self) -> Result<(), PluginError> {
        self.record(PluginOperation::ConfigTest);
        Ok(())
    }

    fn restart(&self) -> Result<(), PluginError> {
        self.record(PluginOperation::Restart);
        self.check(FailOn::Restart)
    }
}
