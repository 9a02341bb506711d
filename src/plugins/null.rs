//! plugins::null
//!
//! An installer that changes nothing.
//!
//! Hidden from menus. Useful for rolling back or viewing state without a
//! real server, and as the last resort installer when an operator only
//! wants the certificate files.

use std::rc::Rc;

use tracing::debug;

use super::traits::{CertPaths, Enhancement, Installer, Plugin, PluginError};
use crate::engine::Context;

pub const NAME: &str = "null";

/// No-op installer.
#[derive(Debug, Default)]
pub struct NullInstaller;

pub fn construct(_ctx: &Context) -> Result<Rc<dyn Plugin>, PluginError> {
    Ok(Rc::new(NullInstaller))
}

impl Plugin for NullInstaller {
    fn description(&self) -> &str {
        "Null Installer"
    }

    fn more_info(&self) -> String {
        "Installer that does not touch any server configuration.".to_string()
    }

    fn prepare(&self) -> Result<(), PluginError> {
        Ok(())
    }

    fn hidden(&self) -> bool {
        true
    }

    fn as_installer(self: Rc<Self>) -> Option<Rc<dyn Installer>> {
        Some(self)
    }
}

impl Installer for NullInstaller {
    fn get_all_names(&self) -> Result<Vec<String>, PluginError> {
        Ok(Vec::new())
    }

    fn deploy_cert(&self, domain: &str, paths: CertPaths<'_>) -> Result<(), PluginError> {
        debug!(domain, cert = %paths.cert.display(), "Null installer ignoring deployment");
        Ok(())
    }

    fn enhance(
        &self,
        _domain: &str,
        _enhancement: Enhancement,
        _options: Option<&str>,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    fn supported_enhancements(&self) -> Vec<Enhancement> {
        Vec::new()
    }

    fn save(&self, _title: Option<&str>, _temporary: bool) -> Result<(), PluginError> {
        Ok(())
    }

    fn rollback_checkpoints(&self, _rollback: usize) -> Result<(), PluginError> {
        Ok(())
    }

    fn recovery_routine(&self) -> Result<(), PluginError> {
        Ok(())
    }

    fn config_test(&self) -> Result<(), PluginError> {
        Ok(())
    }

    fn restart(&self) -> Result<(), PluginError> {
        Ok(())
    }
}
