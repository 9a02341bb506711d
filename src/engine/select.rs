//! engine::select
//!
//! Plugin selection.
//!
//! An explicitly configured name always wins and must exist. Otherwise a
//! sole visible candidate is taken without asking, and anything else goes to
//! a menu. The chosen authenticator doubles as installer when it verified as
//! one; no separate installer is picked for the certificate workflow.

use std::rc::Rc;

use tracing::debug;

use super::outcome::{FatalError, Outcome, StopReason};
use super::{Context, EngineError};
use crate::plugins::{Authenticator, Installer, PluginDescriptor, PluginRegistry};
use crate::ui::{ops, Display, DisplayError};

/// Plugins chosen for a run.
#[derive(Clone)]
pub struct Selection {
    pub name: String,
    pub authenticator: Rc<dyn Authenticator>,
    /// The same object as `authenticator`, when it can also install.
    pub installer: Option<Rc<dyn Installer>>,
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("name", &self.name)
            .field("installer", &self.installer.is_some())
            .finish()
    }
}

/// Choose the authenticator (and installer) for this run.
pub fn select(ctx: &Context, registry: &PluginRegistry) -> Result<Outcome<Selection>, EngineError> {
    let descriptor = match ctx.config().authenticator() {
        Some(name) => match registry.get(name) {
            Some(descriptor) => descriptor,
            None => {
                return Ok(Outcome::Fatal(FatalError::UnknownAuthenticator {
                    name: name.to_string(),
                    available: registry.names().iter().map(|n| n.to_string()).collect(),
                }))
            }
        },
        None => match choose(
            ctx.display(),
            registry,
            "How would you like to authenticate with the certificate authority?",
        )? {
            Some(descriptor) => descriptor,
            None => return Ok(Outcome::QuietStop(StopReason::NoAuthenticator)),
        },
    };

    let Some(authenticator) = descriptor.authenticator() else {
        return Ok(Outcome::Fatal(FatalError::WrongCapability {
            name: descriptor.name().to_string(),
            role: "authenticator".to_string(),
        }));
    };

    debug!(plugin = descriptor.name(), installer = descriptor.installer().is_some(), "Selected plugin");
    Ok(Outcome::Proceed(Selection {
        name: descriptor.name().to_string(),
        authenticator,
        installer: descriptor.installer(),
    }))
}

/// Choose an installer, e.g. for rolling back checkpoints.
///
/// A configured authenticator name is honoured when that plugin can install.
pub fn select_installer(
    ctx: &Context,
    registry: &PluginRegistry,
) -> Result<Outcome<Rc<dyn Installer>>, EngineError> {
    if let Some(descriptor) = ctx.config().authenticator().and_then(|n| registry.get(n)) {
        if let Some(installer) = descriptor.installer() {
            return Ok(Outcome::Proceed(installer));
        }
    }

    let chosen = choose(ctx.display(), registry, "Which installer would you like to use?")?;
    Ok(match chosen.and_then(PluginDescriptor::installer) {
        Some(installer) => Outcome::Proceed(installer),
        None => Outcome::QuietStop(StopReason::NoInstaller),
    })
}

/// Sole visible candidate, or the operator's pick from a menu.
fn choose<'r>(
    display: &dyn Display,
    registry: &'r PluginRegistry,
    question: &str,
) -> Result<Option<&'r PluginDescriptor>, DisplayError> {
    let visible = registry.visible();
    if let [only] = visible.as_slice() {
        return Ok(Some(*only));
    }

    let candidates: Vec<(String, String)> = visible
        .iter()
        .map(|d| (d.name().to_string(), d.description().to_string()))
        .collect();
    let index = ops::choose_plugin(display, question, &candidates)?;
    Ok(index.and_then(|i| visible.get(i).copied()))
}
