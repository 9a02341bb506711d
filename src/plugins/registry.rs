//! plugins::registry
//!
//! Plugin discovery and lookup.
//!
//! # Architecture
//!
//! Plugins are announced by a static manifest of [`EntryPoint`]s under the
//! group [`ENTRY_POINT_GROUP`]. Discovery walks the manifest once, builds each
//! plugin with the run's [`Context`], verifies its capabilities, and keeps
//! the ones that provide the capability the caller asked for.
//!
//! # Invariants
//!
//! - Discovery never aborts: a plugin that fails to build, or lacks the
//!   required capability, is logged and skipped
//! - Names are unique; the first entry point with a given name wins
//! - Iteration order is by name, so menus are stable across runs
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use certward::plugins::capabilities::Capability;
//! use certward::plugins::mock::MockPlugin;
//! use certward::plugins::registry::PluginRegistry;
//!
//! let mut registry = PluginRegistry::new();
//! registry
//!     .register("mock", Rc::new(MockPlugin::authenticator("Mock")), Capability::Authenticator)
//!     .unwrap();
//! assert_eq!(registry.names(), vec!["mock"]);
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use super::capabilities::{Capability, CapabilitySet};
use super::traits::{Authenticator, Installer, Plugin, PluginError};
use super::{manual, null};
use crate::engine::Context;

/// Group name all certward plugins are announced under.
pub const ENTRY_POINT_GROUP: &str = "certward.plugins";

/// Builds a plugin for the current run.
pub type Constructor = fn(&Context) -> Result<Rc<dyn Plugin>, PluginError>;

/// One announced plugin.
#[derive(Clone, Copy)]
pub struct EntryPoint {
    pub name: &'static str,
    pub constructor: Constructor,
}

impl std::fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryPoint").field("name", &self.name).finish()
    }
}

const BUILTIN: &[EntryPoint] = &[
    EntryPoint {
        name: manual::NAME,
        constructor: manual::construct,
    },
    EntryPoint {
        name: null::NAME,
        constructor: null::construct,
    },
];

/// Plugins shipped with certward.
pub fn builtin_entry_points() -> &'static [EntryPoint] {
    BUILTIN
}

/// Why a plugin was not admitted to a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("a plugin named '{0}' is already registered")]
    Duplicate(String),

    #[error("plugin '{name}' is not an {required}")]
    MissingCapability { name: String, required: Capability },
}

/// A discovered plugin with its verified capabilities.
#[derive(Clone)]
pub struct PluginDescriptor {
    name: String,
    plugin: Rc<dyn Plugin>,
    authenticator: Option<Rc<dyn Authenticator>>,
    installer: Option<Rc<dyn Installer>>,
    capabilities: CapabilitySet,
}

impl PluginDescriptor {
    /// Verify `plugin`'s capabilities by asking it to up-cast.
    pub fn new(name: impl Into<String>, plugin: Rc<dyn Plugin>) -> Self {
        let authenticator = plugin.clone().as_authenticator();
        let installer = plugin.clone().as_installer();

        let mut capabilities = CapabilitySet::new();
        if authenticator.is_some() {
            capabilities.insert(Capability::Authenticator);
        }
        if installer.is_some() {
            capabilities.insert(Capability::Installer);
        }

        Self {
            name: name.into(),
            plugin,
            authenticator,
            installer,
            capabilities,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        self.plugin.description()
    }

    pub fn more_info(&self) -> String {
        self.plugin.more_info()
    }

    pub fn hidden(&self) -> bool {
        self.plugin.hidden()
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn plugin(&self) -> &Rc<dyn Plugin> {
        &self.plugin
    }

    /// The plugin as an authenticator, if verified.
    pub fn authenticator(&self) -> Option<Rc<dyn Authenticator>> {
        self.authenticator.clone()
    }

    /// The plugin as an installer, if verified.
    pub fn installer(&self) -> Option<Rc<dyn Installer>> {
        self.installer.clone()
    }
}

impl std::fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities.sorted())
            .field("hidden", &self.hidden())
            .finish()
    }
}

/// Plugins available for one purpose, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, PluginDescriptor>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `plugin` if it proves `required` and the name is free.
    pub fn register(
        &mut self,
        name: &str,
        plugin: Rc<dyn Plugin>,
        required: Capability,
    ) -> Result<(), Rejection> {
        if self.plugins.contains_key(name) {
            return Err(Rejection::Duplicate(name.to_string()));
        }
        let descriptor = PluginDescriptor::new(name, plugin);
        if !descriptor.capabilities().has(&required) {
            return Err(Rejection::MissingCapability {
                name: name.to_string(),
                required,
            });
        }
        self.plugins.insert(name.to_string(), descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PluginDescriptor> {
        self.plugins.get(name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// All names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    /// All descriptors, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.plugins.values()
    }

    /// Descriptors eligible for menus and implicit selection.
    pub fn visible(&self) -> Vec<&PluginDescriptor> {
        self.plugins.values().filter(|d| !d.hidden()).collect()
    }
}

/// Build every entry point and keep those providing `required`.
pub fn discover(ctx: &Context, entry_points: &[EntryPoint], required: Capability) -> PluginRegistry {
    let mut registry = PluginRegistry::new();

    for entry in entry_points {
        let plugin = match (entry.constructor)(ctx) {
            Ok(plugin) => plugin,
            Err(e) => {
                debug!(
                    group = ENTRY_POINT_GROUP,
                    plugin = entry.name,
                    error = %e,
                    "Skipping plugin that failed to load"
                );
                continue;
            }
        };

        match registry.register(entry.name, plugin, required) {
            Ok(()) => debug!(plugin = entry.name, %required, "Discovered plugin"),
            Err(reason) => debug!(plugin = entry.name, %reason, "Skipping plugin"),
        }
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::mock::MockPlugin;
    use crate::engine::testing::test_context;

    fn auth(_: &Context) -> Result<Rc<dyn Plugin>, PluginError> {
        Ok(Rc::new(MockPlugin::authenticator("First authenticator")))
    }

    fn auth_again(_: &Context) -> Result<Rc<dyn Plugin>, PluginError> {
        Ok(Rc::new(MockPlugin::authenticator("Second authenticator")))
    }

    fn installer_only(_: &Context) -> Result<Rc<dyn Plugin>, PluginError> {
        Ok(Rc::new(MockPlugin::installer("Installer")))
    }

    fn broken(_: &Context) -> Result<Rc<dyn Plugin>, PluginError> {
        Err(PluginError::Misconfiguration("missing binary".to_string()))
    }

    #[test]
    fn failures_and_wrong_capabilities_are_skipped() {
        let (ctx, _) = test_context();
        let entry_points = [
            EntryPoint { name: "broken", constructor: broken },
            EntryPoint { name: "inst", constructor: installer_only },
            EntryPoint { name: "auth", constructor: auth },
        ];

        let registry = discover(&ctx, &entry_points, Capability::Authenticator);
        assert_eq!(registry.names(), vec!["auth"]);
    }

    #[test]
    fn first_duplicate_wins() {
        let (ctx, _) = test_context();
        let entry_points = [
            EntryPoint { name: "auth", constructor: auth },
            EntryPoint { name: "auth", constructor: auth_again },
        ];

        let registry = discover(&ctx, &entry_points, Capability::Authenticator);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("auth").unwrap().description(), "First authenticator");
    }

    #[test]
    fn names_are_sorted() {
        let mut registry = PluginRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(name, Rc::new(MockPlugin::authenticator(name)), Capability::Authenticator)
                .unwrap();
        }
        assert_eq!(registry.names(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn register_rejects_missing_capability() {
        let mut registry = PluginRegistry::new();
        let result = registry.register(
            "inst",
            Rc::new(MockPlugin::installer("Installer")),
            Capability::Authenticator,
        );
        assert_eq!(
            result,
            Err(Rejection::MissingCapability {
                name: "inst".to_string(),
                required: Capability::Authenticator
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn descriptor_verifies_both_roles() {
        let descriptor = PluginDescriptor::new("both", Rc::new(MockPlugin::both("Both")));
        assert!(descriptor
            .capabilities()
            .has_all(&[Capability::Authenticator, Capability::Installer]));

        let auth = descriptor.authenticator().unwrap();
        let inst = descriptor.installer().unwrap();
        assert_eq!(
            Rc::as_ptr(&auth) as *const u8,
            Rc::as_ptr(&inst) as *const u8
        );
    }

    #[test]
    fn hidden_plugins_are_not_visible() {
        let mut registry = PluginRegistry::new();
        registry
            .register("shown", Rc::new(MockPlugin::authenticator("Shown")), Capability::Authenticator)
            .unwrap();
        registry
            .register(
                "quiet",
                Rc::new(MockPlugin::authenticator("Quiet").hidden()),
                Capability::Authenticator,
            )
            .unwrap();

        let visible: Vec<_> = registry.visible().iter().map(|d| d.name()).collect();
        assert_eq!(visible, vec!["shown"]);
        assert!(registry.get("quiet").is_some());
    }

    #[test]
    fn builtins_discover_manual_as_authenticator() {
        let (ctx, _) = test_context();
        let authenticators = discover(&ctx, builtin_entry_points(), Capability::Authenticator);
        assert_eq!(authenticators.names(), vec!["manual"]);

        let installers = discover(&ctx, builtin_entry_points(), Capability::Installer);
        assert_eq!(installers.names(), vec!["null"]);
        assert!(installers.visible().is_empty());
    }
}
