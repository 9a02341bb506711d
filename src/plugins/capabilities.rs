//! plugins::capabilities
//!
//! Verified plugin capabilities.
//!
//! # Architecture
//!
//! A capability is a proven fact about a plugin object: the plugin up-cast
//! itself to that interface when asked. Capabilities are established by the
//! registry at discovery time and never taken from a plugin's name or
//! self-description.
//!
//! # Example
//!
//! ```
//! use certward::plugins::capabilities::{Capability, CapabilitySet};
//!
//! let caps = CapabilitySet::with([Capability::Authenticator]);
//! assert!(caps.has(&Capability::Authenticator));
//! assert_eq!(
//!     caps.missing(&[Capability::Authenticator, Capability::Installer]),
//!     vec![Capability::Installer]
//! );
//! ```

use std::collections::HashSet;

/// A capability a plugin has proven it provides.
///
/// # Invariants
///
/// - A capability is binary: present or absent
/// - Capabilities are established by the registry, never self-declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Can prove control of domains.
    Authenticator,

    /// Can configure a server to use a certificate.
    Installer,
}

impl Capability {
    /// Human-readable description of the capability.
    pub fn description(&self) -> &'static str {
        match self {
            Capability::Authenticator => "authenticator",
            Capability::Installer => "installer",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// The capabilities verified for one plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    capabilities: HashSet<Capability>,
}

impl CapabilitySet {
    /// Create an empty capability set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a capability set with the given capabilities.
    pub fn with<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            capabilities: iter.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, cap: Capability) {
        self.capabilities.insert(cap);
    }

    pub fn has(&self, cap: &Capability) -> bool {
        self.capabilities.contains(cap)
    }

    /// Check if all given capabilities are present.
    ///
    /// Returns true if the slice is empty.
    pub fn has_all(&self, caps: &[Capability]) -> bool {
        caps.iter().all(|c| self.capabilities.contains(c))
    }

    /// Capabilities from `required` that are absent, in the order given.
    pub fn missing(&self, required: &[Capability]) -> Vec<Capability> {
        required
            .iter()
            .filter(|c| !self.capabilities.contains(c))
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Capabilities in a stable order.
    pub fn sorted(&self) -> Vec<Capability> {
        let mut caps: Vec<_> = self.capabilities.iter().copied().collect();
        caps.sort();
        caps
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self {
            capabilities: iter.into_iter().collect(),
        }
    }
}
