//! plugins
//!
//! Authenticator and installer plugins.
//!
//! # Modules
//!
//! - [`traits`] - `Plugin`, `Authenticator` and `Installer` contracts
//! - [`capabilities`] - Verified plugin capabilities
//! - [`registry`] - Entry points, discovery and lookup
//! - [`manual`] - Built-in manual HTTP-01 authenticator
//! - [`null`] - Built-in hidden no-op installer
//! - [`mock`] - Mock plugin for tests

pub mod capabilities;
pub mod manual;
pub mod mock;
pub mod null;
pub mod registry;
pub mod traits;

pub use capabilities::{Capability, CapabilitySet};
pub use registry::{builtin_entry_points, discover, EntryPoint, PluginDescriptor, PluginRegistry};
pub use traits::{Authenticator, CertPaths, Enhancement, Installer, Plugin, PluginError};
