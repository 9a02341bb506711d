//! certward - obtain and install domain-validated certificates
//!
//! certward drives a certificate authority through pluggable authenticators
//! (which prove control of a domain) and installers (which deploy the
//! certificate into a running server).
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses flags, delegates to engine)
//! - [`engine`] - Runs the certificate workflow as a chain of gated stages
//! - [`plugins`] - Plugin traits, capability checks and the plugin registry
//! - [`acme`] - Certificate authority abstraction and the lifecycle client
//! - [`core`] - Configuration, storage paths, accounts, locking, checkpoints
//! - [`crypto`] - Keys and certificate signing requests
//! - [`ui`] - Operator interaction and text formatting
//!
//! # Correctness Invariants
//!
//! 1. Nothing is acquired without an authenticator and at least one domain
//! 2. Nothing is deployed without an installer
//! 3. Stopping with nothing to do is never reported as an error
//! 4. Private keys are written owner-only and never logged

pub mod acme;
pub mod cli;
pub mod core;
pub mod crypto;
pub mod engine;
pub mod plugins;
pub mod ui;
