//! core
//!
//! Core storage and configuration for certward.
//!
//! # Modules
//!
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for certward storage
//! - [`files`] - Permission-aware file helpers
//! - [`lock`] - Exclusive run lock
//! - [`account`] - Local accounts and their persistence
//! - [`checkpoints`] - Read-only view of installer checkpoints
//!
//! # Design Principles
//!
//! - Configuration is resolved once and immutable afterwards
//! - Private material is never world-readable, not even briefly
//! - Nothing here prompts the operator

pub mod account;
pub mod checkpoints;
pub mod config;
pub mod files;
pub mod lock;
pub mod paths;
