//! ui
//!
//! Operator interaction.
//!
//! # Modules
//!
//! - [`text`] - Pure formatting helpers (wrapping, domain summaries)
//! - [`input`] - Bounded-time line input
//! - [`display`] - The `Display` contract and its terminal implementations
//! - [`ops`] - Conversations built on top of a `Display`
//! - [`scripted`] - A `Display` answering from a queue, for tests
//!
//! # Design
//!
//! Everything the operator sees or answers goes through a `Display` so that
//! interactive and non-interactive runs share one code path, and tests can
//! script the answers.

pub mod display;
pub mod input;
pub mod ops;
pub mod scripted;
pub mod text;

pub use display::{Answer, Display, DisplayError, FileDisplay, NoninteractiveDisplay};
