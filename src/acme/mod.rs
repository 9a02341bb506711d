//! acme
//!
//! Talking to a certificate authority.
//!
//! # Architecture
//!
//! The [`CertificateAuthority`] trait is the only surface the rest of the
//! crate sees. The workflow gets one from [`create_authority`], which picks an
//! implementation from the scheme of the configured server, and hands it to a
//! [`Client`] that sequences registration, challenges and issuance.
//!
//! # Modules
//!
//! - `traits`: the authority trait and challenge types
//! - [`client`]: registration, acquisition, deployment and enhancement
//! - [`mock`]: in-memory authority for deterministic tests and dry runs
//! - `factory`: authority selection by server URL

pub mod client;
pub mod factory;
pub mod mock;
pub mod traits;

pub use client::{CertificateArtifact, Client, ClientError};
pub use factory::{create_authority, detect_provider, AuthorityProvider};
pub use traits::{
    AuthorityError, CertificateAuthority, Challenge, ChallengeKind, ChallengeResponse,
    IssuedCertificate,
};
