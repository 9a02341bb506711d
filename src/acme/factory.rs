//! acme::factory
//!
//! Certificate authority selection.
//!
//! # Design
//!
//! Commands call [`create_authority`] with the configured server URL instead
//! of naming an implementation, so the workflow stays independent of any
//! particular transport.
//!
//! # Provider Detection
//!
//! - `mock://...` → [`MockAuthority`] (in-memory, for dry runs)
//! - anything else → [`AuthorityError::UnsupportedServer`]
//!
//! # Example
//!
//! ```
//! use certward::acme::{create_authority, detect_provider, AuthorityProvider};
//!
//! assert_eq!(detect_provider("mock://local"), Some(AuthorityProvider::Mock));
//! let authority = create_authority("mock://local").unwrap();
//! assert_eq!(authority.server(), "mock://local");
//! ```

use super::mock::MockAuthority;
use super::traits::{AuthorityError, CertificateAuthority};

/// Known authority transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityProvider {
    /// In-memory authority
    Mock,
}

impl AuthorityProvider {
    /// All providers available in this build.
    pub fn all() -> &'static [AuthorityProvider] {
        &[AuthorityProvider::Mock]
    }

    /// URL scheme handled by the provider.
    pub fn scheme(&self) -> &'static str {
        match self {
            AuthorityProvider::Mock => "mock",
        }
    }
}

impl std::fmt::Display for AuthorityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://", self.scheme())
    }
}

/// Detect the provider from a server URL.
pub fn detect_provider(server: &str) -> Option<AuthorityProvider> {
    let (scheme, _) = server.split_once("://")?;
    AuthorityProvider::all()
        .iter()
        .copied()
        .find(|p| p.scheme().eq_ignore_ascii_case(scheme))
}

/// Create the certificate authority for `server`.
///
/// # Errors
///
/// [`AuthorityError::UnsupportedServer`] when no transport handles the URL.
pub fn create_authority(server: &str) -> Result<Box<dyn CertificateAuthority>, AuthorityError> {
    match detect_provider(server) {
        Some(AuthorityProvider::Mock) => Ok(Box::new(MockAuthority::new(server))),
        None => Err(AuthorityError::UnsupportedServer(server.to_string())),
    }
}
