//! acme::traits
//!
//! The certificate authority contract.
//!
//! # Design
//!
//! The workflow never speaks a wire protocol itself. It talks to a
//! [`CertificateAuthority`], which hands out challenges, accepts the
//! responses an authenticator produced, and issues certificates for a CSR.
//! Implementations own transport, nonces and polling.
//!
//! Key authorizations are computed by the authority and handed to the
//! authenticator ready to publish, so plugins never need the account key.

use thiserror::Error;

use crate::core::account::{Account, Registration};
use crate::crypto::Csr;

/// Errors from certificate authority operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityError {
    /// No transport exists for this server URL.
    #[error("no certificate authority transport available for '{0}'")]
    UnsupportedServer(String),

    /// The authority could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The authority refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The account must accept the terms of service first.
    #[error("terms of service have not been accepted")]
    TermsNotAccepted,

    /// The account is not registered with this authority.
    #[error("account is not registered")]
    Unregistered,

    /// The authority could not validate a challenge response.
    #[error("validation failed for {domain}: {detail}")]
    ValidationFailed { domain: String, detail: String },

    /// None of the offered challenge types is acceptable.
    #[error("no acceptable challenge for {0}")]
    NoAcceptableChallenge(String),
}

/// Kind of domain-control challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChallengeKind {
    /// Serve a file under `/.well-known/acme-challenge/`
    Http01,
    /// Publish a TXT record under `_acme-challenge.`
    Dns01,
    /// Answer a TLS handshake with a special certificate
    TlsAlpn01,
}

impl ChallengeKind {
    /// Protocol name (`http-01`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            ChallengeKind::Http01 => "http-01",
            ChallengeKind::Dns01 => "dns-01",
            ChallengeKind::TlsAlpn01 => "tls-alpn-01",
        }
    }
}

impl std::fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A challenge the authority wants answered for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Domain being validated
    pub domain: String,
    /// Challenge kind
    pub kind: ChallengeKind,
    /// Challenge token
    pub token: String,
    /// Value the authenticator must publish
    pub key_authorization: String,
}

impl Challenge {
    /// Path an HTTP-01 response must be served from.
    pub fn http_path(&self) -> String {
        format!("/.well-known/acme-challenge/{}", self.token)
    }
}

/// An authenticator's answer to a [`Challenge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeResponse {
    pub domain: String,
    pub kind: ChallengeKind,
    pub key_authorization: String,
}

impl ChallengeResponse {
    /// The response that answers `challenge` as published.
    pub fn for_challenge(challenge: &Challenge) -> Self {
        Self {
            domain: challenge.domain.clone(),
            kind: challenge.kind,
            key_authorization: challenge.key_authorization.clone(),
        }
    }
}

/// A certificate issued by the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCertificate {
    /// Leaf certificate, PEM
    pub cert_pem: String,
    /// Intermediate chain, PEM (may be empty)
    pub chain_pem: String,
}

/// The certificate authority contract.
///
/// Methods are synchronous; implementations block until the authority
/// answers or fails.
pub trait CertificateAuthority {
    /// Server this authority talks to.
    fn server(&self) -> &str;

    /// Register `account`, returning the authority's record.
    fn register(&self, account: &Account) -> Result<Registration, AuthorityError>;

    /// Accept the terms of service for a registration.
    fn agree_to_terms(&self, registration: &Registration) -> Result<Registration, AuthorityError>;

    /// Challenges for `domain`, picking from `preferences` in order.
    fn request_challenges(
        &self,
        account: &Account,
        domain: &str,
        preferences: &[ChallengeKind],
    ) -> Result<Vec<Challenge>, AuthorityError>;

    /// Submit a response and wait for the authority's verdict.
    fn answer_challenge(
        &self,
        account: &Account,
        challenge: &Challenge,
        response: &ChallengeResponse,
    ) -> Result<(), AuthorityError>;

    /// Issue a certificate for a CSR covering `domains`.
    fn request_issuance(
        &self,
        account: &Account,
        csr: &Csr,
        domains: &[String],
    ) -> Result<IssuedCertificate, AuthorityError>;
}
