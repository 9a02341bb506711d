//! acme::mock
//!
//! In-memory certificate authority for tests and dry runs.
//!
//! # Design
//!
//! `MockAuthority` implements [`CertificateAuthority`] without any network
//! access. It hands out deterministic tokens, checks that each response
//! carries the key authorization it issued, and signs certificates with a
//! throwaway root generated per issuance. Every call is recorded so tests
//! can assert on the exact conversation, and any single operation can be
//! configured to fail.
//!
//! Issued certificates are self-signed for the requested names; they are
//! structurally valid PEM but are not bound to the CSR's key.
//!
//! # Example
//!
//! ```
//! use certward::acme::mock::{MockAuthority, MockOperation};
//! use certward::acme::CertificateAuthority;
//!
//! let authority = MockAuthority::new("mock://local");
//! assert_eq!(authority.server(), "mock://local");
//! assert!(authority.operations().is_empty());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use rcgen::{BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair};

use super::traits::{
    AuthorityError, CertificateAuthority, Challenge, ChallengeKind, ChallengeResponse,
    IssuedCertificate,
};
use crate::core::account::{thumbprint, Account, Registration};
use crate::crypto::Csr;

/// Mock certificate authority.
///
/// Clones share state, so a test can keep a handle while the workflow owns
/// another.
#[derive(Debug, Clone)]
pub struct MockAuthority {
    server: String,
    inner: Rc<RefCell<MockAuthorityInner>>,
}

#[derive(Debug)]
struct MockAuthorityInner {
    terms_of_service: Option<String>,
    offered: Vec<ChallengeKind>,
    next_token: u64,
    next_account: u64,
    fail_on: Option<FailOn>,
    operations: Vec<MockOperation>,
}

/// Which operation should fail, and how.
#[derive(Debug, Clone)]
pub enum FailOn {
    Register(AuthorityError),
    AgreeToTerms(AuthorityError),
    RequestChallenges(AuthorityError),
    AnswerChallenge(AuthorityError),
    RequestIssuance(AuthorityError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Register { email: Option<String> },
    AgreeToTerms { uri: String },
    RequestChallenges { domain: String },
    AnswerChallenge { domain: String, kind: ChallengeKind },
    RequestIssuance { domains: Vec<String> },
}

impl MockAuthority {
    /// Authority offering HTTP-01 challenges and no terms of service.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            inner: Rc::new(RefCell::new(MockAuthorityInner {
                terms_of_service: None,
                offered: vec![ChallengeKind::Http01],
                next_token: 1,
                next_account: 1,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Require accounts to accept `url` as terms of service.
    pub fn with_terms_of_service(self, url: impl Into<String>) -> Self {
        self.inner.borrow_mut().terms_of_service = Some(url.into());
        self
    }

    /// Challenge kinds this authority offers, in its own order.
    pub fn with_offered(self, kinds: Vec<ChallengeKind>) -> Self {
        self.inner.borrow_mut().offered = kinds;
        self
    }

    /// Make one operation fail.
    pub fn fail_on(&self, fail_on: FailOn) {
        self.inner.borrow_mut().fail_on = Some(fail_on);
    }

    /// Stop injecting failures.
    pub fn clear_fail_on(&self) {
        self.inner.borrow_mut().fail_on = None;
    }

    /// All recorded operations, oldest first.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.inner.borrow().operations.clone()
    }

    fn record(&self, op: MockOperation) {
        self.inner.borrow_mut().operations.push(op);
    }

    fn check_fail<F>(&self, select: F) -> Result<(), AuthorityError>
    where
        F: Fn(&FailOn) -> Option<&AuthorityError>,
    {
        match self.inner.borrow().fail_on.as_ref().and_then(select) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn require_registered(account: &Account) -> Result<(), AuthorityError> {
        match account.registration() {
            Some(regr) if regr.terms_of_service.is_some() && !regr.agreed_to_terms => {
                Err(AuthorityError::TermsNotAccepted)
            }
            Some(_) => Ok(()),
            None => Err(AuthorityError::Unregistered),
        }
    }
}

fn rcgen_error(e: rcgen::Error) -> AuthorityError {
    AuthorityError::Rejected(format!("signing failed: {}", e))
}

fn sign(domains: &[String]) -> Result<IssuedCertificate, AuthorityError> {
    let root_key = KeyPair::generate().map_err(rcgen_error)?;
    let mut root_params = CertificateParams::new(Vec::<String>::new()).map_err(rcgen_error)?;
    let mut root_name = DistinguishedName::new();
    root_name.push(DnType::CommonName, "certward mock root");
    root_params.distinguished_name = root_name;
    root_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let root = root_params.self_signed(&root_key).map_err(rcgen_error)?;

    let leaf_key = KeyPair::generate().map_err(rcgen_error)?;
    let mut leaf_params = CertificateParams::new(domains.to_vec()).map_err(rcgen_error)?;
    let mut leaf_name = DistinguishedName::new();
    if let Some(first) = domains.first() {
        leaf_name.push(DnType::CommonName, first.as_str());
    }
    leaf_params.distinguished_name = leaf_name;
    let leaf = leaf_params
        .signed_by(&leaf_key, &root, &root_key)
        .map_err(rcgen_error)?;

    Ok(IssuedCertificate {
        cert_pem: leaf.pem(),
        chain_pem: root.pem(),
    })
}

impl CertificateAuthority for MockAuthority {
    fn server(&self) -> &str {
        &self.server
    }

    fn register(&self, account: &Account) -> Result<Registration, AuthorityError> {
        self.record(MockOperation::Register {
            email: account.email().map(str::to_string),
        });
        self.check_fail(|f| match f {
            FailOn::Register(e) => Some(e),
            _ => None,
        })?;

        let mut inner = self.inner.borrow_mut();
        let id = inner.next_account;
        inner.next_account += 1;

        Ok(Registration {
            uri: format!("{}/acct/{}", self.server, id),
            contact: account
                .email()
                .map(|e| vec![format!("mailto:{}", e)])
                .unwrap_or_default(),
            terms_of_service: inner.terms_of_service.clone(),
            agreed_to_terms: inner.terms_of_service.is_none(),
        })
    }

    fn agree_to_terms(&self, registration: &Registration) -> Result<Registration, AuthorityError> {
        self.record(MockOperation::AgreeToTerms {
            uri: registration.uri.clone(),
        });
        self.check_fail(|f| match f {
            FailOn::AgreeToTerms(e) => Some(e),
            _ => None,
        })?;

        Ok(Registration {
            agreed_to_terms: true,
            ..registration.clone()
        })
    }

    fn request_challenges(
        &self,
        account: &Account,
        domain: &str,
        preferences: &[ChallengeKind],
    ) -> Result<Vec<Challenge>, AuthorityError> {
        self.record(MockOperation::RequestChallenges {
            domain: domain.to_string(),
        });
        self.check_fail(|f| match f {
            FailOn::RequestChallenges(e) => Some(e),
            _ => None,
        })?;
        Self::require_registered(account)?;

        let mut inner = self.inner.borrow_mut();
        let kind = preferences
            .iter()
            .copied()
            .find(|k| inner.offered.contains(k))
            .ok_or_else(|| AuthorityError::NoAcceptableChallenge(domain.to_string()))?;

        let token = format!("token-{:04}", inner.next_token);
        inner.next_token += 1;
        let key_authorization = format!("{}.{}", token, thumbprint(&account.key().pem));

        Ok(vec![Challenge {
            domain: domain.to_string(),
            kind,
            token,
            key_authorization,
        }])
    }

    fn answer_challenge(
        &self,
        account: &Account,
        challenge: &Challenge,
        response: &ChallengeResponse,
    ) -> Result<(), AuthorityError> {
        self.record(MockOperation::AnswerChallenge {
            domain: challenge.domain.clone(),
            kind: challenge.kind,
        });
        self.check_fail(|f| match f {
            FailOn::AnswerChallenge(e) => Some(e),
            _ => None,
        })?;
        Self::require_registered(account)?;

        if response.kind != challenge.kind || response.key_authorization != challenge.key_authorization {
            return Err(AuthorityError::ValidationFailed {
                domain: challenge.domain.clone(),
                detail: "response does not match the challenge".to_string(),
            });
        }
        Ok(())
    }

    fn request_issuance(
        &self,
        account: &Account,
        csr: &Csr,
        domains: &[String],
    ) -> Result<IssuedCertificate, AuthorityError> {
        self.record(MockOperation::RequestIssuance {
            domains: domains.to_vec(),
        });
        self.check_fail(|f| match f {
            FailOn::RequestIssuance(e) => Some(e),
            _ => None,
        })?;
        Self::require_registered(account)?;

        if csr.der.is_empty() {
            return Err(AuthorityError::Rejected("empty CSR".to_string()));
        }
        sign(domains)
    }
}
