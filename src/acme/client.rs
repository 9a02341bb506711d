//! acme::client
//!
//! Drives a [`CertificateAuthority`] and the chosen plugins through
//! registration, acquisition, deployment and enhancement.
//!
//! # Design
//!
//! The client owns no policy about *whether* a step runs; the workflow
//! engine decides that. The client only knows *how*: which calls go to the
//! authority, which to the authenticator or installer, in what order, and
//! what to undo when something fails.
//!
//! # Invariants
//!
//! - `cleanup` runs after `perform` even when validation fails
//! - Certificate files are written to fresh `NNNN_` names, never over an
//!   existing certificate
//! - A failed deployment or enhancement triggers the installer's
//!   `recovery_routine` before the error is returned

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::traits::{AuthorityError, CertificateAuthority, Challenge, IssuedCertificate};
use crate::core::account::{Account, AccountError, AccountStore};
use crate::core::files::{make_or_verify_dir, write_unique, PUBLIC_MODE};
use crate::core::paths::StoragePaths;
use crate::crypto::{self, CryptoError};
use crate::engine::Context;
use crate::plugins::{Authenticator, CertPaths, Enhancement, Installer, PluginError};
use crate::ui::{ops, DisplayError};

/// Directory mode for certificate output.
const CERT_DIR_MODE: u32 = 0o755;

/// Errors from client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Authority(#[from] AuthorityError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Display(#[from] DisplayError),

    /// The operator declined the terms of service.
    #[error("the terms of service were not accepted")]
    TermsDeclined,

    /// The authenticator answered a different number of challenges.
    #[error("authenticator returned {got} responses for {expected} challenges")]
    ResponseMismatch { expected: usize, got: usize },

    /// Acquisition was asked for no domains.
    #[error("no domains to request a certificate for")]
    NoDomains,

    /// Writing certificate files failed.
    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Files produced by a successful acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateArtifact {
    pub domains: Vec<String>,
    pub cert_path: PathBuf,
    pub chain_path: PathBuf,
    pub fullchain_path: PathBuf,
    pub key_path: PathBuf,
}

/// Certificate lifecycle client.
pub struct Client<'a> {
    ctx: &'a Context,
    authority: &'a dyn CertificateAuthority,
    paths: StoragePaths,
}

impl<'a> Client<'a> {
    pub fn new(ctx: &'a Context, authority: &'a dyn CertificateAuthority) -> Self {
        Self {
            ctx,
            authority,
            paths: StoragePaths::from_config(ctx.config()),
        }
    }

    /// Register `account`, accept the terms of service and persist it.
    pub fn register(
        &self,
        account: &mut Account,
        store: &dyn AccountStore,
    ) -> Result<(), ClientError> {
        let mut registration = self.authority.register(account)?;

        if let Some(terms) = registration.terms_of_service.clone() {
            if !registration.agreed_to_terms {
                let agreed = self.ctx.config().agree_tos()
                    || ops::agree_to_terms(self.ctx.display(), &terms)?;
                if !agreed {
                    return Err(ClientError::TermsDeclined);
                }
                registration = self.authority.agree_to_terms(&registration)?;
            }
        }

        info!(server = self.authority.server(), uri = %registration.uri, "Registered account");
        account.set_registration(registration);
        store.save(account)?;
        Ok(())
    }

    /// Prove control of `domains` and obtain a certificate for them.
    pub fn obtain_certificate(
        &self,
        account: &Account,
        authenticator: &dyn Authenticator,
        domains: &[String],
    ) -> Result<CertificateArtifact, ClientError> {
        if domains.is_empty() {
            return Err(ClientError::NoDomains);
        }

        let mut challenges = Vec::new();
        for domain in domains {
            let preferences = authenticator.challenge_preferences(domain);
            challenges.extend(self.authority.request_challenges(account, domain, &preferences)?);
        }
        debug!(count = challenges.len(), "Received challenges");

        let validated = self.answer_challenges(account, authenticator, &challenges);
        let cleaned = authenticator.cleanup(&challenges);
        validated?;
        cleaned?;

        let key = crypto::init_save_key(self.paths.key_dir())?;
        let csr = crypto::init_save_csr(&key, domains, &self.paths.csr_dir())?;
        let issued = self.authority.request_issuance(account, &csr, domains)?;

        let key_path = key.path.clone().unwrap_or_default();
        let artifact = self.save_certificate(&issued, domains, key_path)?;
        info!(cert = %artifact.cert_path.display(), "Certificate issued");
        Ok(artifact)
    }

    fn answer_challenges(
        &self,
        account: &Account,
        authenticator: &dyn Authenticator,
        challenges: &[Challenge],
    ) -> Result<(), ClientError> {
        let responses = authenticator.perform(challenges)?;
        if responses.len() != challenges.len() {
            return Err(ClientError::ResponseMismatch {
                expected: challenges.len(),
                got: responses.len(),
            });
        }
        for (challenge, response) in challenges.iter().zip(&responses) {
            self.authority.answer_challenge(account, challenge, response)?;
            debug!(domain = %challenge.domain, kind = %challenge.kind, "Challenge validated");
        }
        Ok(())
    }

    fn save_certificate(
        &self,
        issued: &IssuedCertificate,
        domains: &[String],
        key_path: PathBuf,
    ) -> Result<CertificateArtifact, ClientError> {
        let fullchain = format!("{}{}", issued.cert_pem, issued.chain_pem);
        Ok(CertificateArtifact {
            domains: domains.to_vec(),
            cert_path: write_public(self.paths.cert_path(), &issued.cert_pem)?,
            chain_path: write_public(self.paths.chain_path(), &issued.chain_pem)?,
            fullchain_path: write_public(&self.paths.fullchain_path(), &fullchain)?,
            key_path,
        })
    }

    /// Install the certificate for every domain, then save and restart.
    pub fn deploy_certificate(
        &self,
        installer: &dyn Installer,
        artifact: &CertificateArtifact,
    ) -> Result<(), ClientError> {
        let paths = CertPaths {
            cert: &artifact.cert_path,
            key: &artifact.key_path,
            chain: Some(&artifact.chain_path),
            fullchain: Some(&artifact.fullchain_path),
        };

        let deployed = artifact
            .domains
            .iter()
            .try_for_each(|domain| installer.deploy_cert(domain, paths))
            .and_then(|()| installer.save(Some("Deployed certificate"), false))
            .and_then(|()| installer.restart());
        if let Err(e) = deployed {
            recover(installer);
            return Err(e.into());
        }

        ops::success_installation(self.ctx.display(), &artifact.domains)?;
        Ok(())
    }

    /// Apply post-deployment hardening.
    ///
    /// `redirect` comes from configuration; `None` asks the operator.
    pub fn enhance_config(
        &self,
        installer: &dyn Installer,
        domains: &[String],
        redirect: Option<bool>,
    ) -> Result<(), ClientError> {
        if !installer.supported_enhancements().contains(&Enhancement::Redirect) {
            if redirect == Some(true) {
                warn!("Installer does not support redirects, skipping");
            }
            return Ok(());
        }

        let redirect = match redirect {
            Some(value) => value,
            None => ops::redirect_by_default(self.ctx.display())?,
        };
        if !redirect {
            return Ok(());
        }

        let enhanced = domains
            .iter()
            .try_for_each(|domain| installer.enhance(domain, Enhancement::Redirect, None))
            .and_then(|()| installer.save(Some("Add Redirects"), false))
            .and_then(|()| installer.restart());
        if let Err(e) = enhanced {
            recover(installer);
            return Err(e.into());
        }
        Ok(())
    }
}

fn recover(installer: &dyn Installer) {
    if let Err(e) = installer.recovery_routine() {
        warn!(error = %e, "Recovery routine failed");
    }
}

fn write_public(template: &Path, contents: &str) -> Result<PathBuf, ClientError> {
    if let Some(parent) = template.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            make_or_verify_dir(parent, CERT_DIR_MODE).map_err(|e| ClientError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    write_unique(template, contents.as_bytes(), PUBLIC_MODE).map_err(|e| ClientError::Io {
        path: template.to_path_buf(),
        source: e,
    })
}
