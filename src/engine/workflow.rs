//! engine::workflow
//!
//! The certificate workflow as a linear chain of stages.
//!
//! Each stage is a gate for the next. A stage that has nothing to do stops
//! the run quietly, a misconfiguration stops it fatally, and anything else
//! unexpected is returned as an error for the process boundary to report.
//! [`RunReport::stages`] records every stage that was entered, in order.

use tracing::{info, warn};

use super::outcome::{proceed, FatalError, Outcome, StopReason};
use super::{account, domains, select, Context, EngineError};
use crate::acme::{CertificateArtifact, CertificateAuthority, Client, ClientError};
use crate::core::account::AccountStore;
use crate::crypto;
use crate::plugins::PluginRegistry;

/// Workflow stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    SelectPlugins,
    CollectDomains,
    ValidateKey,
    Register,
    Acquire,
    Deploy,
    Enhance,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::SelectPlugins => "select-plugins",
            Stage::CollectDomains => "collect-domains",
            Stage::ValidateKey => "validate-key",
            Stage::Register => "register",
            Stage::Acquire => "acquire",
            Stage::Deploy => "deploy",
            Stage::Enhance => "enhance",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Everything the workflow talks to besides the context.
pub struct Collaborators<'a> {
    /// Authenticator-capable plugins.
    pub registry: &'a PluginRegistry,
    pub accounts: &'a dyn AccountStore,
    pub authority: &'a dyn CertificateAuthority,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub domains: Vec<String>,
    pub artifact: CertificateArtifact,
    /// Whether an installer deployed the certificate.
    pub installed: bool,
}

/// Result of [`run`].
#[derive(Debug)]
pub struct RunReport {
    /// Stages entered, in order. The last one is where the run ended.
    pub stages: Vec<Stage>,
    pub outcome: Outcome<Completion>,
}

impl RunReport {
    pub fn exit_code(&self) -> u8 {
        self.outcome.exit_code()
    }

    pub fn entered(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }
}

/// Run the certificate workflow once.
pub fn run(ctx: &Context, collab: &Collaborators<'_>) -> Result<RunReport, EngineError> {
    let mut stages = Vec::new();
    let outcome = drive(ctx, collab, &mut stages)?;

    match &outcome {
        Outcome::Proceed(done) => info!(installed = done.installed, "Workflow complete"),
        Outcome::QuietStop(reason) => info!(%reason, "Workflow stopped"),
        Outcome::Fatal(error) => warn!(%error, "Workflow failed"),
    }
    Ok(RunReport { stages, outcome })
}

fn enter(stages: &mut Vec<Stage>, stage: Stage) {
    info!(%stage, "Entering stage");
    stages.push(stage);
}

fn drive(
    ctx: &Context,
    collab: &Collaborators<'_>,
    stages: &mut Vec<Stage>,
) -> Result<Outcome<Completion>, EngineError> {
    enter(stages, Stage::Init);
    let mut account = proceed!(account::resolve(ctx, collab.accounts)?);

    enter(stages, Stage::SelectPlugins);
    let selection = proceed!(select::select(ctx, collab.registry)?);
    selection.authenticator.prepare()?;

    enter(stages, Stage::CollectDomains);
    let domains = proceed!(domains::collect(ctx, selection.installer.as_ref())?);

    enter(stages, Stage::ValidateKey);
    if let Err(e) = crypto::validate_key_csr(account.key(), None) {
        return Ok(Outcome::Fatal(FatalError::InvalidKey(e.to_string())));
    }

    let client = Client::new(ctx, collab.authority);

    if !account.is_registered() {
        enter(stages, Stage::Register);
        match client.register(&mut account, collab.accounts) {
            Ok(()) => {}
            Err(ClientError::Display(e)) => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "Registration did not complete");
                return Ok(Outcome::QuietStop(StopReason::RegistrationFailed(e.to_string())));
            }
        }
    }

    enter(stages, Stage::Acquire);
    let artifact =
        client.obtain_certificate(&account, selection.authenticator.as_ref(), &domains)?;

    let Some(installer) = selection.installer else {
        return Ok(Outcome::Proceed(Completion {
            domains,
            artifact,
            installed: false,
        }));
    };

    enter(stages, Stage::Deploy);
    client.deploy_certificate(installer.as_ref(), &artifact)?;

    enter(stages, Stage::Enhance);
    client.enhance_config(installer.as_ref(), &domains, ctx.config().redirect())?;

    Ok(Outcome::Proceed(Completion {
        domains,
        artifact,
        installed: true,
    }))
}
