//! plugins::manual
//!
//! Authenticator that asks the operator to publish challenge responses by
//! hand.
//!
//! For each HTTP-01 challenge the operator is shown the URL and the exact
//! content to serve, and the run waits until they confirm. Nothing is
//! cleaned up automatically.

use std::rc::Rc;

use super::traits::{Authenticator, Plugin, PluginError};
use crate::acme::{Challenge, ChallengeKind, ChallengeResponse};
use crate::engine::Context;
use crate::ui::Display;

pub const NAME: &str = "manual";

/// Manual HTTP-01 authenticator.
pub struct ManualAuthenticator {
    display: Rc<dyn Display>,
}

impl ManualAuthenticator {
    pub fn new(display: Rc<dyn Display>) -> Self {
        Self { display }
    }

    fn instructions(challenge: &Challenge) -> String {
        format!(
            "Make sure your web server displays the following content at\n\
             http://{}{} before continuing:\n\n{}\n\n\
             Content-Type header MUST be set to text/plain.",
            challenge.domain,
            challenge.http_path(),
            challenge.key_authorization
        )
    }
}

pub fn construct(ctx: &Context) -> Result<Rc<dyn Plugin>, PluginError> {
    Ok(Rc::new(ManualAuthenticator::new(ctx.shared_display())))
}

impl Plugin for ManualAuthenticator {
    fn description(&self) -> &str {
        "Manually configure an HTTP server"
    }

    fn more_info(&self) -> String {
        "Shows the HTTP-01 challenge responses so they can be placed on the \
         web server by hand. The operator confirms each one before validation."
            .to_string()
    }

    fn prepare(&self) -> Result<(), PluginError> {
        Ok(())
    }

    fn as_authenticator(self: Rc<Self>) -> Option<Rc<dyn Authenticator>> {
        Some(self)
    }
}

impl Authenticator for ManualAuthenticator {
    fn challenge_preferences(&self, _domain: &str) -> Vec<ChallengeKind> {
        vec![ChallengeKind::Http01]
    }

    fn perform(&self, challenges: &[Challenge]) -> Result<Vec<ChallengeResponse>, PluginError> {
        let mut responses = Vec::with_capacity(challenges.len());
        for challenge in challenges {
            if challenge.kind != ChallengeKind::Http01 {
                return Err(PluginError::NotSupported(format!(
                    "manual authenticator cannot answer {} challenges",
                    challenge.kind
                )));
            }
            self.display
                .notification(&Self::instructions(challenge), true)?;
            responses.push(ChallengeResponse::for_challenge(challenge));
        }
        Ok(responses)
    }

    fn cleanup(&self, _challenges: &[Challenge]) -> Result<(), PluginError> {
        Ok(())
    }
}
