//! engine::account
//!
//! Account resolution: which local account this run acts as.
//!
//! # Rules
//!
//! - An email is configured: load its account, or create one (using
//!   `--authkey` if given) when none is stored. A stored account that cannot
//!   be loaded is fatal and left untouched, as is a failed creation.
//! - No email: [`determine_account`] decides from what is stored.

use tracing::{debug, info, warn};

use super::outcome::{FatalError, Outcome, StopReason};
use super::{Context, EngineError};
use crate::core::account::{Account, AccountError, AccountStore};
use crate::crypto::{self, Key};
use crate::ui::ops;

/// Resolve the account for this run.
pub fn resolve(ctx: &Context, store: &dyn AccountStore) -> Result<Outcome<Account>, EngineError> {
    let Some(email) = ctx.config().email() else {
        return determine_account(ctx, store);
    };

    match store.load(email) {
        Ok(account) => {
            debug!(email, "Using existing account");
            Ok(Outcome::Proceed(account))
        }
        Err(AccountError::NotFound(_)) => {
            debug!(email, "No stored account, creating one");
            Ok(create(ctx, store, email))
        }
        Err(e) => {
            warn!(email, error = %e, "Stored account is unusable");
            Ok(Outcome::Fatal(FatalError::AccountUnavailable {
                email: email.to_string(),
                reason: e.to_string(),
            }))
        }
    }
}

/// Pick an account when no email is configured.
///
/// One stored account is used as is, several are offered in a menu, and with
/// none the operator is asked for an email to create one. Cancelling either
/// prompt stops quietly.
pub fn determine_account(
    ctx: &Context,
    store: &dyn AccountStore,
) -> Result<Outcome<Account>, EngineError> {
    let mut accounts = store.find_all()?;

    if accounts.len() == 1 {
        return Ok(Outcome::Proceed(accounts.remove(0)));
    }

    if accounts.len() > 1 {
        let labels: Vec<String> = accounts.iter().map(Account::label).collect();
        return Ok(match ops::choose_account(ctx.display(), &labels)? {
            Some(index) if index < accounts.len() => Outcome::Proceed(accounts.swap_remove(index)),
            _ => Outcome::QuietStop(StopReason::AccountDeclined),
        });
    }

    match ops::get_email(ctx.display())? {
        Some(email) => Ok(create(ctx, store, &email)),
        None => Ok(Outcome::QuietStop(StopReason::AccountDeclined)),
    }
}

fn create(ctx: &Context, store: &dyn AccountStore, email: &str) -> Outcome<Account> {
    let key = match authkey(ctx) {
        Ok(key) => key,
        Err(fatal) => return Outcome::Fatal(fatal),
    };

    match store.create(email, key) {
        Ok(account) => {
            info!(email, "Created account");
            Outcome::Proceed(account)
        }
        Err(e) => Outcome::Fatal(FatalError::AccountUnavailable {
            email: email.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn authkey(ctx: &Context) -> Result<Option<Key>, FatalError> {
    let Some(path) = ctx.config().authkey() else {
        return Ok(None);
    };
    crypto::read_key(path)
        .map(Some)
        .map_err(|e| FatalError::UnreadableKey {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
