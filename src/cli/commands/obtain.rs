//! obtain - Run the certificate workflow

use anyhow::{Context as _, Result};

use super::finish;
use crate::acme::create_authority;
use crate::core::account::FileAccountStore;
use crate::core::lock::RunLock;
use crate::core::paths::StoragePaths;
use crate::engine::{workflow, Collaborators, Context};
use crate::plugins::{builtin_entry_points, discover, Capability};

/// Obtain a certificate and, when the authenticator can install, deploy it.
pub fn obtain(ctx: &Context) -> Result<u8> {
    let paths = StoragePaths::from_config(ctx.config());
    let _lock = RunLock::acquire(&paths).context("cannot start a certificate run")?;

    let authority = create_authority(ctx.config().server())?;
    let registry = discover(ctx, builtin_entry_points(), Capability::Authenticator);
    let accounts = FileAccountStore::new(paths);

    let report = workflow::run(
        ctx,
        &Collaborators {
            registry: &registry,
            accounts: &accounts,
            authority: authority.as_ref(),
        },
    )?;
    Ok(finish(&report.outcome))
}
