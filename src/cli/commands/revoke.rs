//! revoke - Certificate revocation

use anyhow::Result;
use tracing::debug;

use crate::engine::Context;

/// Revocation is accepted on the command line but not performed.
pub fn revoke(ctx: &Context) -> Result<u8> {
    debug!("Revocation requested");
    ctx.display()
        .notification("Revocation is not available yet.", false)?;
    Ok(0)
}
