//! view-config-changes - List installer checkpoints

use anyhow::{Context as _, Result};

use crate::core::checkpoints::{format_checkpoints, list_checkpoints};
use crate::core::paths::StoragePaths;
use crate::engine::Context;

/// Show every recorded checkpoint, newest first.
pub fn view_config_changes(ctx: &Context) -> Result<u8> {
    let paths = StoragePaths::from_config(ctx.config());
    let checkpoints = list_checkpoints(paths.backup_dir()).with_context(|| {
        format!("failed to read checkpoints in {}", paths.backup_dir().display())
    })?;
    ctx.display()
        .notification(&format_checkpoints(&checkpoints), false)?;
    Ok(0)
}
