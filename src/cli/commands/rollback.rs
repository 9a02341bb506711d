//! rollback - Revert installer checkpoints

use anyhow::{Context as _, Result};
use tracing::info;

use super::finish;
use crate::core::lock::RunLock;
use crate::core::paths::StoragePaths;
use crate::engine::select::select_installer;
use crate::engine::{Context, Outcome, StopReason};
use crate::plugins::{builtin_entry_points, discover, Capability, PluginRegistry};
use crate::ui::ops;

/// Revert the last `checkpoints` installer checkpoints and restart the server.
pub fn rollback(ctx: &Context, checkpoints: usize) -> Result<u8> {
    let paths = StoragePaths::from_config(ctx.config());
    let _lock = RunLock::acquire(&paths).context("cannot start a rollback")?;

    let registry = discover(ctx, builtin_entry_points(), Capability::Installer);
    rollback_with(ctx, &registry, checkpoints)
}

fn rollback_with(ctx: &Context, registry: &PluginRegistry, checkpoints: usize) -> Result<u8> {
    let installer = match select_installer(ctx, registry)? {
        Outcome::Proceed(installer) => installer,
        Outcome::QuietStop(reason) => return Ok(finish(&Outcome::<()>::QuietStop(reason))),
        Outcome::Fatal(e) => return Ok(finish(&Outcome::<()>::Fatal(e))),
    };

    if !ctx.config().no_confirm() && !ops::confirm_rollback(ctx.display(), checkpoints)? {
        info!(reason = %StopReason::Declined, "Rollback not performed");
        return Ok(0);
    }

    installer.prepare()?;
    installer
        .rollback_checkpoints(checkpoints)
        .with_context(|| format!("failed to roll back {} checkpoint(s)", checkpoints))?;
    installer.restart().context("failed to restart the server")?;
    info!(checkpoints, "Rolled back");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigFile;
    use crate::engine::testing::{context_with, test_context};
    use crate::plugins::mock::{FailOn, MockPlugin, PluginOperation};
    use crate::ui::scripted::Reply;
    use std::rc::Rc;

    fn registry_with(plugin: &MockPlugin) -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        registry
            .register("mock", Rc::new(plugin.clone()), Capability::Installer)
            .unwrap();
        registry
    }

    #[test]
    fn confirmed_rollback_reverts_and_restarts() {
        let (ctx, _) = context_with(ConfigFile::default(), vec![Reply::YesNo(true)]);
        let plugin = MockPlugin::installer("Installer");

        assert_eq!(rollback_with(&ctx, &registry_with(&plugin), 2).unwrap(), 0);
        assert_eq!(
            plugin.operations(),
            vec![
                PluginOperation::Prepare,
                PluginOperation::RollbackCheckpoints(2),
                PluginOperation::Restart,
            ]
        );
    }

    #[test]
    fn declined_rollback_touches_nothing() {
        let (ctx, _) = context_with(ConfigFile::default(), vec![Reply::YesNo(false)]);
        let plugin = MockPlugin::installer("Installer");

        assert_eq!(rollback_with(&ctx, &registry_with(&plugin), 1).unwrap(), 0);
        assert!(plugin.operations().is_empty());
    }

    #[test]
    fn no_confirm_skips_the_question() {
        let flags = ConfigFile {
            no_confirm: Some(true),
            ..Default::default()
        };
        let (ctx, display) = context_with(flags, vec![]);
        let plugin = MockPlugin::installer("Installer");

        assert_eq!(rollback_with(&ctx, &registry_with(&plugin), 1).unwrap(), 0);
        assert_eq!(display.questions_asked(), 0);
        assert!(plugin
            .operations()
            .contains(&PluginOperation::RollbackCheckpoints(1)));
    }

    #[test]
    fn failed_rollback_is_an_error() {
        let flags = ConfigFile {
            no_confirm: Some(true),
            ..Default::default()
        };
        let (ctx, _) = context_with(flags, vec![]);
        let plugin = MockPlugin::installer("Installer");
        plugin.fail_on(FailOn::RollbackCheckpoints);

        assert!(rollback_with(&ctx, &registry_with(&plugin), 1).is_err());
        assert!(!plugin.operations().contains(&PluginOperation::Restart));
    }

    #[test]
    fn no_installer_is_quiet() {
        let (ctx, _) = test_context();
        assert_eq!(rollback_with(&ctx, &PluginRegistry::new(), 1).unwrap(), 0);
    }
}
