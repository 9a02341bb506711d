//! engine::domains
//!
//! Domain collection.

use std::rc::Rc;

use tracing::{debug, warn};

use super::outcome::{Outcome, StopReason};
use super::{Context, EngineError};
use crate::plugins::Installer;
use crate::ui::ops;

/// Decide which names to request a certificate for.
///
/// Configured domains are used verbatim: order kept, duplicates left alone.
/// Otherwise the operator picks from the installer's names, or types them
/// when there is no installer. An empty result stops quietly.
pub fn collect(
    ctx: &Context,
    installer: Option<&Rc<dyn Installer>>,
) -> Result<Outcome<Vec<String>>, EngineError> {
    let domains = match ctx.config().domains() {
        Some(domains) => domains.to_vec(),
        None => {
            let names = match installer {
                Some(installer) => Some(installer.get_all_names().unwrap_or_else(|e| {
                    warn!(error = %e, "Installer could not list names");
                    Vec::new()
                })),
                None => None,
            };
            ops::choose_names(ctx.display(), names.as_deref())?
        }
    };

    if domains.is_empty() {
        return Ok(Outcome::QuietStop(StopReason::NoDomains));
    }
    debug!(?domains, "Collected domains");
    Ok(Outcome::Proceed(domains))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigFile;
    use crate::engine::testing::{context_with, test_context};
    use crate::plugins::mock::{FailOn, MockPlugin, PluginOperation};
    use crate::ui::scripted::{Prompt, Reply};
    use crate::ui::Answer;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn configured_domains_used_verbatim() {
        let flags = ConfigFile {
            domains: Some(strings(&["b.com", "a.com", "b.com"])),
            ..Default::default()
        };
        let (ctx, display) = context_with(flags, vec![]);
        let installer = MockPlugin::installer("i").with_names(strings(&["other.com"]));
        let installer: Rc<dyn Installer> = Rc::new(installer);

        let outcome = collect(&ctx, Some(&installer)).unwrap();
        assert_eq!(outcome, Outcome::Proceed(strings(&["b.com", "a.com", "b.com"])));
        assert_eq!(display.questions_asked(), 0);
    }

    #[test]
    fn typed_without_installer() {
        let (ctx, _) = context_with(
            ConfigFile::default(),
            vec![Reply::Input(Answer::Ok("a.com, b.com c.com".to_string()))],
        );
        let outcome = collect(&ctx, None).unwrap();
        assert_eq!(outcome, Outcome::Proceed(strings(&["a.com", "b.com", "c.com"])));
    }

    #[test]
    fn checklist_from_installer_names() {
        let (ctx, display) = context_with(
            ConfigFile::default(),
            vec![Reply::Checklist(Answer::Ok(strings(&["a.com"])))],
        );
        let mock = MockPlugin::installer("i").with_names(strings(&["b.com", "a.com"]));
        let installer: Rc<dyn Installer> = Rc::new(mock.clone());

        let outcome = collect(&ctx, Some(&installer)).unwrap();
        assert_eq!(outcome, Outcome::Proceed(strings(&["a.com"])));
        assert_eq!(mock.operations(), vec![PluginOperation::GetAllNames]);
        assert!(matches!(
            &display.transcript()[0],
            Prompt::Checklist { tags, .. } if tags == &strings(&["a.com", "b.com"])
        ));
    }

    #[test]
    fn failing_installer_falls_back_to_typing() {
        let (ctx, display) = context_with(
            ConfigFile::default(),
            vec![Reply::Input(Answer::Ok("a.com".to_string()))],
        );
        let mock = MockPlugin::installer("i");
        mock.fail_on(FailOn::GetAllNames);
        let installer: Rc<dyn Installer> = Rc::new(mock);

        let outcome = collect(&ctx, Some(&installer)).unwrap();
        assert_eq!(outcome, Outcome::Proceed(strings(&["a.com"])));
        assert_eq!(display.notifications().len(), 1);
    }

    #[test]
    fn empty_is_quiet_stop() {
        let (ctx, _) = context_with(ConfigFile::default(), vec![Reply::Input(Answer::Cancel)]);
        assert_eq!(
            collect(&ctx, None).unwrap(),
            Outcome::QuietStop(StopReason::NoDomains)
        );

        let flags = ConfigFile {
            domains: Some(Vec::new()),
            ..Default::default()
        };
        let (ctx, _) = context_with(flags, vec![]);
        assert_eq!(
            collect(&ctx, None).unwrap(),
            Outcome::QuietStop(StopReason::NoDomains)
        );
    }

    #[test]
    fn unanswered_prompt_is_an_error() {
        let (ctx, _) = test_context();
        assert!(matches!(collect(&ctx, None), Err(EngineError::Display(_))));
    }
}
