//! End-to-end tests of the certificate workflow.
//!
//! The engine runs against mock plugins and a mock certificate authority,
//! with a scripted display answering every question.

use std::path::Path;
use std::rc::Rc;

use tempfile::TempDir;

use certward::acme::mock::{MockAuthority, MockOperation};
use certward::core::account::{AccountStore, FileAccountStore};
use certward::core::config::{Config, ConfigFile, DirsConfig};
use certward::core::paths::StoragePaths;
use certward::engine::{workflow, Collaborators, Context, Outcome, RunReport, Stage, StopReason};
use certward::plugins::mock::{MockPlugin, PluginOperation};
use certward::plugins::{Capability, Enhancement, PluginRegistry};
use certward::ui::scripted::{Prompt, Reply, ScriptedDisplay};
use certward::ui::Answer;

// =============================================================================
// Test Fixtures
// =============================================================================

struct Harness {
    _dir: TempDir,
    ctx: Context,
    display: Rc<ScriptedDisplay>,
    accounts: FileAccountStore,
    registry: PluginRegistry,
    authority: MockAuthority,
}

impl Harness {
    fn new(flags: ConfigFile, replies: Vec<Reply>) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let flags = ConfigFile {
            server: Some("mock://ca".to_string()),
            dirs: Some(dirs_in(dir.path())),
            ..flags
        };
        let config = Config::resolve(ConfigFile::default(), flags).expect("valid config");
        let display = Rc::new(ScriptedDisplay::new(replies));
        let ctx = Context::new(config, display.clone());
        let accounts = FileAccountStore::new(StoragePaths::from_config(ctx.config()));

        Self {
            _dir: dir,
            ctx,
            display,
            accounts,
            registry: PluginRegistry::new(),
            authority: MockAuthority::new("mock://ca"),
        }
    }

    fn with_plugin(mut self, name: &str, plugin: &MockPlugin) -> Self {
        self.registry
            .register(name, Rc::new(plugin.clone()), Capability::Authenticator)
            .expect("plugin registers");
        self
    }

    fn with_authority(mut self, authority: MockAuthority) -> Self {
        self.authority = authority;
        self
    }

    fn run(&self) -> RunReport {
        workflow::run(
            &self.ctx,
            &Collaborators {
                registry: &self.registry,
                accounts: &self.accounts,
                authority: &self.authority,
            },
        )
        .expect("workflow runs")
    }
}

fn dirs_in(root: &Path) -> DirsConfig {
    DirsConfig {
        config_dir: Some(root.join("etc")),
        work_dir: Some(root.join("work")),
        ..Default::default()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn with_email() -> ConfigFile {
    ConfigFile {
        email: Some("admin@example.com".to_string()),
        ..Default::default()
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn fully_interactive_run_installs_certificate() {
    let names = strings(&["www.example.com", "example.com", "blog.example.com"]);
    let both = MockPlugin::both("Web server")
        .with_names(names)
        .with_enhancements(vec![Enhancement::Redirect]);
    let manual = MockPlugin::authenticator("By hand");

    let harness = Harness::new(
        with_email(),
        vec![
            Reply::Menu(Answer::Ok(1)),
            Reply::Checklist(Answer::Ok(strings(&["example.com", "www.example.com"]))),
            Reply::YesNo(true),
            Reply::YesNo(true),
        ],
    )
    .with_plugin("alpha", &manual)
    .with_plugin("web", &both)
    .with_authority(MockAuthority::new("mock://ca").with_terms_of_service("mock://ca/terms"));

    let report = harness.run();

    assert_eq!(
        report.stages,
        vec![
            Stage::Init,
            Stage::SelectPlugins,
            Stage::CollectDomains,
            Stage::ValidateKey,
            Stage::Register,
            Stage::Acquire,
            Stage::Deploy,
            Stage::Enhance,
        ]
    );
    let done = match report.outcome {
        Outcome::Proceed(done) => done,
        other => panic!("expected completion, got {:?}", other),
    };
    assert!(done.installed);
    assert_eq!(done.domains, strings(&["example.com", "www.example.com"]));
    assert!(done.artifact.fullchain_path.exists());

    assert!(manual.operations().is_empty());
    assert!(both.operations().contains(&PluginOperation::DeployCert {
        domain: "www.example.com".to_string(),
        cert: done.artifact.cert_path.clone(),
        key: done.artifact.key_path.clone(),
    }));
    assert!(both.operations().contains(&PluginOperation::Enhance {
        domain: "example.com".to_string(),
        enhancement: Enhancement::Redirect,
    }));
    assert_eq!(harness.display.remaining(), 0);

    let account = harness.accounts.load("admin@example.com").unwrap();
    assert!(account.registration().unwrap().agreed_to_terms);
}

#[test]
fn sole_authenticator_needs_no_menu() {
    let plugin = MockPlugin::authenticator("Only");
    let harness = Harness::new(
        with_email(),
        vec![Reply::Input(Answer::Ok("example.com".to_string()))],
    )
    .with_plugin("only", &plugin);

    let report = harness.run();

    assert!(report.outcome.is_proceed());
    assert!(!harness
        .display
        .transcript()
        .iter()
        .any(|p| matches!(p, Prompt::Menu { .. })));
}

#[test]
fn declined_terms_stop_quietly() {
    let plugin = MockPlugin::authenticator("Only");
    let flags = ConfigFile {
        domains: Some(strings(&["example.com"])),
        ..with_email()
    };
    let harness = Harness::new(flags, vec![Reply::YesNo(false)])
        .with_plugin("only", &plugin)
        .with_authority(MockAuthority::new("mock://ca").with_terms_of_service("mock://ca/terms"));

    let report = harness.run();

    assert!(matches!(
        report.outcome,
        Outcome::QuietStop(StopReason::RegistrationFailed(_))
    ));
    assert_eq!(report.exit_code(), 0);
    assert!(!report.entered(Stage::Acquire));
    assert!(!harness
        .authority
        .operations()
        .iter()
        .any(|op| matches!(op, MockOperation::RequestChallenges { .. })));
}

#[test]
fn agree_tos_flag_skips_the_prompt() {
    let plugin = MockPlugin::authenticator("Only");
    let flags = ConfigFile {
        domains: Some(strings(&["example.com"])),
        agree_tos: Some(true),
        ..with_email()
    };
    let harness = Harness::new(flags, vec![])
        .with_plugin("only", &plugin)
        .with_authority(MockAuthority::new("mock://ca").with_terms_of_service("mock://ca/terms"));

    let report = harness.run();

    assert!(report.outcome.is_proceed());
    assert_eq!(harness.display.questions_asked(), 0);
}

#[test]
fn no_account_chosen_stops_before_selection() {
    let plugin = MockPlugin::authenticator("Only");
    let harness = Harness::new(ConfigFile::default(), vec![Reply::Input(Answer::Cancel)])
        .with_plugin("only", &plugin);

    let report = harness.run();

    assert_eq!(report.outcome, Outcome::QuietStop(StopReason::AccountDeclined));
    assert_eq!(report.stages, vec![Stage::Init]);
    assert!(plugin.operations().is_empty());
}

#[test]
fn unknown_authenticator_touches_nothing() {
    let plugin = MockPlugin::both("Both");
    let flags = ConfigFile {
        authenticator: Some("standalone".to_string()),
        domains: Some(strings(&["example.com"])),
        ..with_email()
    };
    let harness = Harness::new(flags, vec![]).with_plugin("both", &plugin);

    let report = harness.run();

    assert_eq!(report.exit_code(), 1);
    assert!(plugin.operations().is_empty());
    assert!(harness.authority.operations().is_empty());
}
