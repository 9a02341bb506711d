//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! certward has no subcommands. The flags pick one of four modes (see
//! [`Mode`]); everything else is configuration layered over the config file.
//!
//! # Global Flags
//!
//! - `--help` / `-h`: Show help
//! - `--version` / `-V`: Show version
//! - `--config <file>`: Read this config file
//! - `--debug`: Enable debug logging
//! - `--completions <shell>`: Print a completion script and exit

use std::path::PathBuf;

use clap::Parser;

use crate::core::config::{ApacheConfig, ConfigFile, DirsConfig, NginxConfig};

/// certward - obtain and install domain-validated certificates
#[derive(Parser, Debug)]
#[command(name = "certward")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    # Obtain and install a certificate, choosing everything interactively
    sudo certward

    # Obtain a certificate for two names without installing it
    sudo certward -a manual -d example.com www.example.com -m admin@example.com

    # Show the recorded configuration changes, then undo the last two
    sudo certward -v
    sudo certward -b 2")]
pub struct Cli {
    /// Domains to request a certificate for
    #[arg(short, long, value_name = "DOMAIN", num_args = 1..)]
    pub domains: Option<Vec<String>>,

    /// Certificate authority directory URL
    #[arg(short, long, value_name = "URL")]
    pub server: Option<String>,

    /// Authenticator plugin to use
    #[arg(short, long, value_name = "NAME")]
    pub authenticator: Option<String>,

    /// Path to the authorized key file
    #[arg(short = 'k', long, value_name = "PATH")]
    pub authkey: Option<PathBuf>,

    /// Email address used for account registration
    #[arg(short = 'm', long, value_name = "EMAIL")]
    pub email: Option<String>,

    /// Size of generated RSA keys
    #[arg(short = 'B', long, value_name = "N")]
    pub rsa_key_size: Option<u32>,

    /// Revoke a certificate from a menu
    #[arg(short = 'R', long)]
    pub revoke: bool,

    /// Revoke a specific certificate
    #[arg(long, value_name = "PATH")]
    pub revoke_certificate: Option<PathBuf>,

    /// Revoke all certificates generated by the provided authorized key
    #[arg(long, value_name = "PATH")]
    pub revoke_key: Option<PathBuf>,

    /// Revert configuration N number of checkpoints
    #[arg(short = 'b', long, value_name = "N", default_value_t = 0)]
    pub rollback: usize,

    /// View checkpoints and associated configuration changes
    #[arg(short = 'v', long)]
    pub view_config_changes: bool,

    /// Redirect all HTTP traffic to HTTPS for the new certificate
    #[arg(short = 'r', long, conflicts_with = "no_redirect")]
    pub redirect: bool,

    /// Never redirect HTTP traffic to HTTPS
    #[arg(long)]
    pub no_redirect: bool,

    /// Turn off confirmation screens
    #[arg(long)]
    pub no_confirm: bool,

    /// Agree to the certificate authority's terms of service
    #[arg(short = 'e', long)]
    pub agree_tos: bool,

    /// Use the text interface (the only one available)
    #[arg(short = 't', long)]
    pub text: bool,

    /// Never prompt; questions without a default fail
    #[arg(long)]
    pub non_interactive: bool,

    /// Configuration and account storage
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Working data such as the run lock
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Installer checkpoints
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Generated private keys
    #[arg(long, value_name = "DIR")]
    pub key_dir: Option<PathBuf>,

    /// Issued certificates
    #[arg(long, value_name = "DIR")]
    pub cert_dir: Option<PathBuf>,

    /// Suffix for SSL virtual host files created by installers
    #[arg(long, value_name = "EXT")]
    pub le_vhost_ext: Option<String>,

    /// Where to write the certificate
    #[arg(long, value_name = "PATH")]
    pub cert_path: Option<PathBuf>,

    /// Where to write the chain
    #[arg(long, value_name = "PATH")]
    pub chain_path: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help_heading = "Apache")]
    pub apache_server_root: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help_heading = "Apache")]
    pub apache_mod_ssl_conf: Option<PathBuf>,

    #[arg(long, value_name = "CMD", help_heading = "Apache")]
    pub apache_ctl: Option<String>,

    #[arg(long, value_name = "CMD", help_heading = "Apache")]
    pub apache_enmod: Option<String>,

    #[arg(long, value_name = "PATH", help_heading = "Apache")]
    pub apache_init_script: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help_heading = "Nginx")]
    pub nginx_server_root: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help_heading = "Nginx")]
    pub nginx_mod_ssl_conf: Option<PathBuf>,

    #[arg(long, value_name = "CMD", help_heading = "Nginx")]
    pub nginx_ctl: Option<String>,

    /// Read configuration from this file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

/// What a run does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// List installer checkpoints.
    ViewConfigChanges,
    /// Certificate revocation.
    Revoke,
    /// Undo this many installer checkpoints.
    Rollback(usize),
    /// The certificate workflow.
    Obtain,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// The mode selected by the flags. Earlier modes win.
    pub fn mode(&self) -> Mode {
        if self.view_config_changes {
            Mode::ViewConfigChanges
        } else if self.revoke || self.revoke_certificate.is_some() || self.revoke_key.is_some() {
            Mode::Revoke
        } else if self.rollback > 0 {
            Mode::Rollback(self.rollback)
        } else {
            Mode::Obtain
        }
    }

    /// `--redirect` / `--no-redirect`, if either was given.
    pub fn redirect_flag(&self) -> Option<bool> {
        if self.redirect {
            Some(true)
        } else if self.no_redirect {
            Some(false)
        } else {
            None
        }
    }

    /// The configuration layer made of the flags that were given.
    pub fn to_overlay(&self) -> ConfigFile {
        ConfigFile {
            server: self.server.clone(),
            email: self.email.clone(),
            authenticator: self.authenticator.clone(),
            domains: self.domains.clone(),
            rsa_key_size: self.rsa_key_size,
            redirect: self.redirect_flag(),
            agree_tos: self.agree_tos.then_some(true),
            no_confirm: self.no_confirm.then_some(true),
            authkey: self.authkey.clone(),
            le_vhost_ext: self.le_vhost_ext.clone(),
            cert_path: self.cert_path.clone(),
            chain_path: self.chain_path.clone(),
            dirs: self.dirs_overlay(),
            apache: self.apache_overlay(),
            nginx: self.nginx_overlay(),
        }
    }

    fn dirs_overlay(&self) -> Option<DirsConfig> {
        let dirs = DirsConfig {
            config_dir: self.config_dir.clone(),
            work_dir: self.work_dir.clone(),
            backup_dir: self.backup_dir.clone(),
            key_dir: self.key_dir.clone(),
            cert_dir: self.cert_dir.clone(),
        };
        (dirs != DirsConfig::default()).then_some(dirs)
    }

    fn apache_overlay(&self) -> Option<ApacheConfig> {
        let apache = ApacheConfig {
            server_root: self.apache_server_root.clone(),
            mod_ssl_conf: self.apache_mod_ssl_conf.clone(),
            ctl: self.apache_ctl.clone(),
            enmod: self.apache_enmod.clone(),
            init_script: self.apache_init_script.clone(),
        };
        (apache != ApacheConfig::default()).then_some(apache)
    }

    fn nginx_overlay(&self) -> Option<NginxConfig> {
        let nginx = NginxConfig {
            server_root: self.nginx_server_root.clone(),
            mod_ssl_conf: self.nginx_mod_ssl_conf.clone(),
            ctl: self.nginx_ctl.clone(),
        };
        (nginx != NginxConfig::default()).then_some(nginx)
    }
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
