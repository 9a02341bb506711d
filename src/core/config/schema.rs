//! core::config::schema
//!
//! On-disk configuration schema.
//!
//! # Layers
//!
//! The same [`ConfigFile`] shape is used for the file on disk and for the
//! overlay built from command-line flags. Every field is optional; a layer
//! only says what it wants to change. [`ConfigFile::overlay`] merges two
//! layers, the upper one winning field by field.
//!
//! # Example
//!
//! ```toml
//! server = "https://acme-v02.api.letsencrypt.org/directory"
//! email = "admin@example.com"
//! authenticator = "manual"
//! rsa_key_size = 4096
//! redirect = true
//!
//! [dirs]
//! config_dir = "/etc/certward"
//! work_dir = "/var/lib/certward"
//!
//! [nginx]
//! server_root = "/usr/local/etc/nginx"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// One configuration layer (file or command line).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Certificate authority directory URL
    pub server: Option<String>,

    /// Email used for account registration
    pub email: Option<String>,

    /// Authenticator plugin name
    pub authenticator: Option<String>,

    /// Domains to request a certificate for
    pub domains: Option<Vec<String>>,

    /// Size of newly generated RSA keys
    pub rsa_key_size: Option<u32>,

    /// Redirect HTTP to HTTPS after installation
    pub redirect: Option<bool>,

    /// Agree to the CA's terms of service without asking
    pub agree_tos: Option<bool>,

    /// Skip confirmation screens
    pub no_confirm: Option<bool>,

    /// PEM key to use for a newly created account
    pub authkey: Option<PathBuf>,

    /// Suffix for generated SSL virtual host files
    pub le_vhost_ext: Option<String>,

    /// Where the leaf certificate is written
    pub cert_path: Option<PathBuf>,

    /// Where the chain is written
    pub chain_path: Option<PathBuf>,

    /// Storage directories
    pub dirs: Option<DirsConfig>,

    /// Apache-specific locations
    pub apache: Option<ApacheConfig>,

    /// Nginx-specific locations
    pub nginx: Option<NginxConfig>,
}

/// Storage directories.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DirsConfig {
    /// Configuration and account storage
    pub config_dir: Option<PathBuf>,
    /// Working data (locks, temporary files)
    pub work_dir: Option<PathBuf>,
    /// Installer checkpoints
    pub backup_dir: Option<PathBuf>,
    /// Generated private keys
    pub key_dir: Option<PathBuf>,
    /// Issued certificates
    pub cert_dir: Option<PathBuf>,
}

/// Apache server locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ApacheConfig {
    pub server_root: Option<PathBuf>,
    pub mod_ssl_conf: Option<PathBuf>,
    pub ctl: Option<String>,
    pub enmod: Option<String>,
    pub init_script: Option<PathBuf>,
}

/// Nginx server locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NginxConfig {
    pub server_root: Option<PathBuf>,
    pub mod_ssl_conf: Option<PathBuf>,
    pub ctl: Option<String>,
}

/// Pick the upper value when present.
fn pick<T>(lower: Option<T>, upper: Option<T>) -> Option<T> {
    upper.or(lower)
}

impl ConfigFile {
    /// Merge `upper` on top of `self`; fields set in `upper` win.
    pub fn overlay(self, upper: ConfigFile) -> ConfigFile {
        ConfigFile {
            server: pick(self.server, upper.server),
            email: pick(self.email, upper.email),
            authenticator: pick(self.authenticator, upper.authenticator),
            domains: pick(self.domains, upper.domains),
            rsa_key_size: pick(self.rsa_key_size, upper.rsa_key_size),
            redirect: pick(self.redirect, upper.redirect),
            agree_tos: pick(self.agree_tos, upper.agree_tos),
            no_confirm: pick(self.no_confirm, upper.no_confirm),
            authkey: pick(self.authkey, upper.authkey),
            le_vhost_ext: pick(self.le_vhost_ext, upper.le_vhost_ext),
            cert_path: pick(self.cert_path, upper.cert_path),
            chain_path: pick(self.chain_path, upper.chain_path),
            dirs: merge_section(self.dirs, upper.dirs, DirsConfig::overlay),
            apache: merge_section(self.apache, upper.apache, ApacheConfig::overlay),
            nginx: merge_section(self.nginx, upper.nginx, NginxConfig::overlay),
        }
    }

    /// Validate the values present in this layer.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(server) = &self.server {
            if server.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "server cannot be empty".to_string(),
                ));
            }
        }

        if let Some(size) = self.rsa_key_size {
            if size < super::MIN_RSA_KEY_SIZE {
                return Err(ConfigError::InvalidValue(format!(
                    "rsa_key_size {} is too small, must be at least {}",
                    size,
                    super::MIN_RSA_KEY_SIZE
                )));
            }
        }

        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid email address '{}'",
                    email
                )));
            }
        }

        if let Some(name) = &self.authenticator {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "authenticator cannot be empty".to_string(),
                ));
            }
        }

        if let Some(domains) = &self.domains {
            if domains.iter().any(|d| d.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(
                    "domains cannot contain empty names".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn merge_section<T>(lower: Option<T>, upper: Option<T>, merge: fn(T, T) -> T) -> Option<T> {
    match (lower, upper) {
        (Some(l), Some(u)) => Some(merge(l, u)),
        (l, u) => u.or(l),
    }
}

impl DirsConfig {
    fn overlay(self, upper: DirsConfig) -> DirsConfig {
        DirsConfig {
            config_dir: pick(self.config_dir, upper.config_dir),
            work_dir: pick(self.work_dir, upper.work_dir),
            backup_dir: pick(self.backup_dir, upper.backup_dir),
            key_dir: pick(self.key_dir, upper.key_dir),
            cert_dir: pick(self.cert_dir, upper.cert_dir),
        }
    }
}

impl ApacheConfig {
    fn overlay(self, upper: ApacheConfig) -> ApacheConfig {
        ApacheConfig {
            server_root: pick(self.server_root, upper.server_root),
            mod_ssl_conf: pick(self.mod_ssl_conf, upper.mod_ssl_conf),
            ctl: pick(self.ctl, upper.ctl),
            enmod: pick(self.enmod, upper.enmod),
            init_script: pick(self.init_script, upper.init_script),
        }
    }
}

impl NginxConfig {
    fn overlay(self, upper: NginxConfig) -> NginxConfig {
        NginxConfig {
            server_root: pick(self.server_root, upper.server_root),
            mod_ssl_conf: pick(self.mod_ssl_conf, upper.mod_ssl_conf),
            ctl: pick(self.ctl, upper.ctl),
        }
    }
}

/// Loose shape check for an email address: `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(|c| c.is_whitespace() || c == '/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_empty() {
        let config = ConfigFile::default();
        assert!(config.server.is_none());
        assert!(config.dirs.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overlay_upper_wins() {
        let lower = ConfigFile {
            server: Some("https://lower".to_string()),
            email: Some("lower@example.com".to_string()),
            ..Default::default()
        };
        let upper = ConfigFile {
            server: Some("https://upper".to_string()),
            ..Default::default()
        };

        let merged = lower.overlay(upper);
        assert_eq!(merged.server.as_deref(), Some("https://upper"));
        assert_eq!(merged.email.as_deref(), Some("lower@example.com"));
    }

    #[test]
    fn overlay_merges_sections_field_by_field() {
        let lower = ConfigFile {
            dirs: Some(DirsConfig {
                config_dir: Some(PathBuf::from("/etc/a")),
                work_dir: Some(PathBuf::from("/var/a")),
                ..Default::default()
            }),
            ..Default::default()
        };
        let upper = ConfigFile {
            dirs: Some(DirsConfig {
                work_dir: Some(PathBuf::from("/var/b")),
                ..Default::default()
            }),
            ..Default::default()
        };

        let dirs = lower.overlay(upper).dirs.unwrap();
        assert_eq!(dirs.config_dir, Some(PathBuf::from("/etc/a")));
        assert_eq!(dirs.work_dir, Some(PathBuf::from("/var/b")));
    }

    #[test]
    fn small_key_rejected() {
        let config = ConfigFile {
            rsa_key_size: Some(1024),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_server_rejected() {
        let config = ConfigFile {
            server: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_domain_rejected() {
        let config = ConfigFile {
            domains: Some(vec!["a.com".to_string(), "".to_string()]),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("admin@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));
        assert!(!is_valid_email("admin"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("admin@localhost"));
        assert!(!is_valid_email("admin@.com"));
        assert!(!is_valid_email("ad min@example.com"));
        assert!(!is_valid_email("../x@example.com/"));
    }

    #[test]
    fn reject_unknown_fields() {
        let toml = r#"
            server = "https://example"
            unknown_field = true
        "#;
        let result: Result<ConfigFile, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn parses_sections() {
        let toml = r#"
            email = "admin@example.com"
            redirect = true

            [dirs]
            config_dir = "/tmp/certward"

            [nginx]
            ctl = "/usr/sbin/nginx"
        "#;
        let config: ConfigFile = toml::from_str(toml).unwrap();
        assert_eq!(config.redirect, Some(true));
        assert_eq!(
            config.dirs.unwrap().config_dir,
            Some(PathBuf::from("/tmp/certward"))
        );
        assert_eq!(config.nginx.unwrap().ctl.as_deref(), Some("/usr/sbin/nginx"));
    }
}
