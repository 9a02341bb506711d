//! core::config
//!
//! Configuration loading and the resolved, immutable run configuration.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Config file
//! 3. Command-line flags (passed in as a [`ConfigFile`] overlay)
//!
//! # Config File Locations
//!
//! Searched in order, first existing file wins:
//! 1. The path given with `--config` (must exist)
//! 2. `$CERTWARD_CONFIG` if set
//! 3. `<user config dir>/certward/cli.toml`
//! 4. `/etc/certward/cli.toml`
//!
//! A missing file is not an error; defaults are used.
//!
//! # Example
//!
//! ```
//! use certward::core::config::{Config, ConfigFile};
//!
//! let flags = ConfigFile {
//!     email: Some("admin@example.com".to_string()),
//!     ..Default::default()
//! };
//! let config = Config::resolve(ConfigFile::default(), flags).unwrap();
//!
//! assert_eq!(config.email(), Some("admin@example.com"));
//! assert_eq!(config.rsa_key_size(), 2048);
//! ```

pub mod schema;

pub use schema::{ApacheConfig, ConfigFile, DirsConfig, NginxConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default certificate authority directory.
pub const DEFAULT_SERVER: &str = "https://acme-v02.api.letsencrypt.org/directory";

/// Smallest accepted RSA key size.
pub const MIN_RSA_KEY_SIZE: u32 = 2048;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CERTWARD_CONFIG";

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/certward/cli.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Storage directories after defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirs {
    pub config_dir: PathBuf,
    pub work_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub key_dir: PathBuf,
    pub cert_dir: PathBuf,
}

/// Apache locations after defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApacheSettings {
    pub server_root: PathBuf,
    pub mod_ssl_conf: PathBuf,
    pub ctl: String,
    pub enmod: String,
    pub init_script: PathBuf,
}

/// Nginx locations after defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NginxSettings {
    pub server_root: PathBuf,
    pub mod_ssl_conf: PathBuf,
    pub ctl: String,
}

/// The resolved configuration for one run.
///
/// Built once at startup and never mutated afterwards; every component reads
/// it through the accessors below.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    server: String,
    email: Option<String>,
    authenticator: Option<String>,
    domains: Option<Vec<String>>,
    rsa_key_size: u32,
    redirect: Option<bool>,
    agree_tos: bool,
    no_confirm: bool,
    authkey: Option<PathBuf>,
    le_vhost_ext: String,
    cert_path: PathBuf,
    chain_path: PathBuf,
    dirs: Dirs,
    apache: ApacheSettings,
    nginx: NginxSettings,
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load the config file (if any) and apply `flags` on top.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file is missing, if a file
    /// exists but cannot be parsed, or if a resolved value is invalid.
    pub fn load(explicit: Option<&Path>, flags: ConfigFile) -> Result<Config, ConfigError> {
        let (file, path) = match Self::locate(explicit)? {
            Some(path) => (Self::read_config_file(&path)?, Some(path)),
            None => (ConfigFile::default(), None),
        };

        let mut config = Self::resolve(file, flags)?;
        config.loaded_from = path;
        Ok(config)
    }

    /// Find the config file to read.
    fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
        // 1. --config must exist if given
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                });
            }
            return Ok(Some(path.to_path_buf()));
        }

        // 2. $CERTWARD_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        // 3. user config dir
        if let Some(dir) = dirs::config_dir() {
            let path = dir.join("certward/cli.toml");
            if path.exists() {
                return Ok(Some(path));
            }
        }

        // 4. system-wide
        let system = PathBuf::from(SYSTEM_CONFIG_PATH);
        if system.exists() {
            return Ok(Some(system));
        }

        Ok(None)
    }

    /// Read and parse a config file.
    fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Merge `flags` over `file`, validate, and fill in defaults.
    pub fn resolve(file: ConfigFile, flags: ConfigFile) -> Result<Config, ConfigError> {
        file.validate()?;
        flags.validate()?;
        let merged = file.overlay(flags);

        let dirs = merged.dirs.unwrap_or_default();
        let config_dir = dirs
            .config_dir
            .unwrap_or_else(|| PathBuf::from("/etc/certward"));
        let work_dir = dirs
            .work_dir
            .unwrap_or_else(|| PathBuf::from("/var/lib/certward"));
        let backup_dir = dirs.backup_dir.unwrap_or_else(|| work_dir.join("backups"));
        let key_dir = dirs.key_dir.unwrap_or_else(|| config_dir.join("keys"));
        let cert_dir = dirs.cert_dir.unwrap_or_else(|| config_dir.join("certs"));

        let apache = merged.apache.unwrap_or_default();
        let nginx = merged.nginx.unwrap_or_default();

        Ok(Config {
            server: merged.server.unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            email: merged.email,
            authenticator: merged.authenticator,
            domains: merged.domains,
            rsa_key_size: merged.rsa_key_size.unwrap_or(MIN_RSA_KEY_SIZE),
            redirect: merged.redirect,
            agree_tos: merged.agree_tos.unwrap_or(false),
            no_confirm: merged.no_confirm.unwrap_or(false),
            authkey: merged.authkey,
            le_vhost_ext: merged
                .le_vhost_ext
                .unwrap_or_else(|| "-le-ssl.conf".to_string()),
            cert_path: merged
                .cert_path
                .unwrap_or_else(|| cert_dir.join("cert-certward.pem")),
            chain_path: merged
                .chain_path
                .unwrap_or_else(|| cert_dir.join("chain-certward.pem")),
            apache: ApacheSettings {
                server_root: apache
                    .server_root
                    .unwrap_or_else(|| PathBuf::from("/etc/apache2")),
                mod_ssl_conf: apache
                    .mod_ssl_conf
                    .unwrap_or_else(|| config_dir.join("options-ssl.conf")),
                ctl: apache.ctl.unwrap_or_else(|| "apache2ctl".to_string()),
                enmod: apache.enmod.unwrap_or_else(|| "a2enmod".to_string()),
                init_script: apache
                    .init_script
                    .unwrap_or_else(|| PathBuf::from("/etc/init.d/apache2")),
            },
            nginx: NginxSettings {
                server_root: nginx
                    .server_root
                    .unwrap_or_else(|| PathBuf::from("/etc/nginx")),
                mod_ssl_conf: nginx
                    .mod_ssl_conf
                    .unwrap_or_else(|| config_dir.join("options-ssl-nginx.conf")),
                ctl: nginx.ctl.unwrap_or_else(|| "nginx".to_string()),
            },
            dirs: Dirs {
                config_dir,
                work_dir,
                backup_dir,
                key_dir,
                cert_dir,
            },
            loaded_from: None,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Certificate authority directory URL.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Email used for registration, if configured.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Explicitly requested authenticator plugin.
    pub fn authenticator(&self) -> Option<&str> {
        self.authenticator.as_deref()
    }

    /// Explicitly requested domains, in the order given.
    pub fn domains(&self) -> Option<&[String]> {
        self.domains.as_deref()
    }

    pub fn rsa_key_size(&self) -> u32 {
        self.rsa_key_size
    }

    /// `Some(true)` to redirect, `Some(false)` to leave HTTP alone, `None` to
    /// ask the operator.
    pub fn redirect(&self) -> Option<bool> {
        self.redirect
    }

    pub fn agree_tos(&self) -> bool {
        self.agree_tos
    }

    pub fn no_confirm(&self) -> bool {
        self.no_confirm
    }

    /// PEM key to adopt for a newly created account.
    pub fn authkey(&self) -> Option<&Path> {
        self.authkey.as_deref()
    }

    pub fn le_vhost_ext(&self) -> &str {
        &self.le_vhost_ext
    }

    pub fn cert_path(&self) -> &Path {
        &self.cert_path
    }

    pub fn chain_path(&self) -> &Path {
        &self.chain_path
    }

    pub fn dirs(&self) -> &Dirs {
        &self.dirs
    }

    pub fn apache(&self) -> &ApacheSettings {
        &self.apache
    }

    pub fn nginx(&self) -> &NginxSettings {
        &self.nginx
    }

    /// Get the path of the config file that was read, if any.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}
