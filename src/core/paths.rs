//! core::paths
//!
//! Centralized path routing for certward storage locations.
//!
//! # Architecture
//!
//! Every location certward reads or writes is computed here from the resolved
//! [`Config`], so no other module joins path fragments by hand.
//!
//! # Storage Layout
//!
//! - `<config_dir>/accounts/<email>/` - One directory per account
//! - `<config_dir>/csr/` - Certificate signing requests
//! - `<key_dir>/` - Generated domain keys
//! - `<cert_dir>/` - Issued certificates and chains
//! - `<work_dir>/.certward.lock` - Exclusive run lock
//! - `<backup_dir>/<checkpoint>/` - Installer checkpoints
//!
//! # Example
//!
//! ```
//! use certward::core::config::{Config, ConfigFile};
//! use certward::core::paths::StoragePaths;
//! use std::path::PathBuf;
//!
//! let config = Config::resolve(ConfigFile::default(), ConfigFile::default()).unwrap();
//! let paths = StoragePaths::from_config(&config);
//!
//! assert_eq!(paths.accounts_dir(), PathBuf::from("/etc/certward/accounts"));
//! assert_eq!(paths.lock_path(), PathBuf::from("/var/lib/certward/.certward.lock"));
//! ```

use std::path::{Path, PathBuf};

use crate::core::config::Config;

/// Centralized path routing for certward storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    config_dir: PathBuf,
    work_dir: PathBuf,
    backup_dir: PathBuf,
    key_dir: PathBuf,
    cert_dir: PathBuf,
    cert_path: PathBuf,
    chain_path: PathBuf,
}

impl StoragePaths {
    /// Derive all storage paths from the resolved configuration.
    pub fn from_config(config: &Config) -> Self {
        let dirs = config.dirs();
        Self {
            config_dir: dirs.config_dir.clone(),
            work_dir: dirs.work_dir.clone(),
            backup_dir: dirs.backup_dir.clone(),
            key_dir: dirs.key_dir.clone(),
            cert_dir: dirs.cert_dir.clone(),
            cert_path: config.cert_path().to_path_buf(),
            chain_path: config.chain_path().to_path_buf(),
        }
    }

    /// Directory holding one sub-directory per account.
    pub fn accounts_dir(&self) -> PathBuf {
        self.config_dir.join("accounts")
    }

    /// Directory of the account registered with `email`.
    pub fn account_dir(&self, email: &str) -> PathBuf {
        self.accounts_dir().join(email)
    }

    /// Directory for certificate signing requests.
    pub fn csr_dir(&self) -> PathBuf {
        self.config_dir.join("csr")
    }

    /// Directory for generated domain keys.
    pub fn key_dir(&self) -> &Path {
        &self.key_dir
    }

    /// Directory for issued certificates.
    pub fn cert_dir(&self) -> &Path {
        &self.cert_dir
    }

    /// Template path for the leaf certificate.
    pub fn cert_path(&self) -> &Path {
        &self.cert_path
    }

    /// Template path for the chain.
    pub fn chain_path(&self) -> &Path {
        &self.chain_path
    }

    /// Template path for leaf + chain concatenated.
    pub fn fullchain_path(&self) -> PathBuf {
        self.cert_dir.join("fullchain-certward.pem")
    }

    /// Directory holding installer checkpoints.
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Exclusive run lock.
    pub fn lock_path(&self) -> PathBuf {
        self.work_dir.join(".certward.lock")
    }

    /// Working directory.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{ConfigFile, DirsConfig};

    fn paths_under(root: &str) -> StoragePaths {
        let flags = ConfigFile {
            dirs: Some(DirsConfig {
                config_dir: Some(PathBuf::from(root).join("etc")),
                work_dir: Some(PathBuf::from(root).join("var")),
                ..Default::default()
            }),
            ..Default::default()
        };
        StoragePaths::from_config(&Config::resolve(ConfigFile::default(), flags).unwrap())
    }

    #[test]
    fn account_dir_is_per_email() {
        let paths = paths_under("/tmp/x");
        assert_eq!(
            paths.account_dir("admin@example.com"),
            PathBuf::from("/tmp/x/etc/accounts/admin@example.com")
        );
    }

    #[test]
    fn derived_dirs() {
        let paths = paths_under("/tmp/x");
        assert_eq!(paths.csr_dir(), PathBuf::from("/tmp/x/etc/csr"));
        assert_eq!(paths.key_dir(), Path::new("/tmp/x/etc/keys"));
        assert_eq!(paths.backup_dir(), Path::new("/tmp/x/var/backups"));
        assert_eq!(paths.lock_path(), PathBuf::from("/tmp/x/var/.certward.lock"));
        assert_eq!(
            paths.fullchain_path(),
            PathBuf::from("/tmp/x/etc/certs/fullchain-certward.pem")
        );
    }
}
