//! core::account
//!
//! Local accounts: an email, a private key, and the registration record the
//! certificate authority returned.
//!
//! # Storage
//!
//! [`FileAccountStore`] keeps one directory per account:
//!
//! - `<config_dir>/accounts/<email>/key.pem` - account key (0600)
//! - `<config_dir>/accounts/<email>/account.json` - metadata and registration
//!
//! Both files are private and written atomically.
//!
//! # Example
//!
//! ```no_run
//! use certward::core::account::{AccountStore, FileAccountStore};
//! use certward::core::config::{Config, ConfigFile};
//! use certward::core::paths::StoragePaths;
//!
//! let config = Config::resolve(ConfigFile::default(), ConfigFile::default()).unwrap();
//! let store = FileAccountStore::new(StoragePaths::from_config(&config));
//!
//! let account = match store.load("admin@example.com") {
//!     Ok(account) => account,
//!     Err(_) => store.create("admin@example.com", None).unwrap(),
//! };
//! assert!(account.registration().is_none() || account.is_registered());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::config::schema::is_valid_email;
use crate::core::files::{make_or_verify_dir, write_atomic, PRIVATE_DIR_MODE, PRIVATE_MODE};
use crate::core::paths::StoragePaths;
use crate::crypto::{self, CryptoError, Key};

/// Errors from account storage.
#[derive(Debug, Error)]
pub enum AccountError {
    /// No account is stored for this email.
    #[error("no account found for '{0}'")]
    NotFound(String),

    /// The email cannot be used to name an account.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// An account file exists but cannot be understood.
    #[error("corrupt account data at '{path}': {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Reading or writing account files failed.
    #[error("account storage error at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The account key is unusable.
    #[error(transparent)]
    Key(#[from] CryptoError),
}

/// The certificate authority's record of a registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Account URL at the certificate authority
    pub uri: String,
    /// Contact URIs (`mailto:...`)
    #[serde(default)]
    pub contact: Vec<String>,
    /// Terms of service the authority asks the account to accept
    #[serde(default)]
    pub terms_of_service: Option<String>,
    /// Whether those terms have been accepted
    #[serde(default)]
    pub agreed_to_terms: bool,
}

/// A local account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    email: Option<String>,
    key: Key,
    registration: Option<Registration>,
    created_at: DateTime<Utc>,
}

impl Account {
    /// Create an unregistered account.
    pub fn new(email: Option<String>, key: Key) -> Self {
        Self {
            email,
            key,
            registration: None,
            created_at: Utc::now(),
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Registration record, `None` until the authority accepts the account.
    pub fn registration(&self) -> Option<&Registration> {
        self.registration.as_ref()
    }

    pub fn is_registered(&self) -> bool {
        self.registration.is_some()
    }

    /// Record a successful registration.
    pub fn set_registration(&mut self, registration: Registration) {
        self.registration = Some(registration);
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Stable identifier: SHA-256 of the key, hex encoded.
    pub fn id(&self) -> String {
        thumbprint(&self.key.pem)
    }

    /// Short human-readable label for menus.
    pub fn label(&self) -> String {
        let id = self.id();
        format!(
            "{} ({}, created {})",
            self.email.as_deref().unwrap_or("no email"),
            &id[..8],
            self.created_at.format("%Y-%m-%d")
        )
    }
}

/// Hex SHA-256 digest of a PEM key.
pub fn thumbprint(key_pem: &str) -> String {
    hex::encode(Sha256::digest(key_pem.as_bytes()))
}

/// Account persistence.
///
/// The workflow only ever loads, creates and saves accounts through this
/// trait; where and how they are stored is up to the implementation.
pub trait AccountStore {
    /// All stored accounts, sorted by email.
    fn find_all(&self) -> Result<Vec<Account>, AccountError>;

    /// Load the account bound to `email`.
    fn load(&self, email: &str) -> Result<Account, AccountError>;

    /// Create and persist a new account for `email`, using `key` if given and
    /// a freshly generated key otherwise.
    fn create(&self, email: &str, key: Option<Key>) -> Result<Account, AccountError>;

    /// Persist changes to an existing account (e.g. a new registration).
    fn save(&self, account: &Account) -> Result<(), AccountError>;
}

/// On-disk shape of `account.json`.
#[derive(Debug, Serialize, Deserialize)]
struct AccountRecord {
    email: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    registration: Option<Registration>,
}

const KEY_FILE: &str = "key.pem";
const RECORD_FILE: &str = "account.json";

/// File-based account store under `<config_dir>/accounts/`.
#[derive(Debug, Clone)]
pub struct FileAccountStore {
    paths: StoragePaths,
}

impl FileAccountStore {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    fn account_dir(&self, email: &str) -> Result<PathBuf, AccountError> {
        if !is_valid_email(email) {
            return Err(AccountError::InvalidEmail(email.to_string()));
        }
        Ok(self.paths.account_dir(email))
    }

    fn read_account(dir: &Path) -> Result<Account, AccountError> {
        let record_path = dir.join(RECORD_FILE);
        let contents = fs::read_to_string(&record_path).map_err(|e| AccountError::Io {
            path: record_path.clone(),
            source: e,
        })?;
        let record: AccountRecord =
            serde_json::from_str(&contents).map_err(|e| AccountError::Corrupt {
                path: record_path.clone(),
                message: e.to_string(),
            })?;

        let key = crypto::read_key(&dir.join(KEY_FILE))?;

        Ok(Account {
            email: Some(record.email),
            key,
            registration: record.registration,
            created_at: record.created_at,
        })
    }

    fn write_record(&self, dir: &Path, account: &Account, email: &str) -> Result<(), AccountError> {
        let record = AccountRecord {
            email: email.to_string(),
            created_at: account.created_at,
            registration: account.registration.clone(),
        };
        let json = serde_json::to_string_pretty(&record).map_err(|e| AccountError::Corrupt {
            path: dir.join(RECORD_FILE),
            message: e.to_string(),
        })?;

        let path = dir.join(RECORD_FILE);
        write_atomic(&path, json.as_bytes(), PRIVATE_MODE)
            .map_err(|e| AccountError::Io { path, source: e })
    }
}

impl AccountStore for FileAccountStore {
    fn find_all(&self) -> Result<Vec<Account>, AccountError> {
        let dir = self.paths.accounts_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|e| AccountError::Io {
            path: dir.clone(),
            source: e,
        })?;

        let mut accounts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AccountError::Io {
                path: dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            match Self::read_account(&path) {
                Ok(account) => accounts.push(account),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable account"),
            }
        }

        accounts.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(accounts)
    }

    fn load(&self, email: &str) -> Result<Account, AccountError> {
        let dir = self.account_dir(email)?;
        if !dir.join(RECORD_FILE).exists() {
            return Err(AccountError::NotFound(email.to_string()));
        }
        let account = Self::read_account(&dir)?;
        debug!(email, "Loaded existing account");
        Ok(account)
    }

    fn create(&self, email: &str, key: Option<Key>) -> Result<Account, AccountError> {
        let dir = self.account_dir(email)?;
        make_or_verify_dir(&dir, PRIVATE_DIR_MODE).map_err(|e| AccountError::Io {
            path: dir.clone(),
            source: e,
        })?;

        let pem = match key {
            Some(key) => {
                crypto::validate_key(&key.pem)?;
                key.pem
            }
            None => crypto::generate_key()?,
        };
        let key_path = dir.join(KEY_FILE);
        write_atomic(&key_path, pem.as_bytes(), PRIVATE_MODE).map_err(|e| AccountError::Io {
            path: key_path.clone(),
            source: e,
        })?;

        let account = Account::new(
            Some(email.to_string()),
            Key {
                path: Some(key_path),
                pem,
            },
        );
        self.write_record(&dir, &account, email)?;

        debug!(email, id = %account.id(), "Created account");
        Ok(account)
    }

    fn save(&self, account: &Account) -> Result<(), AccountError> {
        let email = account
            .email()
            .ok_or_else(|| AccountError::InvalidEmail(String::new()))?;
        let dir = self.account_dir(email)?;
        make_or_verify_dir(&dir, PRIVATE_DIR_MODE).map_err(|e| AccountError::Io {
            path: dir.clone(),
            source: e,
        })?;
        self.write_record(&dir, account, email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, ConfigFile, DirsConfig};
    use tempfile::TempDir;

    fn store_in(dir: &Path) -> FileAccountStore {
        let flags = ConfigFile {
            dirs: Some(DirsConfig {
                config_dir: Some(dir.to_path_buf()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = Config::resolve(ConfigFile::default(), flags).unwrap();
        FileAccountStore::new(StoragePaths::from_config(&config))
    }

    fn registration() -> Registration {
        Registration {
            uri: "https://ca.example/acct/1".to_string(),
            contact: vec!["mailto:admin@example.com".to_string()],
            terms_of_service: Some("https://ca.example/tos".to_string()),
            agreed_to_terms: true,
        }
    }

    #[test]
    fn load_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = store_in(temp.path());
        assert!(matches!(
            store.load("admin@example.com"),
            Err(AccountError::NotFound(_))
        ));
    }

    #[test]
    fn create_then_load() {
        let temp = TempDir::new().unwrap();
        let store = store_in(temp.path());

        let created = store.create("admin@example.com", None).unwrap();
        assert!(!created.is_registered());

        let loaded = store.load("admin@example.com").unwrap();
        assert_eq!(loaded.email(), Some("admin@example.com"));
        assert_eq!(loaded.key().pem, created.key().pem);
        assert_eq!(loaded.id(), created.id());
    }

    #[test]
    fn create_rejects_bad_email() {
        let temp = TempDir::new().unwrap();
        let store = store_in(temp.path());
        assert!(matches!(
            store.create("../../etc", None),
            Err(AccountError::InvalidEmail(_))
        ));
    }

    #[test]
    fn create_adopts_given_key() {
        let temp = TempDir::new().unwrap();
        let store = store_in(temp.path());
        let pem = crypto::generate_key().unwrap();

        let account = store
            .create(
                "admin@example.com",
                Some(Key {
                    path: None,
                    pem: pem.clone(),
                }),
            )
            .unwrap();
        assert_eq!(account.key().pem, pem);
    }

    #[test]
    fn create_rejects_invalid_key() {
        let temp = TempDir::new().unwrap();
        let store = store_in(temp.path());
        let result = store.create(
            "admin@example.com",
            Some(Key {
                path: None,
                pem: "not a key".to_string(),
            }),
        );
        assert!(matches!(result, Err(AccountError::Key(_))));
    }

    #[test]
    fn save_persists_registration() {
        let temp = TempDir::new().unwrap();
        let store = store_in(temp.path());

        let mut account = store.create("admin@example.com", None).unwrap();
        account.set_registration(registration());
        store.save(&account).unwrap();

        let loaded = store.load("admin@example.com").unwrap();
        assert_eq!(loaded.registration(), Some(&registration()));
    }

    #[test]
    fn find_all_sorted_and_skips_junk() {
        let temp = TempDir::new().unwrap();
        let store = store_in(temp.path());

        store.create("zed@example.com", None).unwrap();
        store.create("amy@example.com", None).unwrap();
        fs::create_dir_all(temp.path().join("accounts/broken@example.com")).unwrap();

        let emails: Vec<_> = store
            .find_all()
            .unwrap()
            .iter()
            .map(|a| a.email().unwrap().to_string())
            .collect();
        assert_eq!(emails, vec!["amy@example.com", "zed@example.com"]);
    }

    #[test]
    fn find_all_without_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp.path().join("nothing-here"));
        assert!(store.find_all().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn key_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let store = store_in(temp.path());
        let account = store.create("admin@example.com", None).unwrap();

        let key_path = account.key().path.clone().unwrap();
        let mode = fs::metadata(key_path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn label_mentions_email_and_id() {
        let key = Key {
            path: None,
            pem: "pem".to_string(),
        };
        let account = Account::new(Some("admin@example.com".to_string()), key);
        let label = account.label();
        assert!(label.starts_with("admin@example.com ("));
        assert!(label.contains(&account.id()[..8]));
    }
}
