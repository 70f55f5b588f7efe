mod job_registry;
mod net_worth_store;
mod recurring_store;

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{from_reader, from_value, Value};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::accounts::Account;
use crate::budget::Budget;
use crate::errors::StoreError;
use crate::net_worth::NetWorthSnapshot;
use crate::recurring::{RealizedTransaction, RecurringTransactionDefinition};
use crate::scheduler::SchedulerSettings;

pub use job_registry::JobRegistration;

pub const VAULT_FILE: &str = "vault.json";

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse the vault: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("The vault has no value for {0}")]
    MissingKey(String),

    #[error("Could not save the vault: {0}")]
    Persist(String),
}

impl From<VaultError> for StoreError {
    fn from(error: VaultError) -> Self {
        StoreError::Unavailable(error.to_string())
    }
}

pub trait Vault {
    fn read_vault_values<T: DeserializeOwned>(&self, key: &str) -> Result<T, VaultError>;
}

pub trait VaultReadable: DeserializeOwned {
    const KEY: &'static str;

    fn from_vault<V: Vault>(vault: &V) -> Result<Self, VaultError> {
        vault.read_vault_values(Self::KEY)
    }
}

/// Like `VaultReadable::from_vault`, but a missing key reads as the default.
pub fn read_or_default<T, V>(vault: &V) -> Result<T, VaultError>
where
    T: VaultReadable + Default,
    V: Vault,
{
    match T::from_vault(vault) {
        Err(VaultError::MissingKey(_)) => Ok(T::default()),
        other => other,
    }
}

/// Everything the vault file holds. Every key may be missing.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultDocument {
    pub accounts: Vec<Account>,
    pub budgets: Vec<Budget>,
    pub recurring_transactions: Vec<RecurringTransactionDefinition>,
    pub transactions: Vec<RealizedTransaction>,
    pub net_worth_snapshots: Vec<NetWorthSnapshot>,
    pub scheduled_jobs: Vec<JobRegistration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler_settings: Option<SchedulerSettings>,
}

pub struct VaultImpl {
    pub path: PathBuf,
}

impl VaultImpl {
    fn file_path(&self) -> PathBuf {
        self.path.join(VAULT_FILE)
    }

    fn io_error(&self, source: std::io::Error) -> VaultError {
        VaultError::Io { path: self.file_path(), source }
    }

    /// A vault directory without a vault file reads as empty.
    pub fn load(&self) -> Result<VaultDocument, VaultError> {
        match File::open(self.file_path()) {
            Ok(file) => Ok(from_reader(BufReader::new(file))?),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(VaultDocument::default()),
            Err(error) => Err(self.io_error(error)),
        }
    }

    /// Writes the document next to the vault file then renames it over the
    /// vault file, so readers see either the old or the new document.
    pub fn persist(&self, document: &VaultDocument) -> Result<(), VaultError> {
        let mut file = NamedTempFile::new_in(&self.path).map_err(|error| self.io_error(error))?;
        serde_json::to_writer_pretty(&mut file, document)?;
        file.as_file().sync_all().map_err(|error| self.io_error(error))?;
        file.persist(self.file_path())
            .map_err(|error| VaultError::Persist(error.to_string()))?;
        Ok(())
    }

    /// Loads the document, applies `mutate` and persists the result. Nothing
    /// is written when `mutate` fails.
    pub fn update<R, F>(&self, mutate: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut VaultDocument) -> Result<R, StoreError>,
    {
        let mut document = self.load()?;
        let result = mutate(&mut document)?;
        self.persist(&document)?;
        Ok(result)
    }

    pub fn settings(&self) -> Result<SchedulerSettings, VaultError> {
        read_or_default(self)
    }
}

impl Vault for VaultImpl {
    fn read_vault_values<T: DeserializeOwned>(&self, key: &str) -> Result<T, VaultError> {
        let file = File::open(self.file_path()).map_err(|error| self.io_error(error))?;
        let mut values: Value = from_reader(BufReader::new(file))?;
        let value = values
            .get_mut(key)
            .map(Value::take)
            .ok_or(VaultError::MissingKey(key.to_string()))?;
        Ok(from_value(value)?)
    }
}
