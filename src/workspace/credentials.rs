//! Credential record used by the external tool.
//!
//! The record is written at most once per host. Presence of the file is the
//! only check; a stale record is never refreshed or removed here.
use crate::error::{ProvisionError, ProvisionResult};
use crate::tool::{run_checked, ToolRunner};
use std::fs;
use std::path::{Path, PathBuf};

/// Account, admin key, and domain triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub account: String,
    pub admin_key: String,
    pub domain: String,
}

impl CredentialRecord {
    /// Render the record in the tool's `key: value` format.
    pub fn render(&self) -> String {
        format!(
            "account: {}\nadminkey: {}\ndomain: {}",
            self.account, self.admin_key, self.domain
        )
    }
}

/// Result of ensuring credentials are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialWrite {
    AlreadyPresent,
    Written,
}

/// Reads and writes the credential file at a fixed location.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn credentials_exist(&self) -> bool {
        self.path.is_file()
    }

    /// Write `record` unless a credential file already exists, then verify
    /// the login with `whoami`.
    ///
    /// A failed verification leaves the freshly written file in place.
    pub fn write_credentials(
        &self,
        record: &CredentialRecord,
        runner: &dyn ToolRunner,
    ) -> ProvisionResult<CredentialWrite> {
        if self.credentials_exist() {
            tracing::info!(path = %self.path.display(), "credentials already present");
            return Ok(CredentialWrite::AlreadyPresent);
        }
        if record.account.trim().is_empty() || record.admin_key.trim().is_empty() {
            tracing::warn!("writing credentials with an empty account or admin key");
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| ProvisionError::fs(format!("create {}", parent.display()), err))?;
        }
        fs::write(&self.path, record.render().as_bytes())
            .map_err(|err| ProvisionError::fs(format!("write {}", self.path.display()), err))?;
        tracing::info!(path = %self.path.display(), "credentials saved");

        run_checked(runner, &["whoami"])?;
        Ok(CredentialWrite::Written)
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
