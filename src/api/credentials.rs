//! Credential store collaborator
//!
//! Login asks the store for a password when none is given, and tells the
//! store to forget its credentials when the API rejects them.

use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Username and password pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of stored credentials
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    /// Credentials for `username`, or the first stored account when `None`
    async fn get_credentials(&self, username: Option<&str>) -> Result<Credentials>;

    /// Forget every stored credential
    async fn delete_credentials(&self) -> Result<()>;
}

/// Credentials kept as `username:password` lines in a file
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an account to the file, creating it if needed
    pub async fn add_credentials(&self, credentials: &Credentials) -> Result<()> {
        if credentials.username.contains(':') || credentials.username.contains('\n') {
            return Err(Error::credentials("username must not contain ':' or newlines"));
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut content = match tokio::fs::read_to_string(&self.path).await {
            Ok(existing) => existing,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&format!("{}:{}\n", credentials.username, credentials.password));

        tokio::fs::write(&self.path, content).await?;
        debug!("Stored credentials for '{}' in {:?}", credentials.username, self.path);
        Ok(())
    }

    fn parse(content: &str) -> Vec<Credentials> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once(':'))
            .map(|(user, pass)| Credentials::new(user.trim(), pass))
            .collect()
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get_credentials(&self, username: Option<&str>) -> Result<Credentials> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::credentials(format!("cannot read credentials file {:?}: {}", self.path, e))
        })?;
        let accounts = Self::parse(&content);

        let found = match username {
            Some(name) => accounts.into_iter().find(|c| c.username == name),
            None => accounts.into_iter().next(),
        };

        found.ok_or_else(|| match username {
            Some(name) => Error::credentials(format!("no stored credentials for '{}'", name)),
            None => Error::credentials(format!("no credentials stored in {:?}", self.path)),
        })
    }

    async fn delete_credentials(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Deleted stored credentials at {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
