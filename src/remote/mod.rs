//! The remote file service as seen by the explorer.

pub mod http;
pub mod wire;

use async_trait::async_trait;

use crate::entry::{Listing, SearchOutcome, Suggestion};
use crate::error::ServiceError;
use crate::explorer::path::RemotePath;

pub use http::HttpService;

#[derive(Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Operations offered by the session-scoped remote repository.
///
/// The service keeps the working directory on its side: `navigate` changes
/// it and `list` reports it back with the entries.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Returns the working directory when a session is already open.
    async fn status(&self) -> Result<Option<RemotePath>, ServiceError>;

    async fn connect(&self, credentials: &Credentials) -> Result<RemotePath, ServiceError>;

    async fn disconnect(&self) -> Result<(), ServiceError>;

    async fn list(&self) -> Result<Listing, ServiceError>;

    /// Resolves `target` (`..`, a bare name or an absolute path) on the
    /// server. Some servers echo the new directory back.
    async fn navigate(&self, target: &str) -> Result<Option<RemotePath>, ServiceError>;

    async fn suggestions(&self, query: &str) -> Result<Vec<Suggestion>, ServiceError>;

    async fn search(&self, query: &str, max_results: u32) -> Result<SearchOutcome, ServiceError>;

    /// Stages `archivo` for download and returns the identifier to fetch.
    async fn prepare_download(&self, archivo: &str) -> Result<String, ServiceError>;

    async fn fetch_download(&self, prepared: &str) -> Result<Vec<u8>, ServiceError>;
}
