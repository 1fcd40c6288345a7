use std::path::PathBuf;
use std::time::Duration;

use crate::remote::Credentials;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;
pub const DEFAULT_MAX_RESULTS: u32 = 100;

#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Quiet period after the last keystroke before suggestions are fetched.
    pub debounce: Duration,
    /// Trimmed query length at which suggestions and search are allowed.
    pub min_query_len: usize,
    pub max_results: u32,
    pub connect_timeout: Duration,
    pub download_dir: PathBuf,
}

impl ExplorerConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/modulos/consolidador-t25/".to_string(),
            username: None,
            password: None,
            debounce: DEFAULT_DEBOUNCE,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            max_results: DEFAULT_MAX_RESULTS,
            connect_timeout: Duration::from_secs(30),
            download_dir: PathBuf::from("."),
        }
    }
}
