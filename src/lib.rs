pub mod config;
pub mod console;
pub mod entry;
pub mod error;
pub mod explorer;
pub mod format;
pub mod highlight;
pub mod notify;
pub mod remote;

pub use config::ExplorerConfig;
pub use explorer::{Action, Completion, Completions, Explorer, Update, ViewMode};
pub use notify::{NotificationSink, Severity};
pub use remote::{Credentials, HttpService, RemoteService};
