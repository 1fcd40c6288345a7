//! Navigation and search orchestration.
//!
//! `Explorer` owns one instance of each component and is the only place
//! their state changes. User input arrives through [`Explorer::dispatch`];
//! every network call runs as a spawned task that posts a [`Completion`]
//! back, and the owner feeds those to [`Explorer::apply`] one at a time.
//! Handlers therefore never overlap, but they interleave freely with new
//! input, which is what the request sequencers guard against.

pub mod connection;
pub mod navigation;
pub mod path;
pub mod search;
pub mod sequencer;
pub mod suggestions;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::config::ExplorerConfig;
use crate::entry::{Listing, SearchOutcome, Suggestion};
use crate::error::{
    ConnectError, DisconnectError, DownloadError, NavigationError, SearchError, ServiceError,
    SuggestionError,
};
use crate::format::partial_results_notice;
use crate::notify::{NotificationSink, Severity};
use crate::remote::RemoteService;

use connection::ConnectionManager;
use navigation::{NavigationController, NavigationOutcome};
use path::RemotePath;
use search::{SearchOrchestrator, SearchState, SearchUpdate};
use suggestions::{InputEffect, SuggestionOrchestrator, SuggestionUpdate};

/// User intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Adopt a session the service already holds for us, if any.
    RestoreSession,
    Connect,
    Disconnect,
    Refresh,
    Navigate(String),
    GoUp,
    GoRoot,
    OpenCrumb(usize),
    /// Directory rows are entered, file rows downloaded.
    OpenEntry(usize),
    QueryChanged(String),
    SelectSuggestion(usize),
    RunSearch,
    CancelSearch,
    ClearSearch,
    /// Directory results navigate there, file results are downloaded.
    OpenResult(usize),
    Download(String),
}

/// Result of a spawned network call or timer, tagged with the identity of
/// the request that produced it.
#[derive(Debug)]
pub enum Completion {
    SessionStatus(Result<Option<RemotePath>, ServiceError>),
    Connected {
        attempt: u64,
        result: Result<RemotePath, ConnectError>,
    },
    Disconnected(Result<(), DisconnectError>),
    Navigated {
        request: u64,
        result: Result<Option<RemotePath>, NavigationError>,
    },
    Listed {
        request: u64,
        result: Result<Listing, NavigationError>,
    },
    DebounceElapsed {
        timer: u64,
    },
    Suggestions {
        request: u64,
        result: Result<Vec<Suggestion>, SuggestionError>,
    },
    SearchFinished {
        request: u64,
        result: Result<SearchOutcome, SearchError>,
    },
    /// The transport observed cancellation and dropped the call.
    SearchAborted {
        request: u64,
    },
    Downloaded {
        target: String,
        result: Result<PathBuf, DownloadError>,
    },
}

/// Which part of the visible state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Nothing,
    /// A superseded reply was dropped.
    Stale,
    Connection,
    Directory,
    Suggestions,
    Search,
    Download,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Navigation,
    Searching,
    Results,
}

/// Receiving end of the completion queue.
pub struct Completions {
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl Completions {
    pub async fn recv(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }
}

pub struct Explorer {
    service: Arc<dyn RemoteService>,
    notifier: Arc<dyn NotificationSink>,
    config: ExplorerConfig,
    connection: ConnectionManager,
    navigation: NavigationController,
    suggestions: SuggestionOrchestrator,
    search: SearchOrchestrator,
    query: String,
    tx: mpsc::UnboundedSender<Completion>,
}

impl Explorer {
    pub fn new(
        service: Arc<dyn RemoteService>,
        notifier: Arc<dyn NotificationSink>,
        config: ExplorerConfig,
    ) -> (Self, Completions) {
        let (tx, rx) = mpsc::unbounded_channel();
        let explorer = Self {
            suggestions: SuggestionOrchestrator::new(config.debounce, config.min_query_len),
            search: SearchOrchestrator::new(config.min_query_len, config.max_results),
            connection: ConnectionManager::new(),
            navigation: NavigationController::new(),
            query: String::new(),
            service,
            notifier,
            config,
            tx,
        };
        (explorer, Completions { rx })
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn suggestions(&self) -> &SuggestionOrchestrator {
        &self.suggestions
    }

    pub fn search(&self) -> &SearchOrchestrator {
        &self.search
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn view_mode(&self) -> ViewMode {
        match self.search.state() {
            SearchState::Searching { .. } => ViewMode::Searching,
            SearchState::Completed { .. } => ViewMode::Results,
            _ => ViewMode::Navigation,
        }
    }

    /// Handles one user action. Network work is started, not awaited.
    pub fn dispatch(&mut self, action: Action) -> Update {
        debug!("action {:?}", action);
        match action {
            Action::RestoreSession => {
                let service = self.service.clone();
                self.spawn(async move { Completion::SessionStatus(service.status().await) });
                Update::Nothing
            }
            Action::Connect => self.connect(),
            Action::Disconnect => self.disconnect(),
            Action::Refresh => {
                if self.require_connection() {
                    self.start_list();
                    Update::Directory
                } else {
                    Update::Nothing
                }
            }
            Action::Navigate(target) => self.navigate(&target),
            Action::GoUp => self.navigate(".."),
            Action::GoRoot => self.navigate("/"),
            Action::OpenCrumb(index) => match self.navigation.crumb_target(index) {
                Some(target) => self.navigate(target.as_str()),
                None => Update::Nothing,
            },
            Action::OpenEntry(index) => {
                let Some(entry) = self.navigation.entries().get(index) else {
                    return Update::Nothing;
                };
                let name = entry.name.clone();
                if entry.is_directory {
                    self.navigate(&name)
                } else {
                    self.download(name)
                }
            }
            Action::QueryChanged(text) => self.query_changed(text),
            Action::SelectSuggestion(index) => self.select_suggestion(index),
            Action::RunSearch => self.run_search(),
            Action::CancelSearch => {
                if self.search.cancel() {
                    self.notifier.notify("Búsqueda cancelada", Severity::Info);
                    Update::Search
                } else {
                    Update::Nothing
                }
            }
            Action::ClearSearch => {
                self.query.clear();
                self.suggestions.dismiss();
                self.search.clear();
                Update::Search
            }
            Action::OpenResult(index) => {
                let Some((_, outcome)) = self.search.results() else {
                    return Update::Nothing;
                };
                let Some(hit) = outcome.results.get(index) else {
                    return Update::Nothing;
                };
                let target = hit.full_path.as_str().to_string();
                if hit.entry.is_directory {
                    if !self.require_connection() {
                        return Update::Nothing;
                    }
                    self.search.clear();
                    self.navigate(&target)
                } else {
                    self.download(target)
                }
            }
            Action::Download(target) => self.download(target),
        }
    }

    /// Applies one completion. Stale replies change nothing.
    pub fn apply(&mut self, completion: Completion) -> Update {
        match completion {
            Completion::SessionStatus(result) => self.apply_status(result),
            Completion::Connected { attempt, result } => self.apply_connect(attempt, result),
            Completion::Disconnected(result) => {
                self.connection.complete_disconnect(&result);
                Update::Nothing
            }
            Completion::Navigated { request, result } => {
                match self.navigation.complete_navigate(request, result) {
                    NavigationOutcome::Stale => Update::Stale,
                    NavigationOutcome::Confirmed => {
                        self.start_list();
                        Update::Directory
                    }
                    NavigationOutcome::Failed(e) => {
                        self.navigation_failed("Error al cambiar directorio", e);
                        Update::Directory
                    }
                    NavigationOutcome::Listed => Update::Directory,
                }
            }
            Completion::Listed { request, result } => {
                match self.navigation.complete_list(request, result) {
                    NavigationOutcome::Stale => Update::Stale,
                    NavigationOutcome::Failed(e) => {
                        self.navigation_failed("Error al listar directorio", e);
                        Update::Directory
                    }
                    _ => Update::Directory,
                }
            }
            Completion::DebounceElapsed { timer } => self.debounce_elapsed(timer),
            Completion::Suggestions { request, result } => {
                match self.suggestions.on_response(request, result) {
                    SuggestionUpdate::Stale => Update::Stale,
                    SuggestionUpdate::Replaced | SuggestionUpdate::Failed => Update::Suggestions,
                }
            }
            Completion::SearchFinished { request, result } => {
                self.apply_search(request, result)
            }
            Completion::SearchAborted { request } => {
                debug!("search #{} aborted by transport", request);
                Update::Stale
            }
            Completion::Downloaded { target, result } => {
                match result {
                    Ok(saved) => self.notifier.notify(
                        &format!("Archivo descargado exitosamente: {}", saved.display()),
                        Severity::Success,
                    ),
                    Err(e) => {
                        warn!("download of {} failed: {}", target, e);
                        self.notifier
                            .notify(&format!("Error al descargar: {e}"), Severity::Error);
                    }
                }
                Update::Download
            }
        }
    }

    fn spawn<F>(&self, work: F)
    where
        F: std::future::Future<Output = Completion> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let completion = work.await;
            if tx.send(completion).is_err() {
                debug!("explorer gone, completion dropped");
            }
        });
    }

    fn require_connection(&self) -> bool {
        if self.connection.is_connected() {
            true
        } else {
            self.notifier.notify("No hay conexión activa", Severity::Warning);
            false
        }
    }

    fn connect(&mut self) -> Update {
        let token = match self.connection.begin_connect() {
            Ok(token) => token,
            Err(e) => {
                debug!("connect refused: {}", e);
                return Update::Nothing;
            }
        };
        info!("connecting to {}", self.config.base_url);
        let service = self.service.clone();
        let credentials = self.config.credentials();
        let attempt = token.sequence_id();
        self.spawn(async move {
            let result = service
                .connect(&credentials)
                .await
                .map_err(ConnectError::from);
            Completion::Connected { attempt, result }
        });
        Update::Connection
    }

    fn apply_connect(&mut self, attempt: u64, result: Result<RemotePath, ConnectError>) -> Update {
        match self.connection.complete_connect(attempt, result) {
            None => Update::Stale,
            Some(Ok(path)) => {
                self.notifier
                    .notify("Conectado exitosamente", Severity::Success);
                self.navigation.reset(path);
                self.start_list();
                Update::Connection
            }
            Some(Err(e)) => {
                self.notifier
                    .notify(&format!("Error al conectar: {e}"), Severity::Error);
                Update::Connection
            }
        }
    }

    fn apply_status(&mut self, result: Result<Option<RemotePath>, ServiceError>) -> Update {
        match result {
            Ok(Some(path)) => {
                if !self.connection.restore(&path) {
                    return Update::Nothing;
                }
                self.navigation.reset(path);
                self.start_list();
                Update::Connection
            }
            Ok(None) => {
                debug!("no existing session");
                Update::Nothing
            }
            Err(e) => {
                debug!("session status unavailable: {}", e);
                Update::Nothing
            }
        }
    }

    fn disconnect(&mut self) -> Update {
        if !self.connection.begin_disconnect() {
            return Update::Nothing;
        }
        self.suggestions.dismiss();
        self.search.clear();
        self.query.clear();
        self.navigation.reset(RemotePath::root());

        let service = self.service.clone();
        self.spawn(async move {
            Completion::Disconnected(service.disconnect().await.map_err(DisconnectError::from))
        });
        self.notifier.notify("Desconectado", Severity::Info);
        Update::Connection
    }

    /// Session is gone on the server side. Displayed data stays put.
    fn session_expired(&mut self) {
        self.connection.expire();
        self.suggestions.dismiss();
        self.notifier.notify(
            "La sesión remota expiró. Vuelva a conectar.",
            Severity::Warning,
        );
    }

    fn navigate(&mut self, target: &str) -> Update {
        if !self.require_connection() {
            return Update::Nothing;
        }
        let token = self.navigation.begin_navigate(target);
        let request = token.sequence_id();
        let service = self.service.clone();
        let target = target.to_string();
        self.spawn(async move {
            let result = service
                .navigate(&target)
                .await
                .map_err(NavigationError::from);
            Completion::Navigated { request, result }
        });
        Update::Directory
    }

    fn start_list(&mut self) {
        let token = self.navigation.begin_list();
        let request = token.sequence_id();
        let service = self.service.clone();
        self.spawn(async move {
            let result = service.list().await.map_err(NavigationError::from);
            Completion::Listed { request, result }
        });
    }

    fn navigation_failed(&mut self, context: &str, error: NavigationError) {
        if let NavigationError::SessionExpired(_) = error {
            self.session_expired();
        } else {
            self.notifier
                .notify(&format!("{context}: {error}"), Severity::Error);
        }
    }

    fn query_changed(&mut self, text: String) -> Update {
        self.query = text;
        if self.search.is_searching() {
            self.suggestions.dismiss();
            return Update::Nothing;
        }
        match self.suggestions.on_input(&self.query) {
            InputEffect::Cleared | InputEffect::BelowThreshold => Update::Suggestions,
            InputEffect::Scheduled(timer) => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = timer.cancel.cancelled() => {}
                        _ = tokio::time::sleep(timer.delay) => {
                            if tx.send(Completion::DebounceElapsed { timer: timer.id }).is_err() {
                                debug!("explorer gone, debounce timer #{} dropped", timer.id);
                            }
                        }
                    }
                });
                Update::Nothing
            }
        }
    }

    fn debounce_elapsed(&mut self, timer: u64) -> Update {
        let Some(fetch) = self.suggestions.on_timer(timer) else {
            return Update::Stale;
        };
        if !self.connection.is_connected() || self.search.is_searching() {
            self.suggestions.dismiss();
            return Update::Suggestions;
        }
        let request = fetch.token.sequence_id();
        let service = self.service.clone();
        self.spawn(async move {
            let result = service
                .suggestions(&fetch.query)
                .await
                .map_err(SuggestionError::from);
            Completion::Suggestions { request, result }
        });
        Update::Nothing
    }

    fn select_suggestion(&mut self, index: usize) -> Update {
        if index >= self.suggestions.suggestions().len() {
            return Update::Nothing;
        }
        // refused picks leave the panel and any results as they are
        if !self.require_connection() {
            return Update::Nothing;
        }
        let Some(picked) = self.suggestions.select(index) else {
            return Update::Nothing;
        };
        if picked.is_directory {
            if self.view_mode() == ViewMode::Results {
                self.search.clear();
            }
            self.navigate(picked.full_path.as_str())
        } else {
            self.query = picked.name;
            self.run_search()
        }
    }

    fn run_search(&mut self) -> Update {
        let connected = self.connection.is_connected();
        let start = match self.search.begin(&self.query, connected) {
            Ok(start) => start,
            Err(e) => {
                let severity = match e {
                    SearchError::TooShort { .. } | SearchError::AlreadyRunning => {
                        Severity::Warning
                    }
                    _ => Severity::Error,
                };
                self.notifier.notify(&e.to_string(), severity);
                return Update::Nothing;
            }
        };
        self.suggestions.dismiss();

        let request = start.token.sequence_id();
        let cancel = start.token.cancel_handle();
        let service = self.service.clone();
        self.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => Completion::SearchAborted { request },
                result = service.search(&start.query, start.max_results) => {
                    Completion::SearchFinished {
                        request,
                        result: result.map_err(SearchError::from),
                    }
                }
            }
        });
        Update::Search
    }

    fn apply_search(&mut self, request: u64, result: Result<SearchOutcome, SearchError>) -> Update {
        match self.search.on_response(request, result) {
            SearchUpdate::Stale => Update::Stale,
            SearchUpdate::Completed { partial } => {
                if partial {
                    if let Some((_, outcome)) = self.search.results() {
                        let notice = partial_results_notice(outcome.total, outcome.folders_visited);
                        self.notifier.notify(&notice, Severity::Warning);
                    }
                }
                Update::Search
            }
            SearchUpdate::Failed(e) => {
                if let SearchError::SessionExpired(_) = e {
                    self.session_expired();
                } else {
                    self.notifier
                        .notify(&format!("Error al buscar: {e}"), Severity::Error);
                }
                Update::Search
            }
        }
    }

    fn download(&mut self, target: String) -> Update {
        if !self.require_connection() {
            return Update::Nothing;
        }
        info!("download {}", target);
        let service = self.service.clone();
        let dir = self.config.download_dir.clone();
        self.spawn(async move {
            let result = fetch_to_disk(service.as_ref(), &target, &dir).await;
            Completion::Downloaded { target, result }
        });
        Update::Download
    }
}

async fn fetch_to_disk(
    service: &dyn RemoteService,
    target: &str,
    dir: &Path,
) -> Result<PathBuf, DownloadError> {
    let prepared = service.prepare_download(target).await?;
    let bytes = service.fetch_download(&prepared).await?;

    let file_name = Path::new(&prepared)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "descarga".into());
    tokio::fs::create_dir_all(dir).await?;
    let destination = dir.join(file_name);
    tokio::fs::write(&destination, &bytes).await?;
    info!("saved {} bytes to {:?}", bytes.len(), destination);
    Ok(destination)
}
