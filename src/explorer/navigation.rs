use log::{debug, info, warn};

use crate::entry::{DirectoryEntry, Listing};
use crate::error::NavigationError;
use crate::explorer::path::{Crumb, PathModel, RemotePath};
use crate::explorer::sequencer::{RequestSequencer, RequestToken};

/// What applying a navigation reply led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Superseded by a newer navigation or listing; nothing changed.
    Stale,
    /// The server accepted the path change; a listing must follow.
    Confirmed,
    /// Entries and path were replaced by the listing.
    Listed,
    /// Nothing changed except the error notice.
    Failed(NavigationError),
}

/// Drives directory listing and path changes.
///
/// Navigate and list share one sequencer, so a reply is applied only if no
/// newer navigation or listing was issued after it. Failures keep the
/// entries and path that were already shown.
#[derive(Debug)]
pub struct NavigationController {
    path: PathModel,
    entries: Vec<DirectoryEntry>,
    sequencer: RequestSequencer,
    in_flight: Option<u64>,
    last_error: Option<NavigationError>,
}

impl NavigationController {
    pub fn new() -> Self {
        Self {
            path: PathModel::default(),
            entries: Vec::new(),
            sequencer: RequestSequencer::new("navigation"),
            in_flight: None,
            last_error: None,
        }
    }

    pub fn path(&self) -> &RemotePath {
        self.path.current()
    }

    pub fn breadcrumb(&self) -> &[Crumb] {
        self.path.breadcrumb()
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn last_error(&self) -> Option<&NavigationError> {
        self.last_error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Target for a breadcrumb click.
    pub fn crumb_target(&self, index: usize) -> Option<RemotePath> {
        self.path.breadcrumb().get(index).map(|c| c.full_path.clone())
    }

    pub fn begin_list(&mut self) -> RequestToken {
        let token = self.sequencer.issue();
        debug!("listing {} (#{})", self.path(), token.sequence_id());
        self.in_flight = Some(token.sequence_id());
        token
    }

    pub fn begin_navigate(&mut self, target: &str) -> RequestToken {
        let token = self.sequencer.issue();
        info!(
            "navigate {:?} from {} (#{})",
            target,
            self.path(),
            token.sequence_id()
        );
        self.in_flight = Some(token.sequence_id());
        token
    }

    pub fn complete_navigate(
        &mut self,
        sequence_id: u64,
        result: Result<Option<RemotePath>, NavigationError>,
    ) -> NavigationOutcome {
        if !self.sequencer.accept(sequence_id) {
            return NavigationOutcome::Stale;
        }
        match result {
            Ok(echoed) => {
                if let Some(confirmed) = echoed {
                    self.path.replace(confirmed);
                }
                self.last_error = None;
                NavigationOutcome::Confirmed
            }
            Err(e) => {
                warn!("navigate failed: {}", e);
                self.in_flight = None;
                self.last_error = Some(e.clone());
                NavigationOutcome::Failed(e)
            }
        }
    }

    pub fn complete_list(
        &mut self,
        sequence_id: u64,
        result: Result<Listing, NavigationError>,
    ) -> NavigationOutcome {
        if !self.sequencer.accept(sequence_id) {
            return NavigationOutcome::Stale;
        }
        self.in_flight = None;
        match result {
            Ok(listing) => {
                debug!("{} entries in {}", listing.entries.len(), listing.path);
                self.path.replace(listing.path);
                self.entries = listing.entries;
                self.last_error = None;
                NavigationOutcome::Listed
            }
            Err(e) => {
                warn!("list failed: {}", e);
                self.last_error = Some(e.clone());
                NavigationOutcome::Failed(e)
            }
        }
    }

    /// Starts over at `path` with no entries, dropping outstanding replies.
    pub fn reset(&mut self, path: RemotePath) {
        self.sequencer.invalidate();
        self.path.replace(path);
        self.entries.clear();
        self.in_flight = None;
        self.last_error = None;
    }
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(path: &str, names: &[&str]) -> Listing {
        Listing {
            path: RemotePath::from(path),
            entries: names
                .iter()
                .map(|n| DirectoryEntry::directory(*n, "2024-01-01 00:00:00"))
                .collect(),
        }
    }

    fn at(path: &str, names: &[&str]) -> NavigationController {
        let mut nav = NavigationController::new();
        let token = nav.begin_list();
        nav.complete_list(token.sequence_id(), Ok(listing(path, names)));
        nav
    }

    #[test]
    fn up_one_level_rebuilds_breadcrumb() {
        let mut nav = at("/a/b", &["c"]);
        let token = nav.begin_navigate("..");
        assert_eq!(
            nav.complete_navigate(token.sequence_id(), Ok(None)),
            NavigationOutcome::Confirmed
        );
        let list = nav.begin_list();
        nav.complete_list(list.sequence_id(), Ok(listing("/a", &["b"])));

        assert_eq!(nav.path().as_str(), "/a");
        let crumbs = nav.breadcrumb();
        assert_eq!(crumbs.len(), 2);
        assert!(crumbs[0].is_root);
        assert_eq!(crumbs[1].label, "a");
        assert!(crumbs[1].active);
    }

    #[test]
    fn echoed_path_is_applied_before_listing() {
        let mut nav = at("/", &["docs"]);
        let token = nav.begin_navigate("docs");
        nav.complete_navigate(token.sequence_id(), Ok(Some(RemotePath::from("/docs"))));
        assert_eq!(nav.path().as_str(), "/docs");
        assert_eq!(nav.breadcrumb().len(), 2);
    }

    #[test]
    fn failed_navigate_keeps_path_and_entries() {
        let mut nav = at("/a", &["x", "y"]);
        let token = nav.begin_navigate("missing");
        let outcome = nav.complete_navigate(
            token.sequence_id(),
            Err(NavigationError::Remote("Directorio no encontrado".into())),
        );
        assert!(matches!(outcome, NavigationOutcome::Failed(_)));
        assert_eq!(nav.path().as_str(), "/a");
        assert_eq!(nav.entries().len(), 2);
        assert!(nav.last_error().is_some());
        assert!(!nav.is_loading());
    }

    #[test]
    fn failed_list_keeps_entries() {
        let mut nav = at("/a", &["x"]);
        let token = nav.begin_list();
        nav.complete_list(
            token.sequence_id(),
            Err(NavigationError::Remote("Sin permisos".into())),
        );
        assert_eq!(nav.entries().len(), 1);
    }

    #[test]
    fn older_navigation_reply_is_discarded() {
        let mut nav = at("/", &["a", "b"]);
        let first = nav.begin_navigate("a");
        let second = nav.begin_navigate("b");
        assert_eq!(
            nav.complete_navigate(first.sequence_id(), Ok(Some(RemotePath::from("/a")))),
            NavigationOutcome::Stale
        );
        assert_eq!(nav.path().as_str(), "/");
        assert_eq!(
            nav.complete_navigate(second.sequence_id(), Ok(Some(RemotePath::from("/b")))),
            NavigationOutcome::Confirmed
        );
        assert_eq!(nav.path().as_str(), "/b");
    }

    #[test]
    fn crumb_targets_follow_breadcrumb() {
        let nav = at("/x/y", &[]);
        assert_eq!(nav.crumb_target(0), Some(RemotePath::root()));
        assert_eq!(nav.crumb_target(1), Some(RemotePath::from("/x")));
        assert_eq!(nav.crumb_target(3), None);
    }
}
