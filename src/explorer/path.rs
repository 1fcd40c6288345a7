use std::fmt;

use log::debug;

/// Label shown for the root crumb.
pub const ROOT_LABEL: &str = "Inicio";

/// Absolute, slash-separated remote path. Root is `/`.
///
/// Empty and `.` segments are dropped, `..` pops one segment and never climbs
/// above the root, and trailing slashes are removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemotePath(String);

impl RemotePath {
    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn normalize(raw: &str) -> Self {
        let mut segments: Vec<&str> = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        debug!("'..' above root ignored in {:?}", raw);
                    }
                }
                other => segments.push(other),
            }
        }

        if segments.is_empty() {
            Self::root()
        } else {
            Self(format!("/{}", segments.join("/")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    pub fn join(&self, name: &str) -> Self {
        Self::normalize(&format!("{}/{}", self.0, name))
    }

    pub fn parent(&self) -> Self {
        self.join("..")
    }
}

impl Default for RemotePath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemotePath {
    fn from(s: &str) -> Self {
        Self::normalize(s)
    }
}

impl From<String> for RemotePath {
    fn from(s: String) -> Self {
        Self::normalize(&s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub full_path: RemotePath,
    pub is_root: bool,
    pub active: bool,
}

/// Builds the breadcrumb trail for `path`: the root crumb first, then one
/// crumb per segment with the accumulated prefix. The last crumb is active.
pub fn breadcrumb_for(path: &RemotePath) -> Vec<Crumb> {
    let segments: Vec<&str> = path.segments().collect();
    let mut crumbs = Vec::with_capacity(segments.len() + 1);

    crumbs.push(Crumb {
        label: ROOT_LABEL.to_string(),
        full_path: RemotePath::root(),
        is_root: true,
        active: segments.is_empty(),
    });

    let mut accumulated = String::new();
    for (idx, segment) in segments.iter().enumerate() {
        accumulated.push('/');
        accumulated.push_str(segment);
        crumbs.push(Crumb {
            label: (*segment).to_string(),
            full_path: RemotePath(accumulated.clone()),
            is_root: false,
            active: idx == segments.len() - 1,
        });
    }

    crumbs
}

/// Current confirmed directory plus the breadcrumb derived from it.
///
/// Only `NavigationController` replaces the path; the breadcrumb is rebuilt
/// on every replacement and has no setter of its own.
#[derive(Debug, Clone)]
pub struct PathModel {
    current: RemotePath,
    breadcrumb: Vec<Crumb>,
}

impl PathModel {
    pub fn new(initial: RemotePath) -> Self {
        let breadcrumb = breadcrumb_for(&initial);
        Self {
            current: initial,
            breadcrumb,
        }
    }

    pub fn current(&self) -> &RemotePath {
        &self.current
    }

    pub fn breadcrumb(&self) -> &[Crumb] {
        &self.breadcrumb
    }

    pub(crate) fn replace(&mut self, confirmed: RemotePath) {
        if confirmed != self.current {
            debug!("path {} -> {}", self.current, confirmed);
        }
        self.breadcrumb = breadcrumb_for(&confirmed);
        self.current = confirmed;
    }
}

impl Default for PathModel {
    fn default() -> Self {
        Self::new(RemotePath::root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_and_anchors() {
        assert_eq!(RemotePath::normalize("").as_str(), "/");
        assert_eq!(RemotePath::normalize("//a///b/").as_str(), "/a/b");
        assert_eq!(RemotePath::normalize("a/./b").as_str(), "/a/b");
        assert_eq!(RemotePath::normalize("/a/b/../c").as_str(), "/a/c");
    }

    #[test]
    fn dotdot_stops_at_root() {
        assert_eq!(RemotePath::normalize("/../../x").as_str(), "/x");
        assert!(RemotePath::root().parent().is_root());
    }

    #[test]
    fn breadcrumb_of_root_is_single_active_crumb() {
        let crumbs = breadcrumb_for(&RemotePath::root());
        assert_eq!(crumbs.len(), 1);
        assert!(crumbs[0].is_root);
        assert!(crumbs[0].active);
        assert_eq!(crumbs[0].label, ROOT_LABEL);
    }

    #[test]
    fn breadcrumb_accumulates_prefixes() {
        let crumbs = breadcrumb_for(&RemotePath::from("/facturas/2024/enero"));
        let paths: Vec<&str> = crumbs.iter().map(|c| c.full_path.as_str()).collect();
        assert_eq!(paths, ["/", "/facturas", "/facturas/2024", "/facturas/2024/enero"]);
        let active: Vec<bool> = crumbs.iter().map(|c| c.active).collect();
        assert_eq!(active, [false, false, false, true]);
    }

    #[test]
    fn replacing_path_rebuilds_breadcrumb() {
        let mut model = PathModel::new(RemotePath::from("/a/b"));
        model.replace(RemotePath::from("/a"));
        let labels: Vec<&str> = model.breadcrumb().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, [ROOT_LABEL, "a"]);
        assert!(model.breadcrumb()[1].active);
    }
}
