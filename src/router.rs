//! Hash routing between the file manager and the shared-file landing page.

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// File list and detail view.
    Main,
    /// Landing page for a shared link.
    Download { file_id: String },
}

impl Route {
    /// `#<prefix>/<id>` selects the download view; any `&...` or `?...`
    /// suffix after the id is dropped. Everything else is the main view.
    pub fn from_hash(hash: &str, prefix: &str) -> Route {
        let marker = format!("#{prefix}/");
        let Some(rest) = hash.strip_prefix(marker.as_str()) else {
            return Route::Main;
        };
        let id = rest.split('&').next().unwrap_or_default();
        let id = id.split('?').next().unwrap_or_default();
        Route::Download {
            file_id: id.to_string(),
        }
    }
}

/// Current route plus a generation counter bumped on every route change.
#[derive(Debug)]
pub struct HashRouter {
    prefix: String,
    route: Route,
    generation: u64,
}

impl HashRouter {
    pub fn new(prefix: &str, hash: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            route: Route::from_hash(hash, prefix),
            generation: 0,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Re-evaluate after a hash change. Returns true if the route changed.
    pub fn on_hash_change(&mut self, hash: &str) -> bool {
        let next = Route::from_hash(hash, &self.prefix);
        if next == self.route {
            return false;
        }
        debug!(?next, "route changed");
        self.route = next;
        self.generation += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_hash_yields_file_id_without_suffix() {
        assert_eq!(
            Route::from_hash("#/file/XYZ&_t=999", "/file"),
            Route::Download {
                file_id: "XYZ".to_string()
            }
        );
        assert_eq!(
            Route::from_hash("#/file/XYZ?_t=999", "/file"),
            Route::Download {
                file_id: "XYZ".to_string()
            }
        );
        assert_eq!(
            Route::from_hash("#/file/XYZ", "/file"),
            Route::Download {
                file_id: "XYZ".to_string()
            }
        );
    }

    #[test]
    fn other_hashes_select_main_view() {
        for hash in ["", "#", "#/", "#/files/XYZ", "#/filex/XYZ", "/file/XYZ", "#/file"] {
            assert_eq!(Route::from_hash(hash, "/file"), Route::Main, "{hash}");
        }
    }

    #[test]
    fn prefix_is_configurable() {
        assert_eq!(
            Route::from_hash("#/s/abc&_t=1", "/s"),
            Route::Download {
                file_id: "abc".to_string()
            }
        );
        assert_eq!(Route::from_hash("#/file/abc", "/s"), Route::Main);
    }

    #[test]
    fn generation_moves_only_on_route_change() {
        let mut router = HashRouter::new("/file", "");
        assert_eq!(router.generation(), 0);
        assert!(!router.on_hash_change("#/about"));
        assert!(router.on_hash_change("#/file/a&_t=1"));
        // new timestamp, same file
        assert!(!router.on_hash_change("#/file/a&_t=2"));
        assert!(router.on_hash_change("#/file/b"));
        assert!(router.on_hash_change(""));
        assert_eq!(router.generation(), 3);
        assert_eq!(router.route(), &Route::Main);
    }
}
