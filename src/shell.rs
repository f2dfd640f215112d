//! Root of the client: routes the current hash to the file manager or the
//! shared-file page and keeps that choice current as the hash changes.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::api::FileApi;
use crate::app::AppShell;
use crate::config::Config;
use crate::download_view::DownloadView;
use crate::env::{Environment, HashSubscription};
use crate::error::ApiError;
use crate::record::FileRecord;
use crate::router::{HashRouter, Route};

pub enum View {
    Main(AppShell),
    Download(DownloadView),
}

/// An info request issued for a mounted download view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRequest {
    pub generation: u64,
    pub file_id: String,
}

pub struct Shell<'a> {
    env: &'a dyn Environment,
    api: &'a dyn FileApi,
    config: Config,
    router: Rc<RefCell<HashRouter>>,
    mounted_generation: u64,
    view: View,
    _hash_subscription: HashSubscription,
}

impl<'a> Shell<'a> {
    /// Route the current hash and mount the matching view, fetching what it
    /// needs. Hash changes are tracked until the shell is dropped.
    pub fn mount(env: &'a dyn Environment, api: &'a dyn FileApi, config: Config) -> Self {
        let router = Rc::new(RefCell::new(HashRouter::new(
            &config.share_hash_prefix,
            &env.hash(),
        )));
        let listener = Rc::clone(&router);
        let subscription = env.subscribe_hash(Box::new(move |hash: &str| {
            listener.borrow_mut().on_hash_change(hash);
        }));
        let mut shell = Self {
            env,
            api,
            config,
            router,
            mounted_generation: 0,
            view: View::Main(AppShell::new()),
            _hash_subscription: subscription,
        };
        shell.mount_view();
        shell
    }

    /// Remount if the route changed since the last mount. Returns true when
    /// the view was replaced.
    pub fn sync(&mut self) -> bool {
        if self.router.borrow().generation() == self.mounted_generation {
            return false;
        }
        self.mount_view();
        true
    }

    fn mount_view(&mut self) {
        let (route, generation) = {
            let router = self.router.borrow();
            (router.route().clone(), router.generation())
        };
        debug!(?route, generation, "mounting view");
        self.mounted_generation = generation;
        match route {
            Route::Main => {
                let mut app = AppShell::new();
                app.load_files(self.api);
                self.view = View::Main(app);
            }
            Route::Download { file_id } => {
                self.view = View::Download(DownloadView::new(file_id.clone()));
                let request = InfoRequest {
                    generation,
                    file_id,
                };
                let result = self.api.file_info(&request.file_id);
                self.deliver_info(&request, result);
            }
        }
    }

    /// Hand an info response to the download view it was requested for.
    /// Responses for a view that has since been replaced are dropped.
    pub fn deliver_info(
        &mut self,
        request: &InfoRequest,
        result: Result<FileRecord, ApiError>,
    ) -> bool {
        if request.generation != self.mounted_generation {
            debug!(file_id = %request.file_id, "discarding info for unmounted view");
            return false;
        }
        match &mut self.view {
            View::Download(view) if view.file_id() == request.file_id => {
                view.apply(result);
                true
            }
            _ => false,
        }
    }

    /// Request descriptor for the mounted download view, if that is what is
    /// showing.
    pub fn info_request(&self) -> Option<InfoRequest> {
        match &self.view {
            View::Download(view) => Some(InfoRequest {
                generation: self.mounted_generation,
                file_id: view.file_id().to_string(),
            }),
            View::Main(_) => None,
        }
    }

    pub fn route(&self) -> Route {
        self.router.borrow().route().clone()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    pub fn env(&self) -> &dyn Environment {
        self.env
    }

    pub fn api(&self) -> &dyn FileApi {
        self.api
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
