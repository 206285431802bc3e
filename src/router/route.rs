use std::sync::Arc;

use tokio::sync::watch;

pub const LOGIN_PATH: &str = "/login";
pub const PERSONS_PATH: &str = "/persons";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const SESSION_EXPIRED_PARAM: &str = "session_expired";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// `session_expired` is set when a 401 forced the user out
    Login { session_expired: bool },
    /// v1 person list
    Persons,
    /// v2 paginated person dashboard
    Dashboard,
}

impl Route {
    pub fn login() -> Self {
        Route::Login {
            session_expired: false,
        }
    }

    pub fn session_expired() -> Self {
        Route::Login {
            session_expired: true,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login {
                session_expired: true,
            } => format!("{}?{}=true", LOGIN_PATH, SESSION_EXPIRED_PARAM),
            Route::Login {
                session_expired: false,
            } => LOGIN_PATH.to_string(),
            Route::Persons => PERSONS_PATH.to_string(),
            Route::Dashboard => DASHBOARD_PATH.to_string(),
        }
    }

    /// Unknown paths resolve to the login page
    pub fn parse(path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };

        match path.trim_end_matches('/') {
            PERSONS_PATH => Route::Persons,
            DASHBOARD_PATH => Route::Dashboard,
            _ => {
                let session_expired = query
                    .map(|query| {
                        query.split('&').any(|pair| match pair.split_once('=') {
                            Some((key, value)) => key == SESSION_EXPIRED_PARAM && !value.is_empty(),
                            None => false,
                        })
                    })
                    .unwrap_or(false);

                Route::Login { session_expired }
            }
        }
    }

    pub fn is_login(&self) -> bool {
        matches!(self, Route::Login { .. })
    }

    pub fn is_protected(&self) -> bool {
        !self.is_login()
    }
}

/// Protected routes require an authenticated session, everything else passes through
pub fn guard(route: Route, is_authenticated: bool) -> Route {
    if route.is_protected() && !is_authenticated {
        return Route::login();
    }

    route
}

/// Tracks the current route. Redirects issued from deep inside the http pipeline are published here
/// and picked up by whichever front end is subscribed.
#[derive(Clone, Debug)]
pub struct Navigator {
    current: Arc<watch::Sender<Route>>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (sender, _) = watch::channel(initial);

        Self {
            current: Arc::new(sender),
        }
    }

    pub fn current(&self) -> Route {
        self.current.borrow().clone()
    }

    pub fn navigate(&self, route: Route) {
        log::debug!("Navigating to [{}]", route.path());

        self.current.send_replace(route);
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Navigator::new(Route::login())
    }
}
