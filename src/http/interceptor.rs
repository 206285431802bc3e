use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};

use crate::{
    consts::consts::TOKEN_KEY,
    router::route::{Navigator, Route},
    storage::KeyValueStore,
};

pub trait RequestInterceptor: Send + Sync {
    fn on_request(&self, request: RequestBuilder) -> RequestBuilder;
}

pub trait ResponseInterceptor: Send + Sync {
    fn on_response(&self, status: StatusCode);
}

/// Adds `Authorization: Bearer <token>` whenever the store holds a token
pub struct BearerToken {
    store: Arc<dyn KeyValueStore>,
}

impl BearerToken {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl RequestInterceptor for BearerToken {
    fn on_request(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.get(TOKEN_KEY) {
            Ok(Some(token)) => request.bearer_auth(token),
            Ok(None) => request,
            Err(e) => {
                log::warn!("Unable to read token, sending request unauthenticated: {}", e);
                request
            }
        }
    }
}

/// Evicts the token on any 401 and sends the user back to the login page with the expired flag.
/// Already being on the login page (a failed login) only evicts.
pub struct SessionExpiry {
    store: Arc<dyn KeyValueStore>,
    navigator: Navigator,
}

impl SessionExpiry {
    pub fn new(store: Arc<dyn KeyValueStore>, navigator: Navigator) -> Self {
        Self { store, navigator }
    }
}

impl ResponseInterceptor for SessionExpiry {
    fn on_response(&self, status: StatusCode) {
        if status != StatusCode::UNAUTHORIZED {
            return;
        }

        if let Err(e) = self.store.remove(TOKEN_KEY) {
            log::error!("Unable to evict expired token: {}", e);
        }

        if !self.navigator.current().is_login() {
            log::warn!("Session expired, redirecting to login");

            self.navigator.navigate(Route::session_expired());
        }
    }
}
