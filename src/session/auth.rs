use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    model::session::Session,
    router::route::{self, Route},
};

use super::session::{AuthError, SessionStore};

/// Process wide `is_authenticated` flag. Read from the session store once when built (i.e. on every
/// page load), afterwards only `login` and `logout` on this context write to it.
///
/// A 401 eviction does not touch the flag, it causes a navigation and the front end rebuilds the
/// context from the store.
#[derive(Clone)]
pub struct AuthContext {
    session: Arc<SessionStore>,
    authenticated: Arc<watch::Sender<bool>>,
}

impl AuthContext {
    pub fn new(session: Arc<SessionStore>) -> Self {
        let (sender, _) = watch::channel(session.is_authenticated());

        Self {
            session,
            authenticated: Arc::new(sender),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        match self.session.login(username, password).await {
            Ok(session) => {
                self.authenticated.send_replace(true);
                Ok(session)
            }
            Err(e) => {
                self.authenticated.send_replace(false);
                Err(e)
            }
        }
    }

    pub fn logout(&self) {
        self.session.logout();
        self.authenticated.send_replace(false);
    }

    /// Route guard, protected routes redirect to login while signed out
    pub fn guard(&self, route: Route) -> Route {
        route::guard(route, self.is_authenticated())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        consts::consts::TOKEN_KEY,
        http::client::ApiClient,
        options::ClientOptions,
        storage::{memory::MemoryStore, KeyValueStore},
    };

    use super::*;

    fn new_test_context(token: Option<&str>) -> (Arc<dyn KeyValueStore>, AuthContext) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        if let Some(token) = token {
            store.set(TOKEN_KEY, token).unwrap();
        }

        let client = ApiClient::new(&ClientOptions::new_test("http://127.0.0.1:9")).unwrap();
        let session = Arc::new(SessionStore::new(store.clone(), client));

        (store, AuthContext::new(session))
    }

    #[test]
    fn derived_once_from_the_store() {
        let (store, context) = new_test_context(Some("abc"));

        assert!(context.is_authenticated());

        // Removing the token behind the context's back does not flip the flag
        store.remove(TOKEN_KEY).unwrap();

        assert!(context.is_authenticated());
        assert!(!AuthContext::new(Arc::new(SessionStore::new(
            store,
            ApiClient::new(&ClientOptions::new_test("http://127.0.0.1:9")).unwrap()
        )))
        .is_authenticated());
    }

    #[test]
    fn logout_is_seen_by_every_clone() {
        let (store, context) = new_test_context(Some("abc"));
        let header = context.clone();

        context.logout();

        assert!(!header.is_authenticated());
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(header.guard(Route::Dashboard), Route::login());
    }

    #[tokio::test]
    async fn failed_login_leaves_flag_false() {
        let (_, context) = new_test_context(None);

        let result = context.login("admin", "secret").await;

        assert!(result.is_err());
        assert!(!context.is_authenticated());
    }
}
