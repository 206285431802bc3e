use std::sync::Arc;

use thiserror::Error;

use crate::{
    consts::consts::{TOKEN_KEY, USER_KEY},
    http::client::{ApiClient, ApiError},
    model::session::{LoginRequest, LoginResponse, Session, UserData},
    storage::{KeyValueStore, StoreError},
};

pub const LOGIN_API_PATH: &str = "/auth/login";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unable to reach the server, try again later ({0})")]
    ConnectionFailure(String),
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        AuthError::ConnectionFailure(error.to_string())
    }
}

/// Owns the token and user descriptor in the durable store. The server alone decides whether the
/// token is still valid, nothing here checks expiry.
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    client: ApiClient,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, client: ApiClient) -> Self {
        Self { store, client }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token().is_some()
    }

    pub fn auth_token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                log::error!("Unable to read token: {}", e);
                None
            }
        }
    }

    pub fn current_user(&self) -> Option<UserData> {
        let raw = match self.store.get(USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::error!("Unable to read user: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("Ignoring unreadable stored user: {}", e);
                None
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response: LoginResponse = self
            .client
            .post(LOGIN_API_PATH, &request)
            .await
            .map_err(|e| match e {
                ApiError::Unauthorized => AuthError::InvalidCredentials,
                other => AuthError::ConnectionFailure(other.to_string()),
            })?;

        let session = Session::from(response);

        self.persist(&session)?;

        log::info!("Signed in [UserId: {}]", session.user.id);

        Ok(session)
    }

    pub fn logout(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.store.remove(key) {
                log::error!("Unable to remove [{}] on logout: {}", key, e);
            }
        }

        log::info!("Signed out");
    }

    fn persist(&self, session: &Session) -> Result<(), AuthError> {
        let user = serde_json::to_string(&session.user)
            .map_err(|e| AuthError::ConnectionFailure(e.to_string()))?;

        self.store.set(TOKEN_KEY, &session.token)?;

        // A token without its user would leave a half written session behind
        if let Err(e) = self.store.set(USER_KEY, &user) {
            let _ = self.store.remove(TOKEN_KEY);
            return Err(e.into());
        }

        Ok(())
    }
}
