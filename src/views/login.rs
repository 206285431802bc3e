use thiserror::Error;

use crate::{
    model::session::Session,
    notify::Notifier,
    router::route::{Navigator, Route},
    session::{auth::AuthContext, session::AuthError},
};

pub const BLANK_FIELDS_MESSAGE: &str = "Fill in every field";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";
pub const UNREACHABLE_MESSAGE: &str = "Server unreachable, try again later";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

#[derive(Error, Debug)]
pub enum LoginFailure {
    #[error("{}", BLANK_FIELDS_MESSAGE)]
    BlankFields,
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl LoginFailure {
    /// Text shown to the user, never the underlying transport error
    pub fn user_message(&self) -> &'static str {
        match self {
            LoginFailure::BlankFields => BLANK_FIELDS_MESSAGE,
            LoginFailure::Auth(AuthError::InvalidCredentials) => INVALID_CREDENTIALS_MESSAGE,
            LoginFailure::Auth(AuthError::ConnectionFailure(_)) => UNREACHABLE_MESSAGE,
        }
    }
}

pub struct LoginView {
    auth: AuthContext,
    navigator: Navigator,
    notifier: Notifier,
    home: Route,
    pub username: String,
    pub password: String,
    is_loading: bool,
}

impl LoginView {
    /// `home` is where a successful login lands, the list route of the configured api version
    pub fn new(auth: AuthContext, navigator: Navigator, notifier: Notifier, home: Route) -> Self {
        Self {
            auth,
            navigator,
            notifier,
            home,
            username: String::new(),
            password: String::new(),
            is_loading: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn session_expired_banner(&self) -> Option<&'static str> {
        match self.navigator.current() {
            Route::Login {
                session_expired: true,
            } => Some(SESSION_EXPIRED_MESSAGE),
            _ => None,
        }
    }

    pub async fn submit(&mut self) -> Result<Session, LoginFailure> {
        if self.username.trim().is_empty() || self.password.trim().is_empty() {
            self.notifier.warning(BLANK_FIELDS_MESSAGE);
            return Err(LoginFailure::BlankFields);
        }

        self.is_loading = true;
        let result = self.auth.login(&self.username, &self.password).await;
        self.is_loading = false;

        match result {
            Ok(session) => {
                self.navigator.navigate(self.home.clone());
                Ok(session)
            }
            Err(e) => {
                let failure = LoginFailure::from(e);

                self.notifier.error(failure.user_message());
                self.username.clear();
                self.password.clear();

                Err(failure)
            }
        }
    }
}
