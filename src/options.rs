use std::{path::PathBuf, time::Duration};

use strum_macros::{Display, EnumString};

use crate::{
    consts::consts::{DEFAULT_BASE_URL, DEFAULT_ITEMS_PER_PAGE, SEARCH_DEBOUNCE},
    persons::editor::ValidationRules,
    router::route::Route,
};

/// Which generation of the backend api the client talks to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    /// Landing route after a successful login
    pub fn home_route(&self) -> Route {
        match self {
            ApiVersion::V1 => Route::Persons,
            ApiVersion::V2 => Route::Dashboard,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: Option<String>,
    pub api_version: ApiVersion,
    pub items_per_page: usize,
    pub search_debounce: Duration,
    pub request_timeout: Option<Duration>,
    pub session_file: PathBuf,
    pub validation: ValidationRules,
}

// Implements: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
impl ClientOptions {
    pub fn set_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn set_api_version(mut self, api_version: ApiVersion) -> Self {
        self.api_version = api_version;
        self
    }

    /// Page size sent with every list request, the backend may answer with a different one
    pub fn set_items_per_page(mut self, items_per_page: usize) -> Self {
        self.items_per_page = items_per_page.max(1);
        self
    }

    /// Quiet period after the last search keystroke before a fetch is issued
    pub fn set_search_debounce(mut self, search_debounce: Duration) -> Self {
        self.search_debounce = search_debounce;
        self
    }

    pub fn set_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn set_session_file(mut self, session_file: PathBuf) -> Self {
        self.session_file = session_file;
        self
    }

    pub fn set_validation(mut self, validation: ValidationRules) -> Self {
        self.validation = validation;
        self
    }

    /// A missing base url is a configuration error but not a fatal one, requests go to the default host.
    /// Resolved once by `ApiClient::new`, read it back through `ApiClient::base_url`.
    pub(crate) fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
            _ => {
                log::error!(
                    "No API base url configured, falling back to [{}]",
                    DEFAULT_BASE_URL
                );

                DEFAULT_BASE_URL.to_string()
            }
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            api_version: ApiVersion::V2,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            search_debounce: SEARCH_DEBOUNCE,
            request_timeout: None,
            session_file: PathBuf::from("data").join("session.json"),
            validation: ValidationRules::standard(),
        }
    }
}

#[cfg(test)]
impl ClientOptions {
    pub fn new_test(base_url: &str) -> Self {
        ClientOptions::default()
            .set_base_url(Some(base_url.to_string()))
            .set_search_debounce(Duration::from_millis(50))
    }
}
