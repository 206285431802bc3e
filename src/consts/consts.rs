use std::time::Duration;

use serde::{Deserialize, Serialize};

// New Type Pattern -- https://doc.rust-lang.org/rust-by-example/generics/new_types.html
/// Backend assigned record identifier. v1 records carry an opaque string, v2 records a number,
/// both travel through the url path as text.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PersonId(pub String);

impl PersonId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for PersonId {
    fn from(value: u64) -> Self {
        PersonId(value.to_string())
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        PersonId(value.to_string())
    }
}

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageNumber(pub usize);

impl PageNumber {
    pub fn to_number(self) -> usize {
        self.0
    }

    pub fn increment(&self) -> PageNumber {
        PageNumber(self.0 + 1)
    }

    pub fn decrement(&self) -> PageNumber {
        PageNumber(self.0.saturating_sub(1).max(1))
    }
}

// Values
pub const FIRST_PAGE: PageNumber = PageNumber(1);

/// Storage keys of the durable session store
pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_ITEMS_PER_PAGE: usize = 5;
pub const VISIBLE_PAGE_WINDOW: usize = 5;
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Maximum length of a masked CPF, `000.000.000-00`
pub const CPF_MASKED_LENGTH: usize = 14;
pub const CPF_DIGITS: usize = 11;
