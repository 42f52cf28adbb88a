use derive_more::Display;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static PHONE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone number pattern compiles"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("integer pattern compiles"));

///
/// Pattern
///
/// Named value shapes a text field can be held to.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum Pattern {
    Email,
    Integer,
    PhoneNumber,
}

impl Pattern {
    fn regex(self) -> &'static Regex {
        match self {
            Self::Email => &EMAIL,
            Self::Integer => &INTEGER,
            Self::PhoneNumber => &PHONE_NUMBER,
        }
    }

    #[must_use]
    pub fn matches(self, s: &str) -> bool {
        self.regex().is_match(s)
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Email => "Enter a valid email address",
            Self::Integer => "Enter a valid number",
            Self::PhoneNumber => "Enter a valid 10-digit phone number",
        }
    }
}

///
/// TESTS
///
