use serde::{Deserialize, Serialize};

/// Identity of whoever is requesting estimates.
///
/// Passed explicitly to the estimation entry point and recorded on every
/// issued quote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user: String,
}

impl Session {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}
