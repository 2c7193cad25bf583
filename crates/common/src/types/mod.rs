use serde::{Deserialize, Serialize};

/// Fixed text returned by the root health check.
pub const GREETING: &str = "This is the Coverage API server";

/// Plain `{"message": "..."}` response body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn greeting() -> Self {
        Self::new(GREETING)
    }
}
