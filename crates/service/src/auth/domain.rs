use serde::{Deserialize, Serialize};

/// Identity resolved from a valid token; stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub username: String,
}
