use std::collections::HashMap;
use std::fmt;

use super::domain::AuthUser;
use super::errors::AuthError;
use super::DEFAULT_USERNAME;

/// Immutable token -> username mapping built once at startup.
#[derive(Clone)]
pub struct TokenTable {
    tokens: HashMap<String, String>,
}

impl TokenTable {
    /// Table holding only `secret`, bound to [`DEFAULT_USERNAME`].
    pub fn single(secret: impl Into<String>) -> Self {
        let mut tokens = HashMap::with_capacity(1);
        tokens.insert(secret.into(), DEFAULT_USERNAME.to_string());
        Self { tokens }
    }

    /// Username for an exactly matching token.
    pub fn verify(&self, token: &str) -> Option<&str> {
        if token.is_empty() {
            return None;
        }
        self.tokens.get(token).map(String::as_str)
    }

    /// Resolve an optional header value into an [`AuthUser`].
    pub fn authenticate(&self, presented: Option<&str>) -> Result<AuthUser, AuthError> {
        let token = match presented {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::MissingToken),
        };
        self.verify(token)
            .map(|username| AuthUser { username: username.to_string() })
            .ok_or(AuthError::InvalidToken)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

// never print the secrets themselves
impl fmt::Debug for TokenTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenTable").field("entries", &self.tokens.len()).finish()
    }
}
