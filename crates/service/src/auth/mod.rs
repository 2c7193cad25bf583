//! Auth module: a static token table checked before every data operation.
//!
//! There is exactly one valid token, loaded from configuration at startup. It
//! grants access to every operation, destructive ones included.

pub mod domain;
pub mod errors;
pub mod service;

pub use domain::AuthUser;
pub use errors::AuthError;
pub use service::TokenTable;

/// Request header carrying the API token.
pub const TOKEN_HEADER: &str = "API_TOKEN";
/// Scheme advertised in `WWW-Authenticate` and the OpenAPI document.
pub const TOKEN_SCHEME: &str = "ApiKey";
/// Username bound to the configured token.
pub const DEFAULT_USERNAME: &str = "appuser";
