//! Service layer for the coverage API.
//! - Validates and shapes request/response payloads.
//! - Holds the static API token table.
//! - Wraps the record store behind a repository trait.

pub mod errors;
pub mod auth;
pub mod pagination;
pub mod coverage;
