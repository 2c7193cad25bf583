//! Persistence for the `SERVICECOVERAGES` table.
pub mod errors;
pub mod db;
pub mod coverage;

#[cfg(test)]
mod tests;
