//! ITk production database module
//!
//! Everything the browser needs from the database goes through the
//! [`DatabaseClient`] and [`Authenticator`] traits: authenticate, read
//! commands and write commands.

pub mod types;
pub mod client;
pub mod errors;

#[cfg(test)]
pub mod testing;

pub use types::*;
pub use errors::{FailureKind, ItkdbError};
pub use client::{Authenticator, DatabaseClient, HttpAuthenticator, HttpClient};
