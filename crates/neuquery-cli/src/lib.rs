//! neuquery CLI - command line tools for the query service.
//!
//! This crate provides two binaries:
//! - generate_token: mints a signed access token from a local secret
//! - run_query: runs a Cypher query and prints the resulting rows

pub mod auth;

pub use auth::{generate_token, load_app_secret, parse_expiration, TokenError};
