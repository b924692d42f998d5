//! Data Transfer Objects for the GitHub API boundary
//!
//! Wire shapes for the fixed set of endpoints windlass talks to. The request
//! and response layouts are dictated by the provider and must be matched
//! exactly for interoperability.

pub mod artifact;
pub mod auth;
pub mod run;
