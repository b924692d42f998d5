//! Core domain types
//!
//! This module contains the core domain structures used across windlass.
//! These types represent the entities the pipeline moves through: the
//! device-authorization grant, the authenticated actor, the workflow run
//! being tracked, and the artifact it produces.

pub mod artifact;
pub mod auth;
pub mod run;
