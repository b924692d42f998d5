//! Windlass Core
//!
//! Core types for the windlass workflow dispatcher.
//!
//! This crate contains:
//! - Domain types: Core entities (DeviceAuthorization, WorkflowRun, Artifact, etc.)
//! - DTOs: Wire shapes exchanged with the GitHub API

pub mod domain;
pub mod dto;
