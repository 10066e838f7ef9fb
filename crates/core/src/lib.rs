//! Event Blog Core - Shared domain types.
//!
//! This crate provides the types used across all Event Blog components:
//! - `api` - HTTP API and the collection/consistency layer
//! - `cli` - Command-line tools for provisioning and connectivity checks
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Anything constructed here has already passed its
//! invariants, so storage code never sees an unvalidated value.
//!
//! # Modules
//!
//! - [`types`] - Identifier newtypes, emails, statuses and event windows

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
