//! Event Blog API library.
//!
//! The collection lifecycle and consistency layer lives in [`db`]; the HTTP
//! surface in [`routes`] is a thin client of it. Exposed as a library so the
//! router can be driven in tests and the CLI can reuse the same layer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
