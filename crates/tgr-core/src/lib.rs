//! Core routing + session lifecycle for the Telegram group relay.
//!
//! This crate is intentionally transport-agnostic. The MTProto client and the
//! terminal prompt live behind ports (traits) implemented in adapter crates.

pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod forwarder;
pub mod logging;
pub mod mapping;
pub mod ports;
pub mod resolver;
pub mod router;
pub mod session_store;

pub use errors::{Error, Result};
