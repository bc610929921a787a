//! Core domain + relay pipeline for the Telegram message relay bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the audit
//! storage backends live behind ports (traits) implemented in adapter crates.

pub mod admin;
pub mod audit;
pub mod classify;
pub mod config;
pub mod domain;
pub mod errors;
pub mod forward;
pub mod gate;
pub mod logging;
pub mod messaging;
pub mod relay;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
