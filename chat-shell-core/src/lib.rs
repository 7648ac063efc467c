//! Core types and traits for chat-shell
//!
//! This crate provides the message model, the key-value storage seam,
//! session and credential persistence, configuration, logging and the
//! event bus used by the other chat-shell crates.

pub mod bus;
pub mod config;
pub mod credential;
pub mod error;
pub mod logging;
pub mod session;
pub mod storage;
pub mod utils;

pub use error::{Error, Result};
