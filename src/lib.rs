//! Castor - Gemini protocol client
//!
//! Core library for the line-oriented, TLS-wrapped request/response
//! protocol: Trust-On-First-Use certificate validation and typed response
//! parsing.

pub mod config;
pub mod error;
pub mod options;
pub mod protocol;
pub mod request;
pub mod security;
