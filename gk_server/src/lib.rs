//! HTTP transport adapter for the gatekeeper session authority.
//!
//! Maps inbound wire actions onto authority operations and serializes the
//! outcomes; owns no authentication state of its own.

pub mod api;
pub mod config;
pub mod logging;
