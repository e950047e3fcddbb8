//! Service-specific client implementations
//!
//! This module contains client implementations for the external services the
//! relay talks to.

pub mod sheets;
pub mod webhook;
mod common;
