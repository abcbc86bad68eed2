//! Shared types for the takuhai voice-assistant backend: the error type,
//! the configuration tree, the tracking record model with its composite
//! sort key, and structured trace events.

pub mod config;
pub mod error;
pub mod trace;
pub mod tracking;
