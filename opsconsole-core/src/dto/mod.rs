//! Data Transfer Objects for the backend API
//!
//! Envelopes the backend wraps around domain types, and request bodies the
//! console sends.

pub mod command;
pub mod status;
