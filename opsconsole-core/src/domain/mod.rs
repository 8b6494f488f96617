//! Core domain types
//!
//! This module contains the structures the console works with: commands and
//! their field schema, process statuses, and log tail records. They mirror
//! what the backend sends and carry the small pieces of behavior that
//! depend only on the data itself.

pub mod command;
pub mod log;
pub mod status;
