//! opsconsole Core
//!
//! Core types and presentation logic for the operator console.
//!
//! This crate contains:
//! - Domain types: commands, field schemas, process statuses, log records
//! - DTOs: request/response envelopes of the backend API
//! - Presentation state: command forms, history paging, HTML rendering
//!
//! Nothing in here performs I/O; see `opsconsole-client` for that.

pub mod domain;
pub mod dto;
pub mod form;
pub mod history;
pub mod html;
