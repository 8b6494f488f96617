//! Command history paging
//!
//! Offset-based paging over `GET /api/commands`. The pager owns the
//! offset and stamps every request with a generation so that a response
//! arriving after a newer page was requested can be recognised and dropped.

use chrono::{DateTime, Utc};

use crate::domain::command::Command;

/// Number of commands shown per page
pub const PAGE_SIZE: u32 = 10;

/// A fetch the caller should issue for the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u32,
    pub num: u32,
    pub generation: u64,
}

/// One row of the history table
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    /// 1-based position, counted from the start of the history
    pub index: u64,
    pub timestamp: Option<DateTime<Utc>>,
    pub command_type: String,
    /// `(id, value)` pairs of the command's fields
    pub fields: Vec<(String, String)>,
    pub resend_link: String,
}

impl HistoryRow {
    fn from_command(index: u64, command: &Command) -> Self {
        Self {
            index,
            timestamp: command.timestamp(),
            command_type: command.command_type.clone(),
            fields: command
                .field_descriptions
                .iter()
                .map(|fd| {
                    let value = fd.value.as_ref().map(|v| v.to_string()).unwrap_or_default();
                    (fd.id.clone(), value)
                })
                .collect(),
            resend_link: command.resend_link(),
        }
    }

    /// Fields rendered as `id=value` pairs, or "N/A" when there are none
    pub fn data_summary(&self) -> String {
        if self.fields.is_empty() {
            return "N/A".to_string();
        }
        self.fields
            .iter()
            .map(|(id, value)| format!("{}={}", id, value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Paging state for the command history view
#[derive(Debug, Clone)]
pub struct HistoryPager {
    offset: u32,
    page_size: u32,
    generation: u64,
    rows: Vec<HistoryRow>,
}

impl HistoryPager {
    pub fn new() -> Self {
        Self::with_page_size(PAGE_SIZE)
    }

    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            offset: 0,
            page_size,
            generation: 0,
            rows: Vec::new(),
        }
    }

    /// Start at a given offset instead of the first page
    pub fn starting_at(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Request the current page again
    pub fn refresh(&mut self) -> PageRequest {
        self.generation += 1;
        PageRequest {
            offset: self.offset,
            num: self.page_size,
            generation: self.generation,
        }
    }

    /// Advance one page
    pub fn next(&mut self) -> PageRequest {
        self.offset = self.offset.saturating_add(self.page_size);
        self.refresh()
    }

    /// Go back one page, never below offset 0
    pub fn previous(&mut self) -> PageRequest {
        self.offset = self.offset.saturating_sub(self.page_size);
        self.refresh()
    }

    /// Apply a fetched page
    ///
    /// Returns `false` and leaves the rows untouched when `request` is not
    /// the most recent one issued.
    pub fn apply(&mut self, request: PageRequest, commands: &[Command]) -> bool {
        if request.generation != self.generation {
            return false;
        }

        self.rows = commands
            .iter()
            .zip(u64::from(request.offset) + 1..)
            .map(|(command, index)| HistoryRow::from_command(index, command))
            .collect();
        true
    }

    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }
}

impl Default for HistoryPager {
    fn default() -> Self {
        Self::new()
    }
}
