//! Parse Tracing Facilities
//!
//! Lets a caller observe tokenizing and section splitting through a
//! callback. Nothing is formatted unless a callback is installed and the
//! event is in its mask.

use std::sync::Arc;

use crate::error::Error;

// ============================================================================
// Trace Flags
// ============================================================================

bitflags::bitflags! {
    /// Flags to control which events are traced
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TraceFlags: u32 {
        /// A source string was tokenized
        const TOKENIZE = 0x01;
        /// A new top-level section was opened
        const SECTION = 0x02;
        /// A tokenize or parse call failed
        const ERROR = 0x04;
    }
}

impl Default for TraceFlags {
    fn default() -> Self {
        TraceFlags::empty()
    }
}

// ============================================================================
// Trace Event
// ============================================================================

/// Type of trace event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    Tokenize,
    Section,
    Error,
}

impl TraceEvent {
    /// Get the flag corresponding to this event
    pub fn flag(&self) -> TraceFlags {
        match self {
            TraceEvent::Tokenize => TraceFlags::TOKENIZE,
            TraceEvent::Section => TraceFlags::SECTION,
            TraceEvent::Error => TraceFlags::ERROR,
        }
    }
}

// ============================================================================
// Trace Info
// ============================================================================

/// Information passed to trace callbacks
#[derive(Debug, Clone)]
pub struct TraceInfo {
    pub event: TraceEvent,
    /// Event subject: the source, the section name, or the error text
    pub detail: String,
    /// Token count (Tokenize) or token index (Section)
    pub count: Option<usize>,
}

impl TraceInfo {
    pub fn tokenize(source: &str, token_count: usize) -> Self {
        Self {
            event: TraceEvent::Tokenize,
            detail: source.to_string(),
            count: Some(token_count),
        }
    }

    pub fn section(name: &str, token_index: usize) -> Self {
        Self {
            event: TraceEvent::Section,
            detail: name.to_string(),
            count: Some(token_index),
        }
    }

    pub fn error(err: &Error) -> Self {
        Self {
            event: TraceEvent::Error,
            detail: err.to_string(),
            count: None,
        }
    }

    /// Format as a human-readable line
    pub fn render(&self) -> String {
        match self.event {
            TraceEvent::Tokenize => format!(
                "TOKENIZE: {} -- {} tokens",
                self.detail,
                self.count.unwrap_or(0)
            ),
            TraceEvent::Section => format!(
                "SECTION: {} (token {})",
                self.detail,
                self.count.unwrap_or(0)
            ),
            TraceEvent::Error => format!("ERROR: {}", self.detail),
        }
    }
}

// ============================================================================
// Tracer
// ============================================================================

/// Callback function for trace events
pub type TraceCallback = Arc<dyn Fn(&TraceInfo) + Send + Sync>;

/// Tracer configuration for a parser
#[derive(Clone)]
pub struct Tracer {
    callback: Option<TraceCallback>,
    mask: TraceFlags,
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer {
    /// Create a new tracer with no callback
    pub fn new() -> Self {
        Self {
            callback: None,
            mask: TraceFlags::empty(),
        }
    }

    /// Set the trace callback and mask
    pub fn set(&mut self, callback: Option<TraceCallback>, mask: TraceFlags) {
        self.callback = callback;
        self.mask = mask;
    }

    /// Check if a particular event type should be traced
    pub fn should_trace(&self, event: TraceEvent) -> bool {
        self.callback.is_some() && self.mask.contains(event.flag())
    }

    fn emit(&self, info: &TraceInfo) {
        if let Some(ref cb) = self.callback {
            cb(info);
        }
    }

    pub fn trace_tokenize(&self, source: &str, token_count: usize) {
        if self.should_trace(TraceEvent::Tokenize) {
            self.emit(&TraceInfo::tokenize(source, token_count));
        }
    }

    pub fn trace_section(&self, name: &str, token_index: usize) {
        if self.should_trace(TraceEvent::Section) {
            self.emit(&TraceInfo::section(name, token_index));
        }
    }

    pub fn trace_error(&self, err: &Error) {
        if self.should_trace(TraceEvent::Error) {
            self.emit(&TraceInfo::error(err));
        }
    }
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("has_callback", &self.callback.is_some())
            .field("mask", &self.mask)
            .finish()
    }
}
