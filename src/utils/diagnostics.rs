//! Deduplicated accumulation of semantic diagnostics
//!
//! Semantic problems are non-fatal: they are collected, deduplicated by
//! their (line, message) pair, and reported together after traversal.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

/// A reported, non-fatal problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Ordered collector; re-reporting the same (line, message) pair is a no-op
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    seen: HashSet<(usize, String)>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, line: usize, message: impl Into<String>) {
        let message = message.into();
        if self.seen.insert((line, message.clone())) {
            self.entries.push(Diagnostic { line, message });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.seen.clear();
        std::mem::take(&mut self.entries)
    }
}
