// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Capture Sink
//!
//! Ordered in-memory log of every statement dispatched during a test.
//!
//! One sink belongs to one fixture instance. Sessions created by the fixture
//! share it through an `Arc`, so parallel fixtures never see each other's
//! statements. Recording is synchronous and happens before the store round-trip,
//! which keeps capture order equal to dispatch order under async execution.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::output::OutputHelper;
use crate::statement::CapturedStatement;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-fixture SQL capture log
#[derive(Default)]
pub struct CaptureSink {
    statements: Mutex<Vec<CapturedStatement>>,
    output: Mutex<Option<Arc<dyn OutputHelper>>>,
}

impl std::fmt::Debug for CaptureSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSink")
            .field("statements", &self.len())
            .field("has_output", &self.has_output_helper())
            .finish()
    }
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink behind an `Arc`, ready to be shared with sessions
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Discard every captured statement
    pub fn clear(&self) {
        lock(&self.statements).clear();
    }

    /// Append a statement to the log
    pub fn record(&self, statement: CapturedStatement) {
        let rendered = {
            let output = lock(&self.output);
            output.as_ref().map(|helper| (helper.clone(), statement.render()))
        };

        let index = {
            let mut statements = lock(&self.statements);
            statements.push(statement);
            statements.len() - 1
        };
        tracing::debug!(target: "query_baseline::capture", index, "statement recorded");

        if let Some((helper, text)) = rendered {
            for line in text.lines() {
                helper.write_line(line);
            }
            helper.write_line("");
        }
    }

    /// Snapshot of the statements captured since the last clear
    pub fn statements(&self) -> Vec<CapturedStatement> {
        lock(&self.statements).clone()
    }

    /// Baseline text of every captured statement, in order
    pub fn rendered(&self) -> Vec<String> {
        lock(&self.statements)
            .iter()
            .map(CapturedStatement::render)
            .collect()
    }

    /// Drain the log, returning what was captured
    pub fn take(&self) -> Vec<CapturedStatement> {
        std::mem::take(&mut *lock(&self.statements))
    }

    /// All captured statements joined by a blank line
    pub fn sql(&self) -> String {
        self.rendered().join("\n\n")
    }

    pub fn len(&self) -> usize {
        lock(&self.statements).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.statements).is_empty()
    }

    /// Stream every subsequently recorded statement to `helper`
    pub fn set_output_helper(&self, helper: Arc<dyn OutputHelper>) {
        *lock(&self.output) = Some(helper);
    }

    pub fn clear_output_helper(&self) {
        *lock(&self.output) = None;
    }

    pub fn has_output_helper(&self) -> bool {
        lock(&self.output).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Parameter;

    #[test]
    fn test_record_preserves_dispatch_order() {
        let sink = CaptureSink::new();
        sink.record(CapturedStatement::new("SELECT 1"));
        sink.record(CapturedStatement::new("SELECT 2"));
        sink.record(CapturedStatement::new("SELECT 3"));

        let sql: Vec<String> = sink.statements().into_iter().map(|s| s.sql).collect();
        assert_eq!(sql, vec!["SELECT 1", "SELECT 2", "SELECT 3"]);
    }

    #[test]
    fn test_clear_discards_everything() {
        let sink = CaptureSink::new();
        sink.record(CapturedStatement::new("SELECT 1"));
        sink.clear();
        assert!(sink.is_empty());
        assert_eq!(sink.sql(), "");
    }

    #[test]
    fn test_take_drains() {
        let sink = CaptureSink::new();
        sink.record(CapturedStatement::new("SELECT 1"));
        assert_eq!(sink.take().len(), 1);
        assert_eq!(sink.len(), 0);
    }

    #[test]
    fn test_sql_joins_with_blank_line() {
        let sink = CaptureSink::new();
        sink.record(CapturedStatement::new("SELECT 1"));
        sink.record(CapturedStatement::new("SELECT @p").with_parameter(Parameter::new("p", 2)));
        assert_eq!(sink.sql(), "SELECT 1\n\n@p='2'\n\nSELECT @p");
    }

    #[test]
    fn test_output_helper_receives_rendered_lines() {
        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let collected = lines.clone();
        let sink = CaptureSink::new();
        sink.set_output_helper(Arc::new(move |line: &str| {
            collected.lock().unwrap().push(line.to_string())
        }));

        sink.record(CapturedStatement::new("SELECT @p").with_parameter(Parameter::new("p", 1)));
        sink.clear_output_helper();
        sink.record(CapturedStatement::new("SELECT 2"));

        assert_eq!(
            lines.lock().unwrap().as_slice(),
            ["@p='1'", "", "SELECT @p", ""]
        );
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_shared_sink_across_threads() {
        let sink = CaptureSink::shared();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sink = sink.clone();
                std::thread::spawn(move || sink.record(CapturedStatement::new(format!("SELECT {i}"))))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(sink.len(), 4);
    }
}
