// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test output helpers
//!
//! An [`OutputHelper`] is the optional side channel a capture sink streams every
//! recorded statement to. It never affects comparison results.
//!
//! [`BufferedOutput`] keeps lines in memory and writes them to a log file only
//! when a test fails, so passing runs leave the terminal clean.

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

const MAX_BUFFER_SIZE: usize = 10_000_000; // 10MB limit
const LOG_DIR: &str = "target/query-baseline-logs";

static LOG_SEQUENCE: AtomicUsize = AtomicUsize::new(0);

/// Human-readable channel receiving every recorded statement
pub trait OutputHelper: Send + Sync {
    fn write_line(&self, line: &str);
}

impl<F> OutputHelper for F
where
    F: Fn(&str) + Send + Sync,
{
    fn write_line(&self, line: &str) {
        self(line)
    }
}

/// Streams statements as `tracing` events
#[derive(Debug, Clone, Default)]
pub struct TracingOutput {
    test_name: Option<String>,
}

impl TracingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag every event with the running test's name
    pub fn for_test(test_name: impl Into<String>) -> Self {
        Self {
            test_name: Some(test_name.into()),
        }
    }
}

impl OutputHelper for TracingOutput {
    fn write_line(&self, line: &str) {
        match &self.test_name {
            Some(test) => tracing::info!(target: "query_baseline::sql", %test, "{line}"),
            None => tracing::info!(target: "query_baseline::sql", "{line}"),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Output buffered in memory and written to disk only on failure
pub struct BufferedOutput {
    log_dir: PathBuf,
    buffer: Mutex<Vec<String>>,
    writer: Mutex<Option<BufWriter<File>>>,
    flushed: AtomicBool,
    log_path: Mutex<Option<PathBuf>>,
}

impl BufferedOutput {
    /// Create a buffer that flushes into `log_dir`
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            buffer: Mutex::new(Vec::new()),
            writer: Mutex::new(None),
            flushed: AtomicBool::new(false),
            log_path: Mutex::new(None),
        }
    }

    /// Lines recorded so far and not yet written to disk
    pub fn buffered_lines(&self) -> Vec<String> {
        lock(&self.buffer).clone()
    }

    /// Path of the log file, once it has been created
    pub fn log_path(&self) -> Option<PathBuf> {
        lock(&self.log_path).clone()
    }

    pub fn is_flushed(&self) -> bool {
        self.flushed.load(Ordering::Acquire)
    }

    /// Write the buffered lines to a fresh timestamped log file
    ///
    /// Lines recorded afterwards go straight to that file. Calling this again
    /// is a no-op returning the same path.
    pub fn flush_to_file(&self) -> std::io::Result<PathBuf> {
        if let Some(path) = self.log_path() {
            return Ok(path);
        }

        create_dir_all(&self.log_dir)?;
        let log_path = self
            .log_dir
            .join(format!(
                "fail-{}-{}.log",
                format_timestamp(),
                LOG_SEQUENCE.fetch_add(1, Ordering::Relaxed)
            ));

        let mut writer = BufWriter::new(File::create(&log_path)?);
        {
            let mut buffer = lock(&self.buffer);
            for line in buffer.iter() {
                writeln!(writer, "{}", format_timestamped_line(line))?;
            }
            buffer.clear();
        }
        writer.flush()?;

        *lock(&self.writer) = Some(writer);
        *lock(&self.log_path) = Some(log_path.clone());
        self.flushed.store(true, Ordering::Release);
        Ok(log_path)
    }

    fn append_to_file(&self, line: &str) {
        if let Some(writer) = lock(&self.writer).as_mut() {
            let _ = writeln!(writer, "{}", format_timestamped_line(line));
            let _ = writer.flush();
        }
    }
}

impl OutputHelper for BufferedOutput {
    fn write_line(&self, line: &str) {
        if self.is_flushed() {
            self.append_to_file(line);
            return;
        }

        let mut buffer = lock(&self.buffer);
        let current_size: usize = buffer.iter().map(String::len).sum();
        if current_size > MAX_BUFFER_SIZE {
            drop(buffer);
            if self.flush_to_file().is_ok() {
                self.append_to_file(line);
            }
        } else {
            buffer.push(line.to_string());
        }
    }
}

/// `target/query-baseline-logs` of the workspace, relative to `.` outside cargo
pub fn workspace_log_dir() -> PathBuf {
    find_workspace_root()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(LOG_DIR)
}

/// Find the workspace root by searching upward for a Cargo.toml with `[workspace]`
pub fn find_workspace_root() -> std::io::Result<PathBuf> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "CARGO_MANIFEST_DIR not set")
    })?;
    find_workspace_root_from(Path::new(&manifest_dir))
}

fn find_workspace_root_from(start: &Path) -> std::io::Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let cargo_toml = current.join("Cargo.toml");
        if let Ok(content) = std::fs::read_to_string(&cargo_toml) {
            if content.contains("[workspace]") {
                return Ok(current);
            }
        }

        match current.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => current = parent.to_path_buf(),
            _ => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Workspace root not found",
                ));
            }
        }
    }
}

/// Current time as `YYYYMMDD-HHMMSS`
fn format_timestamp() -> String {
    chrono::Utc::now().format("%Y%m%d-%H%M%S").to_string()
}

fn format_timestamped_line(line: &str) -> String {
    format!("[{}] {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"), line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        let timestamp = format_timestamp();
        // YYYYMMDD-HHMMSS
        assert_eq!(timestamp.len(), 15);
        assert!(timestamp.contains('-'));
    }

    #[test]
    fn test_format_timestamped_line() {
        let timestamped = format_timestamped_line("SELECT 1");
        assert!(timestamped.starts_with('['));
        assert!(timestamped.ends_with("] SELECT 1"));
    }

    #[test]
    fn test_buffered_output_holds_lines_until_flush() {
        let dir = std::env::temp_dir().join(format!(
            "query-baseline-output-{}",
            std::process::id()
        ));
        let output = BufferedOutput::new(&dir);
        output.write_line("SELECT 1");
        output.write_line("SELECT 2");

        assert_eq!(output.buffered_lines(), vec!["SELECT 1", "SELECT 2"]);
        assert!(output.log_path().is_none());

        let path = output.flush_to_file().unwrap();
        output.write_line("SELECT 3");
        assert_eq!(output.flush_to_file().unwrap(), path);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("] SELECT 1"));
        assert!(content.contains("] SELECT 3"));
        assert!(output.buffered_lines().is_empty());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_workspace_log_dir_sits_under_workspace_target() {
        let root = find_workspace_root().unwrap();
        assert!(root.join("crates").join("capture").join("Cargo.toml").exists());
        assert_eq!(workspace_log_dir(), root.join(LOG_DIR));
    }

    #[test]
    fn test_workspace_root_skips_member_manifests() {
        let dir = std::env::temp_dir().join(format!("query-baseline-root-{}", std::process::id()));
        let member = dir.join("crates").join("member");
        create_dir_all(&member).unwrap();
        std::fs::write(dir.join("Cargo.toml"), "[workspace]\nmembers = [\"crates/*\"]\n").unwrap();
        std::fs::write(member.join("Cargo.toml"), "[package]\nname = \"member\"\n").unwrap();

        assert_eq!(find_workspace_root_from(&member).unwrap(), dir);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_tracing_output_emits_on_sql_target() {
        use crate::{CaptureSink, CapturedStatement};
        use std::sync::Arc;

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl Write for Captured {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_target(true)
            .with_max_level(tracing::Level::INFO)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let sink = CaptureSink::new();
            sink.set_output_helper(Arc::new(TracingOutput::for_test("include_reference [sync]")));
            sink.record(CapturedStatement::new("SELECT [c].[CustomerID] FROM [Customers] AS [c]"));
            sink.clear_output_helper();
            sink.record(CapturedStatement::new("SELECT 2"));
        });

        let logged = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("query_baseline::sql"));
        assert!(logged.contains("SELECT [c].[CustomerID] FROM [Customers] AS [c]"));
        assert!(logged.contains("include_reference [sync]"));
        assert!(!logged.contains("SELECT 2"));
    }

    #[test]
    fn test_closure_output_helper() {
        let lines = std::sync::Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let helper = move |line: &str| sink.lock().unwrap().push(line.to_string());
        helper.write_line("SELECT 1");
        assert_eq!(lines.lock().unwrap().as_slice(), ["SELECT 1"]);
    }
}
