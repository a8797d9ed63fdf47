//! Output sinks and the tee multiplexer
//!
//! Every line the batch produces flows through a [`LogSink`] passed explicitly
//! to the processing code; there is no global stream redirection. A
//! [`TeeSink`] wraps two sinks and forwards every call to both, so the driver
//! composes console + aggregator + per-page log as two nested tees. When the
//! per-page tee goes out of scope the underlying console/aggregator sinks are
//! untouched, which is what guarantees a failing page can never leave later
//! output pointing at a closed log file.
//!
//! # Features
//!
//! - **Console** ([`ConsoleSink`]) - standard output
//! - **File** ([`FileSink`]) - buffered file writer, optional flush-per-line
//! - **Tee** ([`TeeSink`]) - broadcasts to two sinks in fixed order
//! - **Memory** ([`MemorySink`]) - capture buffer for assertions
//! - **Null** ([`NullSink`]) - discards everything
//!
//! # Example
//!
//! ```rust
//! use journal_scan::sink::{LogSink, MemorySink, TeeSink};
//!
//! let mut a = MemorySink::new();
//! let mut b = MemorySink::new();
//! {
//!     let mut tee = TeeSink::new(&mut a, &mut b);
//!     tee.write_line("hello").unwrap();
//! }
//! assert_eq!(a.contents(), "hello\n");
//! assert_eq!(b.contents(), "hello\n");
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================
// Error Types
// ============================================================

/// Sink error types
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SinkError>;

// ============================================================
// Sink Trait
// ============================================================

/// A destination for batch output lines
///
/// `write` appends text without a terminator, `write_line` appends text plus
/// a newline. Implementations must deliver calls in the order received.
pub trait LogSink {
    /// Write text without a line terminator
    fn write(&mut self, text: &str) -> Result<()>;

    /// Write text followed by a newline
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Flush any buffered output
    fn flush(&mut self) -> Result<()>;
}

// ============================================================
// Console
// ============================================================

/// Sink writing to standard output
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for ConsoleSink {
    fn write(&mut self, text: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        std::io::stdout().lock().flush()?;
        Ok(())
    }
}

// ============================================================
// File
// ============================================================

/// Buffered file sink
///
/// `create` truncates an existing file. With `auto_flush` enabled every
/// `write_line` reaches the OS immediately, which the aggregator uses so a
/// crashed run still leaves a readable log. The buffer is flushed on drop
/// either way.
#[derive(Debug)]
pub struct FileSink {
    writer: BufWriter<File>,
    path: PathBuf,
    auto_flush: bool,
}

impl FileSink {
    /// Create (truncating) a file sink at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| SinkError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            auto_flush: false,
        })
    }

    /// Flush after every written line
    #[must_use]
    pub fn auto_flush(mut self, enabled: bool) -> Self {
        self.auto_flush = enabled;
        self
    }

    /// Path this sink writes to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileSink {
    fn write(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        if self.auto_flush {
            self.writer.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

// ============================================================
// Tee
// ============================================================

/// Broadcasts every call to two underlying sinks, first then second
///
/// Compose two tees to fan out to three destinations. An error from the first
/// sink short-circuits the call; delivery order within each sink always
/// matches call order.
pub struct TeeSink<'a> {
    first: &'a mut dyn LogSink,
    second: &'a mut dyn LogSink,
}

impl<'a> TeeSink<'a> {
    pub fn new(first: &'a mut dyn LogSink, second: &'a mut dyn LogSink) -> Self {
        Self { first, second }
    }
}

impl LogSink for TeeSink<'_> {
    fn write(&mut self, text: &str) -> Result<()> {
        self.first.write(text)?;
        self.second.write(text)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.first.write_line(line)?;
        self.second.write_line(line)
    }

    fn flush(&mut self) -> Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

// ============================================================
// Memory / Null
// ============================================================

/// In-memory sink for capturing output in tests and embedders
#[derive(Debug, Default)]
pub struct MemorySink {
    buffer: String,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Captured output split into lines
    pub fn lines(&self) -> Vec<&str> {
        self.buffer.lines().collect()
    }
}

impl LogSink for MemorySink {
    fn write(&mut self, text: &str) -> Result<()> {
        self.buffer.push_str(text);
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.buffer.push_str(line);
        self.buffer.push('\n');
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Sink that discards everything
#[derive(Debug, Default)]
pub struct NullSink;

impl NullSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for NullSink {
    fn write(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn write_line(&mut self, _line: &str) -> Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_sink_write_vs_write_line() {
        let mut sink = MemorySink::new();
        sink.write("a").unwrap();
        sink.write("b").unwrap();
        sink.write_line("c").unwrap();
        assert_eq!(sink.contents(), "abc\n");
    }

    #[test]
    fn test_tee_broadcasts_to_both() {
        let mut a = MemorySink::new();
        let mut b = MemorySink::new();
        {
            let mut tee = TeeSink::new(&mut a, &mut b);
            tee.write_line("one").unwrap();
            tee.write("two").unwrap();
            tee.flush().unwrap();
        }
        assert_eq!(a.contents(), "one\ntwo");
        assert_eq!(b.contents(), "one\ntwo");
    }

    #[test]
    fn test_three_way_composition_delivers_exactly_once() {
        let mut console = MemorySink::new();
        let mut aggregator = MemorySink::new();
        let mut page_log = MemorySink::new();
        {
            let mut base = TeeSink::new(&mut console, &mut aggregator);
            let mut tee = TeeSink::new(&mut base, &mut page_log);
            tee.write_line("first").unwrap();
            tee.write_line("second").unwrap();
        }
        for sink in [&console, &aggregator, &page_log] {
            assert_eq!(sink.lines(), vec!["first", "second"]);
        }
    }

    #[test]
    fn test_dropping_page_tee_leaves_base_sinks_usable() {
        let mut console = MemorySink::new();
        let mut page_log = MemorySink::new();
        {
            let mut tee = TeeSink::new(&mut console, &mut page_log);
            tee.write_line("during page").unwrap();
        }
        console.write_line("after page").unwrap();
        assert_eq!(console.lines(), vec!["during page", "after page"]);
        assert_eq!(page_log.lines(), vec!["during page"]);
    }

    #[test]
    fn test_file_sink_creates_and_truncates() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("log.out");
        std::fs::write(&path, "stale contents").unwrap();

        let mut sink = FileSink::create(&path).unwrap();
        sink.write_line("fresh").unwrap();
        sink.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn test_file_sink_buffers_until_flush() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("buffered.out");

        let mut sink = FileSink::create(&path).unwrap();
        sink.write_line("line").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

        sink.flush().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "line\n");
    }

    #[test]
    fn test_file_sink_auto_flush_reaches_disk_per_line() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("agg.txt");

        let mut sink = FileSink::create(&path).unwrap().auto_flush(true);
        sink.write_line("immediate").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "immediate\n");
    }

    #[test]
    fn test_file_sink_open_error_carries_path() {
        let result = FileSink::create("/nonexistent-dir/deep/log.out");
        match result {
            Err(SinkError::Open { path, .. }) => {
                assert!(path.to_string_lossy().contains("log.out"));
            }
            other => panic!("expected Open error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_null_sink_accepts_everything() {
        let mut sink = NullSink::new();
        sink.write("x").unwrap();
        sink.write_line("y").unwrap();
        sink.flush().unwrap();
    }

    #[test]
    fn test_error_display() {
        let err = SinkError::Io(std::io::Error::other("boom"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SinkError>();
        assert_send_sync::<MemorySink>();
        assert_send_sync::<NullSink>();
    }
}
