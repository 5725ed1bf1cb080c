//! Stream processing: decode, correlate, filter, render.
//!
//! Three modes share the per-record filter and render steps but walk the
//! input differently:
//!
//! - **Streaming** (piped stdin): one pass, each line handled as it arrives.
//!   A result whose invocation has not been seen yet renders unresolved.
//! - **Buffered** (static file): every record is decoded and correlated
//!   first, then rendered, so results can resolve invocations that appear
//!   later in the file.
//! - **Follow** (growing file): a discovery pass warms the correlation table,
//!   existing content is rendered buffered, then the file is polled for
//!   appended lines until cancelled.

use crate::correlation::ToolCorrelationTable;
use crate::filter::FilterEngine;
use crate::model::error::{AppError, InputError};
use crate::model::Record;
use crate::render::{Renderer, TimingCursor};
use crate::source::{FileTailer, Growth, LineReader};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default delay between follow-mode size checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Consecutive failed polls tolerated before follow mode gives up.
pub const MAX_CONSECUTIVE_POLL_FAILURES: u32 = 3;

// ===== CancelToken =====

/// Shared flag used to stop follow mode from outside the loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from a signal handler thread.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ===== StreamProcessor =====

/// Drives records from an input through filtering and rendering to `out`.
///
/// Owns the correlation table and timing cursor for one run.
#[derive(Debug)]
pub struct StreamProcessor<W: Write> {
    out: W,
    filter: FilterEngine,
    renderer: Renderer,
    table: ToolCorrelationTable,
    cursor: TimingCursor,
    max_line_bytes: usize,
}

impl<W: Write> StreamProcessor<W> {
    /// Create a processor writing to `out`.
    pub fn new(out: W, filter: FilterEngine, renderer: Renderer, max_line_bytes: usize) -> Self {
        Self {
            out,
            filter,
            renderer,
            table: ToolCorrelationTable::new(),
            cursor: TimingCursor::new(),
            max_line_bytes,
        }
    }

    /// Consume the processor, returning the output sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// One pass: each line is correlated, filtered and rendered immediately.
    pub fn run_streaming<R: BufRead>(&mut self, input: R) -> Result<(), AppError> {
        for line in LineReader::new(input, self.max_line_bytes) {
            if let Some(record) = Record::decode(&line?) {
                self.table.observe(&record);
                self.emit(&record)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Two passes: correlate every record, then filter and render in order.
    pub fn run_buffered<R: BufRead>(&mut self, input: R) -> Result<(), AppError> {
        let records = self.correlate_all(LineReader::new(input, self.max_line_bytes))?;
        debug!(records = records.len(), "rendering buffered records");
        for record in &records {
            self.emit(record)?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Follow mode up to the live tail: discovery pass, then buffered render
    /// of the existing content.
    ///
    /// An unterminated final line is rendered with the history when it
    /// already decodes as a record; otherwise it waits for a later tick.
    /// Returns the tailer positioned after the rendered content.
    pub fn follow_history(&mut self, path: &Path) -> Result<FileTailer, AppError> {
        let file = File::open(path).map_err(|source| open_error(path, source))?;
        let mut discovered = 0usize;
        for line in LineReader::new(BufReader::new(file), self.max_line_bytes) {
            if let Some(record) = Record::decode(&line?) {
                self.table.observe(&record);
                discovered += 1;
            }
        }
        debug!(records = discovered, tools = self.table.len(), "discovery pass complete");

        let mut tailer = FileTailer::new(path, self.max_line_bytes)?;
        let lines = tailer.read_new_lines()?;
        let mut records = self.correlate_all(lines.into_iter().map(Ok))?;
        if let Some(partial) = tailer.pending_partial_line()? {
            if let Some(record) = Record::decode(&partial) {
                debug!(bytes = partial.len(), "rendering unterminated final record");
                self.table.observe(&record);
                records.push(record);
                tailer.reset_to(tailer.position() + partial.len() as u64);
            }
        }
        for record in &records {
            self.emit(record)?;
        }
        self.out.flush()?;

        info!(offset = tailer.position(), "history rendered, following");
        Ok(tailer)
    }

    /// One poll of the live tail.
    ///
    /// Renders complete lines appended since the last call and returns how
    /// many lines were consumed. A file that shrank is resumed from its new
    /// end.
    pub fn follow_tick(&mut self, tailer: &mut FileTailer) -> Result<usize, AppError> {
        match tailer.check_growth().map_err(InputError::Io)? {
            Growth::Unchanged => Ok(0),
            Growth::Truncated { len } => {
                warn!(
                    path = %tailer.path().display(),
                    previous = tailer.position(),
                    len,
                    "file shrank, resuming from new end"
                );
                tailer.reset_to(len);
                Ok(0)
            }
            Growth::Grew => {
                let lines = tailer.read_new_lines()?;
                for line in &lines {
                    if let Some(record) = Record::decode(line) {
                        self.table.observe(&record);
                        self.emit(&record)?;
                    }
                }
                self.out.flush()?;
                Ok(lines.len())
            }
        }
    }

    /// Full follow mode. Returns when `cancel` is triggered.
    ///
    /// I/O failures while polling are retried on later ticks; after
    /// [`MAX_CONSECUTIVE_POLL_FAILURES`] in a row the error is returned.
    pub fn run_follow(
        &mut self,
        path: &Path,
        cancel: &CancelToken,
        poll_interval: Duration,
    ) -> Result<(), AppError> {
        let mut tailer = self.follow_history(path)?;
        let mut failures = PollFailures::default();

        while !cancel.is_cancelled() {
            std::thread::sleep(poll_interval);
            if cancel.is_cancelled() {
                break;
            }

            let consumed = failures.settle(self.follow_tick(&mut tailer))?;
            if consumed > 0 {
                debug!(lines = consumed, offset = tailer.position(), "tail advanced");
            }
        }

        info!("follow cancelled");
        self.out.flush()?;
        Ok(())
    }

    /// Decode and correlate every line, keeping the records in order.
    fn correlate_all<I>(&mut self, lines: I) -> Result<Vec<Record>, AppError>
    where
        I: IntoIterator<Item = Result<Vec<u8>, InputError>>,
    {
        let mut records = Vec::new();
        for line in lines {
            if let Some(record) = Record::decode(&line?) {
                self.table.observe(&record);
                records.push(record);
            }
        }
        Ok(records)
    }

    fn emit(&mut self, record: &Record) -> Result<(), AppError> {
        if self.filter.accepts(record, &self.table) {
            self.renderer
                .render(&mut self.out, record, &self.table, &mut self.cursor)?;
        }
        Ok(())
    }
}

/// Consecutive follow-mode poll failures.
#[derive(Debug, Default)]
struct PollFailures(u32);

impl PollFailures {
    /// Fold one tick's outcome into the count.
    ///
    /// I/O errors yield `Ok(0)` until [`MAX_CONSECUTIVE_POLL_FAILURES`] occur
    /// in a row; any success resets the count. Other errors pass through.
    fn settle(&mut self, outcome: Result<usize, AppError>) -> Result<usize, AppError> {
        match outcome {
            Ok(consumed) => {
                self.0 = 0;
                Ok(consumed)
            }
            Err(AppError::Input(InputError::Io(e))) => {
                self.0 += 1;
                if self.0 >= MAX_CONSECUTIVE_POLL_FAILURES {
                    return Err(InputError::Io(e).into());
                }
                warn!(error = %e, attempt = self.0, "poll failed, retrying");
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }
}

fn open_error(path: &Path, source: std::io::Error) -> AppError {
    if source.kind() == std::io::ErrorKind::NotFound {
        InputError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into()
    } else {
        InputError::Io(source).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterConfig;
    use crate::model::PricingConfig;
    use crate::render::{DisplayMode, MessageStyles, RenderOptions};
    use crate::source::DEFAULT_MAX_LINE_BYTES;
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;

    const BASH_USE: &str = r#"{"type":"assistant","message":{"content":[{"type":"tool_use","id":"t1","name":"Bash","input":{"command":"ls"}}]}}"#;
    const BASH_RESULT: &str = r#"{"type":"user","message":{"content":[{"type":"tool_result","tool_use_id":"t1","content":"file.txt"}]}}"#;

    fn processor(mode: DisplayMode, filter: FilterConfig) -> StreamProcessor<Vec<u8>> {
        let renderer = Renderer::new(
            RenderOptions {
                mode,
                ..RenderOptions::default()
            },
            MessageStyles::plain(),
            PricingConfig::default(),
        );
        StreamProcessor::new(
            Vec::new(),
            FilterEngine::new(filter),
            renderer,
            DEFAULT_MAX_LINE_BYTES,
        )
    }

    fn output(p: StreamProcessor<Vec<u8>>) -> String {
        String::from_utf8(p.into_inner()).unwrap()
    }

    fn input(lines: &[&str]) -> Cursor<Vec<u8>> {
        let mut text = lines.join("\n");
        text.push('\n');
        Cursor::new(text.into_bytes())
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ccl_proc_{}_{}", std::process::id(), name))
    }

    #[test]
    fn end_to_end_tool_filter_resolves_result() {
        let mut p = processor(DisplayMode::Full, FilterConfig::from_lists("", "Bash", ""));
        p.run_buffered(input(&[BASH_USE, BASH_RESULT])).unwrap();
        let out = output(p);
        assert!(out.contains("[Tool Use] Bash (ID: t1)"));
        assert!(out.contains("TOOL (Bash)\n  file.txt\n"));
    }

    #[test]
    fn buffered_mode_resolves_forward_references() {
        let mut p = processor(DisplayMode::Full, FilterConfig::from_lists("", "Bash", ""));
        p.run_buffered(input(&[BASH_RESULT, BASH_USE])).unwrap();
        let out = output(p);
        assert!(out.starts_with("[00:00:00] TOOL (Bash)\n"), "got {out}");
    }

    #[test]
    fn streaming_mode_cannot_resolve_forward_references() {
        let mut p = processor(DisplayMode::Full, FilterConfig::default());
        p.run_streaming(input(&[BASH_RESULT, BASH_USE])).unwrap();
        let out = output(p);
        assert!(out.starts_with("[00:00:00] TOOL\n"), "got {out}");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let mut p = processor(DisplayMode::Compact, FilterConfig::default());
        p.run_streaming(input(&[
            "not json",
            r#"{"type":"user","message":{"content":"ok"}}"#,
            "{\"type\":",
            "[1,2]",
        ]))
        .unwrap();
        assert_eq!(output(p), "[00:00:00] USER      - ok\n");
    }

    #[test]
    fn overlong_line_aborts_the_run() {
        let renderer = Renderer::new(RenderOptions::default(), MessageStyles::plain(), PricingConfig::default());
        let mut p = StreamProcessor::new(Vec::new(), FilterEngine::default(), renderer, 16);
        let result = p.run_streaming(input(&[r#"{"type":"user","message":{"content":"way too long"}}"#]));
        assert!(matches!(
            result,
            Err(AppError::Input(InputError::LineTooLong { line: 1, limit: 16 }))
        ));
    }

    #[test]
    fn filtered_records_do_not_move_timing_cursor() {
        let renderer = Renderer::new(
            RenderOptions {
                mode: DisplayMode::Compact,
                show_timing: true,
                ..RenderOptions::default()
            },
            MessageStyles::plain(),
            PricingConfig::default(),
        );
        let mut p = StreamProcessor::new(
            Vec::new(),
            FilterEngine::new(FilterConfig::from_lists("user", "", "")),
            renderer,
            DEFAULT_MAX_LINE_BYTES,
        );
        p.run_buffered(input(&[
            r#"{"type":"user","timestamp":"2025-06-22T10:00:00Z","message":{"content":"a"}}"#,
            r#"{"type":"assistant","timestamp":"2025-06-22T10:00:05Z","message":{"content":"skip"}}"#,
            r#"{"type":"user","timestamp":"2025-06-22T10:00:07Z","message":{"content":"b"}}"#,
        ]))
        .unwrap();
        let out = output(p);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains(" +7.0s]"), "got {}", lines[1]);
    }

    #[test]
    fn json_mode_round_trips_records() {
        let lines = [BASH_USE, r#"{"type":"summary","summary":"x","extra":{"deep":[1,2]}}"#];
        let mut p = processor(DisplayMode::Json, FilterConfig::default());
        p.run_buffered(input(&lines)).unwrap();
        let out = output(p);
        let emitted: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        let original: Vec<serde_json::Value> = lines
            .iter()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(emitted, original);
    }

    #[test]
    fn follow_history_matches_buffered_output() {
        let path = temp_path("equivalence.jsonl");
        let content = [
            BASH_RESULT,
            BASH_USE,
            r#"{"type":"user","message":{"content":"hi"}}"#,
        ]
        .join("\n")
            + "\n";
        fs::write(&path, &content).unwrap();

        let mut buffered = processor(DisplayMode::Full, FilterConfig::default());
        buffered.run_buffered(Cursor::new(content.into_bytes())).unwrap();

        let mut follow = processor(DisplayMode::Full, FilterConfig::default());
        let tailer = follow.follow_history(&path).unwrap();
        let len = fs::metadata(&path).unwrap().len();
        let _ = fs::remove_file(&path);

        assert_eq!(tailer.position(), len);
        assert_eq!(output(buffered), output(follow));
    }

    #[test]
    fn follow_history_renders_unterminated_final_record() {
        let path = temp_path("unterminated.jsonl");
        let content = [
            r#"{"type":"user","message":{"content":"a"}}"#,
            r#"{"type":"user","message":{"content":"b"}}"#,
        ]
        .join("\n");
        fs::write(&path, &content).unwrap();

        let mut buffered = processor(DisplayMode::Compact, FilterConfig::default());
        buffered.run_buffered(Cursor::new(content.clone().into_bytes())).unwrap();

        let mut follow = processor(DisplayMode::Compact, FilterConfig::default());
        let mut tailer = follow.follow_history(&path).unwrap();
        assert_eq!(tailer.position(), content.len() as u64);

        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file).unwrap();
        drop(file);
        follow.follow_tick(&mut tailer).unwrap();
        let _ = fs::remove_file(&path);

        let buffered = output(buffered);
        assert_eq!(buffered, "[00:00:00] USER      - a\n[00:00:00] USER      - b\n");
        assert_eq!(output(follow), buffered, "closing newline renders nothing new");
    }

    #[test]
    fn follow_history_leaves_incomplete_final_line_for_later() {
        let path = temp_path("incomplete.jsonl");
        fs::write(&path, "{\"type\":\"user\",\"message\":{\"content\":\"a\"}}\n{\"type\":\"us").unwrap();

        let mut p = processor(DisplayMode::Compact, FilterConfig::default());
        let mut tailer = p.follow_history(&path).unwrap();
        let history_end = tailer.position();

        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "er\",\"message\":{{\"content\":\"b\"}}}}").unwrap();
        drop(file);
        assert_eq!(p.follow_tick(&mut tailer).unwrap(), 1);
        let _ = fs::remove_file(&path);

        assert_eq!(history_end, 42);
        assert_eq!(
            output(p),
            "[00:00:00] USER      - a\n[00:00:00] USER      - b\n"
        );
    }

    #[test]
    fn follow_tick_renders_appended_lines() {
        let path = temp_path("tick.jsonl");
        fs::write(&path, format!("{}\n", BASH_USE)).unwrap();

        let mut p = processor(DisplayMode::Compact, FilterConfig::default());
        let mut tailer = p.follow_history(&path).unwrap();
        assert_eq!(p.follow_tick(&mut tailer).unwrap(), 0);

        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        write!(file, "{}\n{{\"type\":\"user\",\"message\"", BASH_RESULT).unwrap();
        drop(file);

        assert_eq!(p.follow_tick(&mut tailer).unwrap(), 1);
        let _ = fs::remove_file(&path);

        let out = output(p);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "[00:00:00] TOOL      - [OK]: file.txt");
    }

    #[test]
    fn follow_tick_recovers_from_truncation() {
        let path = temp_path("truncation.jsonl");
        fs::write(&path, format!("{}\n{}\n", BASH_USE, BASH_RESULT)).unwrap();

        let mut p = processor(DisplayMode::Compact, FilterConfig::default());
        let mut tailer = p.follow_history(&path).unwrap();

        fs::write(&path, "{}\n").unwrap();
        assert_eq!(p.follow_tick(&mut tailer).unwrap(), 0);
        assert_eq!(tailer.position(), 3);

        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, r#"{{"type":"user","message":{{"content":"after"}}}}"#).unwrap();
        drop(file);

        assert_eq!(p.follow_tick(&mut tailer).unwrap(), 1);
        let _ = fs::remove_file(&path);
        assert!(output(p).ends_with("USER      - after\n"));
    }

    #[test]
    fn run_follow_stops_when_cancelled() {
        let path = temp_path("cancel.jsonl");
        fs::write(&path, format!("{}\n", BASH_USE)).unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let mut p = processor(DisplayMode::Compact, FilterConfig::default());
        let result = p.run_follow(&path, &cancel, Duration::from_millis(1));
        let _ = fs::remove_file(&path);

        assert!(result.is_ok());
        assert!(output(p).contains("[Tool: Bash] ls"));
    }

    #[test]
    fn run_follow_picks_up_appends_until_cancelled() {
        let path = temp_path("live.jsonl");
        fs::write(&path, "").unwrap();

        let cancel = CancelToken::new();
        let writer_path = path.clone();
        let writer_cancel = cancel.clone();
        let writer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            let mut file = fs::OpenOptions::new().append(true).open(&writer_path).unwrap();
            writeln!(file, r#"{{"type":"user","message":{{"content":"live"}}}}"#).unwrap();
            drop(file);
            std::thread::sleep(Duration::from_millis(150));
            writer_cancel.cancel();
        });

        let mut p = processor(DisplayMode::Compact, FilterConfig::default());
        let result = p.run_follow(&path, &cancel, Duration::from_millis(5));
        writer.join().unwrap();
        let _ = fs::remove_file(&path);

        assert!(result.is_ok());
        assert_eq!(output(p), "[00:00:00] USER      - live\n");
    }

    #[test]
    fn follow_history_reports_missing_file() {
        let mut p = processor(DisplayMode::Full, FilterConfig::default());
        let result = p.follow_history(Path::new("/definitely/not/here.jsonl"));
        assert!(matches!(
            result,
            Err(AppError::Input(InputError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    fn io_failure() -> Result<usize, AppError> {
        Err(InputError::Io(std::io::Error::other("stat failed")).into())
    }

    #[test]
    fn poll_failures_below_the_limit_are_retried() {
        let mut failures = PollFailures::default();
        assert_eq!(failures.settle(io_failure()).unwrap(), 0);
        assert_eq!(failures.settle(io_failure()).unwrap(), 0);
        assert_eq!(failures.settle(Ok(2)).unwrap(), 2);

        // The success reset the count.
        assert_eq!(failures.settle(io_failure()).unwrap(), 0);
        assert_eq!(failures.settle(io_failure()).unwrap(), 0);
        assert_eq!(failures.settle(Ok(0)).unwrap(), 0);
    }

    #[test]
    fn third_consecutive_poll_failure_is_fatal() {
        let mut failures = PollFailures::default();
        assert!(failures.settle(io_failure()).is_ok());
        assert!(failures.settle(io_failure()).is_ok());
        let result = failures.settle(io_failure());
        assert!(matches!(result, Err(AppError::Input(InputError::Io(_)))));
    }

    #[test]
    fn non_io_poll_errors_are_fatal_immediately() {
        let mut failures = PollFailures::default();
        let result = failures.settle(Err(InputError::LineTooLong { line: 1, limit: 8 }.into()));
        assert!(matches!(
            result,
            Err(AppError::Input(InputError::LineTooLong { .. }))
        ));
    }
}
