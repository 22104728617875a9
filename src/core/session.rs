use crate::domain::model::{FormMode, LogBuffer, COMPLETION_MARKER};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Completed,
    Errored,
    /// Abandoned by the client because a newer build was submitted.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Streaming,
    Closed(CloseReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Appended,
    /// The line was appended and carried the completion marker.
    Completed,
    Ignored,
}

/// One server-push connection and the log it produced.
///
/// The cancel flag is shared with the task reading the connection; it is set
/// on every close and checked before each append.
#[derive(Debug)]
pub struct LogStreamSession {
    mode: FormMode,
    state: SessionState,
    buffer: LogBuffer,
    cancelled: Arc<AtomicBool>,
}

impl LogStreamSession {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            state: SessionState::Idle,
            buffer: LogBuffer::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Connecting | SessionState::Streaming)
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn connect(&mut self) {
        self.buffer.clear();
        self.cancelled.store(false, Ordering::Release);
        self.state = SessionState::Connecting;
    }

    pub fn on_line(&mut self, line: String) -> LineOutcome {
        if !self.is_open() || self.cancelled.load(Ordering::Acquire) {
            return LineOutcome::Ignored;
        }

        self.state = SessionState::Streaming;
        // 子字串比對：任何包含標記的行都會結束串流
        let completes = self.mode.uses_completion_marker() && line.contains(COMPLETION_MARKER);
        self.buffer.push(line);

        if completes {
            self.close(CloseReason::Completed);
            LineOutcome::Completed
        } else {
            LineOutcome::Appended
        }
    }

    /// Transport failure. Returns the line made visible in the log, if the
    /// mode shows errors there.
    pub fn on_error(&mut self, message: &str) -> Option<String> {
        if !self.is_open() {
            return None;
        }

        let visible = if self.mode.shows_errors_in_log() {
            let line = format!("Error: {}", message);
            self.buffer.push(line.clone());
            Some(line)
        } else {
            None
        };
        self.close(CloseReason::Errored);
        visible
    }

    /// The server ended the response body.
    pub fn on_end(&mut self) -> Option<CloseReason> {
        if !self.is_open() {
            return None;
        }

        let reason = if self.mode.uses_completion_marker() {
            CloseReason::Errored
        } else {
            CloseReason::Completed
        };
        self.close(reason);
        Some(reason)
    }

    pub fn on_trigger_failure(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.close(CloseReason::Errored);
        true
    }

    pub fn cancel(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.close(CloseReason::Cancelled);
        true
    }

    fn close(&mut self, reason: CloseReason) {
        self.cancelled.store(true, Ordering::Release);
        self.state = SessionState::Closed(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected(mode: FormMode) -> LogStreamSession {
        let mut session = LogStreamSession::new(mode);
        session.connect();
        session
    }

    #[test]
    fn test_lines_without_marker_keep_session_open() {
        let mut session = connected(FormMode::Strict);
        assert_eq!(session.state(), SessionState::Connecting);

        for i in 0..5 {
            assert_eq!(session.on_line(format!("step {i}")), LineOutcome::Appended);
        }

        assert_eq!(session.state(), SessionState::Streaming);
        assert_eq!(session.buffer().lines(), ["step 0", "step 1", "step 2", "step 3", "step 4"]);
        assert!(session.is_open());
    }

    #[test]
    fn test_marker_anywhere_in_line_completes() {
        let mut session = connected(FormMode::Strict);
        session.on_line("Cloning".to_string());

        let outcome = session.on_line("Step 9/9: Build complete! (12s)".to_string());
        assert_eq!(outcome, LineOutcome::Completed);
        assert_eq!(session.state(), SessionState::Closed(CloseReason::Completed));
        assert!(session.cancel_flag().load(Ordering::Acquire));

        assert_eq!(session.on_line("after close".to_string()), LineOutcome::Ignored);
        assert_eq!(session.buffer().len(), 2);
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        let mut session = connected(FormMode::Strict);
        assert_eq!(session.on_line("build complete!".to_string()), LineOutcome::Appended);
        assert!(session.is_open());
    }

    #[test]
    fn test_multi_field_ignores_marker() {
        let mut session = connected(FormMode::MultiField);
        assert_eq!(session.on_line("Build complete!".to_string()), LineOutcome::Appended);
        assert!(session.is_open());
        assert_eq!(session.on_end(), Some(CloseReason::Completed));
    }

    #[test]
    fn test_error_before_any_line_leaves_buffer_empty() {
        let mut session = connected(FormMode::Strict);
        assert_eq!(session.on_error("connection refused"), None);
        assert_eq!(session.state(), SessionState::Closed(CloseReason::Errored));
        assert!(session.buffer().is_empty());
    }

    #[test]
    fn test_multi_field_error_is_visible() {
        let mut session = connected(FormMode::MultiField);
        session.on_line("Resolving dependencies".to_string());
        let visible = session.on_error("connection reset");
        assert_eq!(visible.as_deref(), Some("Error: connection reset"));
        assert_eq!(session.buffer().lines().last().map(String::as_str), Some("Error: connection reset"));
    }

    #[test]
    fn test_strict_end_without_marker_is_an_error() {
        let mut session = connected(FormMode::Strict);
        session.on_line("Step 1/9".to_string());
        assert_eq!(session.on_end(), Some(CloseReason::Errored));
        assert_eq!(session.on_end(), None);
    }

    #[test]
    fn test_cancel_only_closes_open_sessions() {
        let mut session = LogStreamSession::new(FormMode::Strict);
        assert!(!session.cancel());

        session.connect();
        assert!(session.cancel());
        assert_eq!(session.state(), SessionState::Closed(CloseReason::Cancelled));
        assert_eq!(session.on_line("late".to_string()), LineOutcome::Ignored);
        assert!(!session.on_trigger_failure());
    }
}
