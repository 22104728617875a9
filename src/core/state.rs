use crate::core::session::LogStreamSession;
use crate::domain::model::{FormMode, LogBuffer, Theme};

/// Everything the viewer needs to draw a frame.
#[derive(Debug)]
pub struct ViewState {
    session: LogStreamSession,
    theme: Theme,
}

impl ViewState {
    pub fn new(theme: Theme) -> Self {
        Self {
            session: LogStreamSession::new(FormMode::default()),
            theme,
        }
    }

    pub fn session(&self) -> &LogStreamSession {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut LogStreamSession {
        &mut self.session
    }

    /// Swaps in the session of a new build; the previous log goes with it.
    pub(crate) fn replace_session(&mut self, session: LogStreamSession) {
        self.session = session;
    }

    pub fn buffer(&self) -> &LogBuffer {
        self.session.buffer()
    }

    pub fn in_progress(&self) -> bool {
        self.session.is_open()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggle();
        self.theme
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::SessionState;

    #[test]
    fn test_new_state_is_idle() {
        let state = ViewState::default();
        assert_eq!(state.session().state(), SessionState::Idle);
        assert!(!state.in_progress());
        assert!(state.buffer().is_empty());
    }

    #[test]
    fn test_toggle_theme_does_not_touch_log() {
        let mut state = ViewState::new(Theme::Dark);
        let mut session = LogStreamSession::new(FormMode::Strict);
        session.connect();
        session.on_line("Step 1/3".to_string());
        state.replace_session(session);

        assert_eq!(state.toggle_theme(), Theme::Light);
        assert_eq!(state.toggle_theme(), Theme::Dark);
        assert_eq!(state.buffer().lines(), ["Step 1/3"]);
        assert!(state.in_progress());
    }
}
