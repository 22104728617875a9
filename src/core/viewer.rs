use crate::core::state::ViewState;
use crate::domain::model::{LogBuffer, Rgb, Theme, EXPORT_FILENAME};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, RunnerError};

pub const TITLE: &str = "⚙️ Git Build Runner";
pub const PROGRESS_INDICATOR: &str = "⏳ Running build...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Log,
    Indicator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub text: String,
    pub kind: LineKind,
}

impl RenderedLine {
    pub fn log(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Log,
        }
    }
}

/// Rows occupied on the terminal by the last drawn frame.
#[derive(Debug, Default)]
pub struct Frame {
    rows: usize,
}

impl Frame {
    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// Fixed-height log region that follows the tail of the buffer.
#[derive(Debug, Clone)]
pub struct LogViewer {
    height: usize,
    color: bool,
}

impl LogViewer {
    pub fn new(height: usize, color: bool) -> Self {
        Self {
            height: height.max(1),
            color,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn render(&self, state: &ViewState) -> Vec<RenderedLine> {
        let lines = state.buffer().lines();
        let start = lines.len().saturating_sub(self.height);

        let mut rendered: Vec<RenderedLine> = lines[start..]
            .iter()
            .map(|line| RenderedLine::log(line.as_str()))
            .collect();

        // 指示行只在畫面上，不進入 buffer
        if state.in_progress() {
            rendered.push(RenderedLine {
                text: PROGRESS_INDICATOR.to_string(),
                kind: LineKind::Indicator,
            });
        }
        rendered
    }

    pub fn paint(&self, line: &RenderedLine, theme: Theme) -> String {
        let palette = theme.palette();
        let color = match line.kind {
            LineKind::Log => palette.log_foreground,
            LineKind::Indicator => palette.indicator,
        };
        self.colorize(&line.text, color)
    }

    /// Repaints the log region in place: moves the cursor back over the rows
    /// of the previous frame, clears them and draws the current render.
    pub fn redraw(&self, state: &ViewState, frame: &mut Frame) -> String {
        let mut out = String::new();
        if frame.rows > 0 {
            out.push_str(&format!("\x1b[{}A\x1b[0J", frame.rows));
        }

        let rendered = self.render(state);
        for line in &rendered {
            out.push_str(&self.paint(line, state.theme()));
            out.push('\n');
        }
        frame.rows = rendered.len();
        out
    }

    pub fn header(&self, theme: Theme) -> String {
        self.colorize(TITLE, theme.palette().foreground)
    }

    fn colorize(&self, text: &str, Rgb(r, g, b): Rgb) -> String {
        if self.color {
            format!("\x1b[38;2;{};{};{}m{}\x1b[0m", r, g, b, text)
        } else {
            text.to_string()
        }
    }
}

/// Writes the log as `build-log.txt`. Export is disabled while the buffer is
/// empty.
pub async fn export_log<S: Storage>(storage: &S, buffer: &LogBuffer) -> Result<String> {
    if buffer.is_empty() {
        return Err(RunnerError::ExportUnavailable);
    }

    let content = buffer.export();
    tracing::debug!("Exporting {} log lines ({} bytes)", buffer.len(), content.len());
    let path = storage.write_file(EXPORT_FILENAME, content.as_bytes()).await?;
    tracing::info!("📥 Build log saved to {}", path);
    Ok(path)
}
