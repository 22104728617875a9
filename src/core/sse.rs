//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes are fed as they arrive from the connection; every dispatched
//! `message` event is returned as one line of build output. Named events
//! other than `message` are skipped, the same way a browser `onmessage`
//! handler never sees them.

#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Vec<String>,
    event_type: Option<String>,
    after_cr: bool,
    started: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 回傳這個 chunk 內完成的所有事件資料
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut messages = Vec::new();

        for &byte in chunk {
            if self.after_cr {
                self.after_cr = false;
                if byte == b'\n' {
                    continue;
                }
            }

            match byte {
                b'\n' => self.end_line(&mut messages),
                b'\r' => {
                    self.after_cr = true;
                    self.end_line(&mut messages);
                }
                _ => self.pending.push(byte),
            }
        }

        messages
    }

    fn end_line(&mut self, messages: &mut Vec<String>) {
        let raw = std::mem::take(&mut self.pending);
        let decoded = String::from_utf8_lossy(&raw);
        let mut line: &str = &decoded;

        if !self.started {
            self.started = true;
            line = line.strip_prefix('\u{feff}').unwrap_or(line);
        }

        if line.is_empty() {
            self.dispatch(messages);
            return;
        }

        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event_type = Some(value.to_string()),
            "id" | "retry" => {}
            other => tracing::trace!("Ignoring unknown SSE field '{}'", other),
        }
    }

    fn dispatch(&mut self, messages: &mut Vec<String>) {
        let event_type = self.event_type.take();
        if self.data.is_empty() {
            return;
        }

        let data = std::mem::take(&mut self.data).join("\n");
        match event_type.as_deref() {
            None | Some("") | Some("message") => messages.push(data),
            Some(other) => tracing::debug!("Skipping SSE event of type '{}'", other),
        }
    }
}
