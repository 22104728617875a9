use crate::core::form::InputForm;
use crate::core::session::{CloseReason, LineOutcome, LogStreamSession, SessionState};
use crate::core::state::ViewState;
use crate::domain::model::{BuildRequest, Theme};
use crate::domain::ports::{BuildTrigger, LogSource};
use crate::utils::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

#[derive(Debug)]
enum SessionEvent {
    Line(String),
    Failed(String),
    Ended,
    TriggerFailed(String),
}

/// Events are tagged with the build they belong to so that anything still
/// queued from an abandoned build is dropped.
#[derive(Debug)]
struct Envelope {
    generation: u64,
    event: SessionEvent,
}

/// What changed in the view after one event was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUpdate {
    pub appended: Option<String>,
    pub closed: Option<CloseReason>,
}

impl SessionUpdate {
    fn appended(line: String) -> Self {
        Self {
            appended: Some(line),
            closed: None,
        }
    }

    fn closed(reason: CloseReason, appended: Option<String>) -> Self {
        Self {
            appended,
            closed: Some(reason),
        }
    }
}

/// Drives one build at a time: validates the form, fires the trigger, pumps
/// the log stream on a background task and applies its events to the
/// [`ViewState`] from a single queue.
pub struct BuildRunner {
    trigger: Arc<dyn BuildTrigger>,
    source: Arc<dyn LogSource>,
    state: ViewState,
    events_tx: UnboundedSender<Envelope>,
    events_rx: UnboundedReceiver<Envelope>,
    generation: u64,
    stream_task: Option<JoinHandle<()>>,
    trigger_task: Option<JoinHandle<()>>,
}

impl BuildRunner {
    pub fn new(trigger: Arc<dyn BuildTrigger>, source: Arc<dyn LogSource>, theme: Theme) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            trigger,
            source,
            state: ViewState::new(theme),
            events_tx,
            events_rx,
            generation: 0,
            stream_task: None,
            trigger_task: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.state.toggle_theme()
    }

    /// Validates the form and starts a build. A rejected form changes nothing
    /// and issues no request. Must be called from within a Tokio runtime.
    pub fn submit(&mut self, form: &InputForm) -> Result<()> {
        let request = form.submit()?;
        self.start(request);
        Ok(())
    }

    fn start(&mut self, request: BuildRequest) {
        let mode = request.mode;
        self.cancel();
        self.generation += 1;

        let mut session = LogStreamSession::new(mode);
        session.connect();
        let cancelled = session.cancel_flag();
        self.state.replace_session(session);

        tracing::info!(
            "🚀 Starting build #{} for {} ({:?} mode)",
            self.generation,
            request.repository_url,
            mode
        );

        self.stream_task = Some(tokio::spawn(pump_stream(
            Arc::clone(&self.source),
            request.clone(),
            self.generation,
            cancelled,
            self.events_tx.clone(),
        )));

        if mode.has_separate_trigger() {
            // 觸發請求不取消；舊的 handle 直接丟棄即可
            self.trigger_task = Some(tokio::spawn(fire_trigger(
                Arc::clone(&self.trigger),
                request,
                self.generation,
                self.events_tx.clone(),
            )));
        }
    }

    /// Closes the running stream, if any. Returns whether one was open.
    /// A trigger request still in flight keeps running detached.
    pub fn cancel(&mut self) -> bool {
        self.abort_stream();
        self.trigger_task = None;
        let closed = self.state.session_mut().cancel();
        if closed {
            tracing::info!("🛑 Closed log stream of build #{}", self.generation);
        }
        closed
    }

    /// Waits for the next event that changes the view. Returns `None` once
    /// the session is no longer in progress.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        while self.state.in_progress() {
            let envelope = self.events_rx.recv().await?;
            if let Some(update) = self.apply(envelope) {
                return Some(update);
            }
        }
        None
    }

    pub async fn run_until_closed<F>(&mut self, mut on_update: F) -> SessionState
    where
        F: FnMut(&SessionUpdate),
    {
        while let Some(update) = self.next_update().await {
            on_update(&update);
        }
        self.state.session().state()
    }

    /// Waits for the trigger request of the latest build to be delivered (or
    /// fail) and applies whatever it reported. Returns at once after
    /// [`cancel`](Self::cancel), since the trigger is no longer tracked.
    pub async fn wait_for_trigger(&mut self) -> Vec<SessionUpdate> {
        if let Some(task) = self.trigger_task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Build trigger task ended abnormally: {}", e);
            }
        }

        let mut updates = Vec::new();
        while let Ok(envelope) = self.events_rx.try_recv() {
            updates.extend(self.apply(envelope));
        }
        updates
    }

    fn apply(&mut self, envelope: Envelope) -> Option<SessionUpdate> {
        if envelope.generation != self.generation {
            tracing::debug!(
                "Dropping event from abandoned build #{}",
                envelope.generation
            );
            return None;
        }

        let update = match envelope.event {
            SessionEvent::Line(line) => {
                match self.state.session_mut().on_line(line.clone()) {
                    LineOutcome::Ignored => None,
                    LineOutcome::Appended => Some(SessionUpdate::appended(line)),
                    LineOutcome::Completed => {
                        tracing::info!("✅ Build #{} reported completion", self.generation);
                        Some(SessionUpdate::closed(CloseReason::Completed, Some(line)))
                    }
                }
            }
            SessionEvent::Failed(message) => {
                let session = self.state.session_mut();
                if !session.is_open() {
                    return None;
                }
                tracing::error!("❌ Log stream error: {}", message);
                let visible = session.on_error(&message);
                Some(SessionUpdate::closed(CloseReason::Errored, visible))
            }
            SessionEvent::Ended => {
                let reason = self.state.session_mut().on_end()?;
                if reason == CloseReason::Errored {
                    tracing::error!("❌ Log stream closed by the server before the build completed");
                } else {
                    tracing::info!("✅ Log stream of build #{} finished", self.generation);
                }
                Some(SessionUpdate::closed(reason, None))
            }
            SessionEvent::TriggerFailed(_) => {
                if !self.state.session_mut().on_trigger_failure() {
                    return None;
                }
                Some(SessionUpdate::closed(CloseReason::Errored, None))
            }
        };

        if !self.state.in_progress() {
            self.abort_stream();
        }
        update
    }

    fn abort_stream(&mut self) {
        if let Some(task) = self.stream_task.take() {
            task.abort();
        }
    }
}

impl Drop for BuildRunner {
    fn drop(&mut self) {
        self.abort_stream();
    }
}

async fn pump_stream(
    source: Arc<dyn LogSource>,
    request: BuildRequest,
    generation: u64,
    cancelled: Arc<AtomicBool>,
    events: UnboundedSender<Envelope>,
) {
    let send = |event: SessionEvent| events.send(Envelope { generation, event }).is_ok();

    let mut stream = match source.open(&request).await {
        Ok(stream) => stream,
        Err(e) => {
            send(SessionEvent::Failed(e.to_string()));
            return;
        }
    };
    tracing::debug!("Log stream of build #{} connected", generation);

    loop {
        if cancelled.load(Ordering::Acquire) {
            tracing::debug!("Log stream of build #{} cancelled", generation);
            return;
        }

        let event = match stream.next_line().await {
            Some(Ok(line)) => SessionEvent::Line(line),
            Some(Err(e)) => SessionEvent::Failed(e.to_string()),
            None => SessionEvent::Ended,
        };
        let last = !matches!(event, SessionEvent::Line(_));

        if !send(event) || last {
            return;
        }
    }
}

async fn fire_trigger(
    trigger: Arc<dyn BuildTrigger>,
    request: BuildRequest,
    generation: u64,
    events: UnboundedSender<Envelope>,
) {
    match trigger.trigger(&request).await {
        Ok(()) => tracing::debug!("Build #{} trigger delivered", generation),
        Err(e) => {
            tracing::error!("❌ Build request failed: {}", e);
            let _ = events.send(Envelope {
                generation,
                event: SessionEvent::TriggerFailed(e.to_string()),
            });
        }
    }
}
