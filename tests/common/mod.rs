#![allow(dead_code)]

use async_trait::async_trait;
use build_runner::core::{BuildRequest, BuildTrigger, LogSource, LogStream};
use build_runner::{Result, RunnerError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub type LineSender = UnboundedSender<Result<String>>;

pub struct ChannelStream {
    rx: UnboundedReceiver<Result<String>>,
}

#[async_trait]
impl LogStream for ChannelStream {
    async fn next_line(&mut self) -> Option<Result<String>> {
        self.rx.recv().await
    }
}

enum Scripted {
    Stream(UnboundedReceiver<Result<String>>),
    Refuse(String),
}

/// Log source whose connections are fed by the test through channels.
/// Dropping the sender ends the stream.
#[derive(Default)]
pub struct ScriptedSource {
    scripted: Mutex<VecDeque<Scripted>>,
    opened: Mutex<Vec<BuildRequest>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn expect_stream(&self) -> LineSender {
        let (tx, rx) = mpsc::unbounded_channel();
        self.scripted.lock().unwrap().push_back(Scripted::Stream(rx));
        tx
    }

    pub fn expect_refusal(&self, message: &str) {
        self.scripted
            .lock()
            .unwrap()
            .push_back(Scripted::Refuse(message.to_string()));
    }

    pub fn opened(&self) -> Vec<BuildRequest> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSource for ScriptedSource {
    async fn open(&self, request: &BuildRequest) -> Result<Box<dyn LogStream>> {
        self.opened.lock().unwrap().push(request.clone());
        let next = self.scripted.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Stream(rx)) => Ok(Box::new(ChannelStream { rx })),
            Some(Scripted::Refuse(message)) => Err(RunnerError::stream(message)),
            None => Err(RunnerError::stream("no stream scripted")),
        }
    }
}

#[derive(Default)]
pub struct RecordingTrigger {
    requests: Mutex<Vec<BuildRequest>>,
    failure: Option<String>,
}

impl RecordingTrigger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        })
    }

    pub fn requests(&self) -> Vec<BuildRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildTrigger for RecordingTrigger {
    async fn trigger(&self, request: &BuildRequest) -> Result<()> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.failure {
            Some(message) => Err(RunnerError::TriggerError {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Trigger whose request is delivered but never answered.
#[derive(Default)]
pub struct SilentTrigger {
    requests: Mutex<Vec<BuildRequest>>,
}

impl SilentTrigger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<BuildRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildTrigger for SilentTrigger {
    async fn trigger(&self, request: &BuildRequest) -> Result<()> {
        self.requests.lock().unwrap().push(request.clone());
        std::future::pending().await
    }
}
