use crate::core::sse::SseDecoder;
use crate::domain::model::{BuildRequest, FormMode};
use crate::domain::ports::{BuildTrigger, ConfigProvider, LogSource, LogStream};
use crate::utils::error::{Result, RunnerError};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use std::collections::VecDeque;
use url::Url;

const EVENT_STREAM: &str = "text/event-stream";

/// reqwest client for the build server. Implements both the trigger and the
/// log source ports.
#[derive(Debug, Clone)]
pub struct HttpBuildClient {
    client: Client,
    base_url: String,
    trigger_path: String,
    logs_path: String,
    run_path: String,
}

impl HttpBuildClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            trigger_path: "/build/run".to_string(),
            logs_path: "/build/logs".to_string(),
            run_path: "/api/run".to_string(),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url().to_string(),
            trigger_path: config.trigger_path().to_string(),
            logs_path: config.logs_path().to_string(),
            run_path: config.run_path().to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        Ok(Url::parse(&url)?)
    }

    pub fn trigger_url(&self) -> Result<Url> {
        self.endpoint(&self.trigger_path)
    }

    /// `{logs_path}?repoUrl=<percent-encoded>`
    pub fn logs_url(&self, request: &BuildRequest) -> Result<Url> {
        let mut url = self.endpoint(&self.logs_path)?;
        url.query_pairs_mut()
            .append_pair("repoUrl", &request.repository_url);
        Ok(url)
    }

    pub fn run_url(&self) -> Result<Url> {
        self.endpoint(&self.run_path)
    }
}

#[async_trait]
impl BuildTrigger for HttpBuildClient {
    async fn trigger(&self, request: &BuildRequest) -> Result<()> {
        let url = self.trigger_url()?;
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(&request.payload())
            .send()
            .await
            .map_err(|e| RunnerError::TriggerError {
                message: e.to_string(),
            })?;

        // 只在乎請求是否送達，回應內容不當作日誌
        if !response.status().is_success() {
            tracing::warn!("Build server answered the trigger with {}", response.status());
        }
        Ok(())
    }
}

#[async_trait]
impl LogSource for HttpBuildClient {
    async fn open(&self, request: &BuildRequest) -> Result<Box<dyn LogStream>> {
        let builder = match request.mode {
            FormMode::Strict => {
                let url = self.logs_url(request)?;
                tracing::debug!("GET {}", url);
                self.client.get(url)
            }
            FormMode::MultiField => {
                let url = self.run_url()?;
                tracing::debug!("POST {}", url);
                self.client.post(url).json(&request.payload())
            }
        };

        let response = builder.header(ACCEPT, EVENT_STREAM).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RunnerError::ServerStatusError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(Box::new(HttpLogStream::new(response)))
    }
}

pub struct HttpLogStream {
    response: Response,
    decoder: SseDecoder,
    ready: VecDeque<String>,
    finished: bool,
}

impl HttpLogStream {
    fn new(response: Response) -> Self {
        Self {
            response,
            decoder: SseDecoder::new(),
            ready: VecDeque::new(),
            finished: false,
        }
    }
}

#[async_trait]
impl LogStream for HttpLogStream {
    async fn next_line(&mut self) -> Option<Result<String>> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(Ok(line));
            }
            if self.finished {
                return None;
            }

            match self.response.chunk().await {
                Ok(Some(bytes)) => self.ready.extend(self.decoder.feed(&bytes)),
                Ok(None) => self.finished = true,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(RunnerError::stream(e.to_string())));
                }
            }
        }
    }
}
