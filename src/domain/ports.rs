use crate::domain::model::{BuildRequest, FormMode, Theme};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn trigger_path(&self) -> &str;
    fn logs_path(&self) -> &str;
    fn run_path(&self) -> &str;
    fn mode(&self) -> FormMode;
    fn theme(&self) -> Theme;
    fn viewer_height(&self) -> usize;
}

/// Sends the build-initiation request. Only delivery matters, the response
/// body is never read for log content.
#[async_trait]
pub trait BuildTrigger: Send + Sync {
    async fn trigger(&self, request: &BuildRequest) -> Result<()>;
}

/// Opens the server-push connection for a build.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn open(&self, request: &BuildRequest) -> Result<Box<dyn LogStream>>;
}

/// One open connection yielding text lines. `None` means the server closed it.
#[async_trait]
pub trait LogStream: Send {
    async fn next_line(&mut self) -> Option<Result<String>>;
}
