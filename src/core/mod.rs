pub mod form;
pub mod runner;
pub mod session;
pub mod sse;
pub mod state;
pub mod viewer;

pub use crate::domain::model::{BuildRequest, FormMode, LogBuffer, Theme};
pub use crate::domain::ports::{BuildTrigger, ConfigProvider, LogSource, LogStream, Storage};
pub use crate::utils::error::Result;
