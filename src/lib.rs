pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::RunnerConfig;

pub use adapters::{http::HttpBuildClient, storage::LocalStorage};
pub use core::{form::InputForm, runner::BuildRunner, viewer::LogViewer};
pub use utils::error::{Result, RunnerError};
