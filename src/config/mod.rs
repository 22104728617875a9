#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::{FormMode, Theme};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_endpoint_path, validate_positive_number, validate_url, Validate,
};
use toml_config::TomlConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_VIEWER_HEIGHT: usize = 25;

/// Settings after defaults, the TOML file and CLI flags have been merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub base_url: String,
    pub trigger_path: String,
    pub logs_path: String,
    pub run_path: String,
    pub mode: FormMode,
    pub theme: Theme,
    pub viewer_height: usize,
    pub color: bool,
    pub export_dir: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            trigger_path: "/build/run".to_string(),
            logs_path: "/build/logs".to_string(),
            run_path: "/api/run".to_string(),
            mode: FormMode::default(),
            theme: Theme::default(),
            viewer_height: DEFAULT_VIEWER_HEIGHT,
            color: true,
            export_dir: None,
        }
    }
}

impl RunnerConfig {
    pub fn from_toml(file: &TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            base_url: file.server.base_url.clone().unwrap_or(defaults.base_url),
            trigger_path: file.endpoints.trigger.clone().unwrap_or(defaults.trigger_path),
            logs_path: file.endpoints.logs.clone().unwrap_or(defaults.logs_path),
            run_path: file.endpoints.run.clone().unwrap_or(defaults.run_path),
            mode: file.form.mode.unwrap_or(defaults.mode),
            theme: file.viewer.theme.unwrap_or(defaults.theme),
            viewer_height: file.viewer.height.unwrap_or(defaults.viewer_height),
            color: file.viewer.color.unwrap_or(defaults.color),
            export_dir: file.viewer.export_dir.clone(),
        }
    }
}

impl ConfigProvider for RunnerConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn trigger_path(&self) -> &str {
        &self.trigger_path
    }

    fn logs_path(&self) -> &str {
        &self.logs_path
    }

    fn run_path(&self) -> &str {
        &self.run_path
    }

    fn mode(&self) -> FormMode {
        self.mode
    }

    fn theme(&self) -> Theme {
        self.theme
    }

    fn viewer_height(&self) -> usize {
        self.viewer_height
    }
}

impl Validate for RunnerConfig {
    fn validate(&self) -> Result<()> {
        validate_url("server.base_url", &self.base_url)?;
        validate_endpoint_path("endpoints.trigger", &self.trigger_path)?;
        validate_endpoint_path("endpoints.logs", &self.logs_path)?;
        validate_endpoint_path("endpoints.run", &self.run_path)?;
        validate_positive_number("viewer.height", self.viewer_height, 1)?;
        Ok(())
    }
}
