use crate::config::toml_config::TomlConfig;
use crate::config::RunnerConfig;
use crate::core::form::InputForm;
use crate::domain::model::{FormMode, Theme};
use crate::utils::error::Result;
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "build-runner")]
#[command(about = "Trigger a remote Git build and stream its logs")]
pub struct CliConfig {
    /// Git repository to build
    #[arg(long)]
    pub repo_url: String,

    /// Service name (multi-field mode)
    #[arg(long)]
    pub service: Option<String>,

    /// Build tool, e.g. maven, gradle, npm (multi-field mode)
    #[arg(long)]
    pub build: Option<String>,

    #[arg(long, value_enum)]
    pub mode: Option<FormMode>,

    /// Build server base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, value_enum)]
    pub theme: Option<Theme>,

    #[arg(long, help = "Disable colored log output")]
    pub no_color: bool,

    /// Number of log lines kept on screen when redrawing
    #[arg(long)]
    pub height: Option<usize>,

    /// Save the log as build-log.txt in this directory once the stream closes
    #[arg(long)]
    pub export_dir: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl CliConfig {
    /// 預設值 ← TOML 檔 ← 命令列
    pub fn resolve(&self) -> Result<RunnerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                RunnerConfig::from_toml(&TomlConfig::from_file(path)?)
            }
            None => RunnerConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if let Some(height) = self.height {
            config.viewer_height = height;
        }
        if self.no_color {
            config.color = false;
        }
        if let Some(dir) = &self.export_dir {
            config.export_dir = Some(dir.clone());
        }

        Ok(config)
    }

    pub fn form(&self, mode: FormMode) -> InputForm {
        match mode {
            FormMode::Strict => {
                if self.service.is_some() || self.build.is_some() {
                    tracing::warn!("--service and --build are ignored in strict mode");
                }
                InputForm::strict(self.repo_url.clone())
            }
            FormMode::MultiField => InputForm::multi_field(
                self.repo_url.clone(),
                self.service.clone().unwrap_or_default(),
                self.build.clone().unwrap_or_default(),
            ),
        }
    }
}
