use crate::domain::model::{BuildRequest, FormMode};
use crate::utils::error::Result;
use crate::utils::validation::{validate_github_repo_url, validate_non_empty_string};

pub const REPO_URL_FIELD: &str = "repoUrl";
pub const SERVICE_FIELD: &str = "service";
pub const BUILD_FIELD: &str = "build";

/// The build form. Field set and validation rules depend on `mode`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputForm {
    mode: FormMode,
    pub repo_url: String,
    pub service: String,
    pub build: String,
}

impl InputForm {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn strict(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            ..Self::new(FormMode::Strict)
        }
    }

    pub fn multi_field(
        repo_url: impl Into<String>,
        service: impl Into<String>,
        build: impl Into<String>,
    ) -> Self {
        Self {
            mode: FormMode::MultiField,
            repo_url: repo_url.into(),
            service: service.into(),
            build: build.into(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self, in_progress: bool) -> bool {
        !in_progress && !self.repo_url.trim().is_empty()
    }

    pub fn submit(&self) -> Result<BuildRequest> {
        match self.mode {
            FormMode::Strict => {
                validate_github_repo_url(REPO_URL_FIELD, &self.repo_url)?;
                Ok(BuildRequest {
                    mode: self.mode,
                    repository_url: self.repo_url.clone(),
                    service_name: None,
                    build_tool: None,
                })
            }
            FormMode::MultiField => {
                validate_non_empty_string(REPO_URL_FIELD, &self.repo_url)?;
                validate_non_empty_string(SERVICE_FIELD, &self.service)?;
                validate_non_empty_string(BUILD_FIELD, &self.build)?;
                Ok(BuildRequest {
                    mode: self.mode,
                    repository_url: self.repo_url.trim().to_string(),
                    service_name: Some(self.service.trim().to_string()),
                    build_tool: Some(self.build.trim().to_string()),
                })
            }
        }
    }
}
