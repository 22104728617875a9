use crate::utils::error::{Result, RunnerError};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static GITHUB_REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://(www\.)?github\.com/[A-Za-z0-9._-]+/[A-Za-z0-9._-]+(\.git)?$")
        .expect("GitHub repository pattern is a valid regex")
});

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn is_github_repo_url(value: &str) -> bool {
    GITHUB_REPO_URL.is_match(value)
}

/// 空白先 trim 再判斷；格式則以原始輸入比對
pub fn validate_github_repo_url(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    if !is_github_repo_url(value) {
        return Err(RunnerError::validation(
            field_name,
            "Please enter a valid GitHub repository URL.",
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RunnerError::validation(
            field_name,
            format!("The '{}' field is required", field_name),
        ));
    }
    Ok(())
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RunnerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RunnerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(RunnerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_endpoint_path(field_name: &str, path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(RunnerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Endpoint path must start with '/'".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(RunnerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}
