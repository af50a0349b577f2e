#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::session::Session;
use crate::utils::error::{PipelineError, Result};
use crate::utils::validation::{validate_range, validate_required_field, Validate};
use std::time::Duration;

pub use toml_config::TomlConfig;

pub const TOKEN_ENV: &str = "PLACEMENT_TOKEN";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// 合併命令列、設定檔與環境變數後的最終設定
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub export_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_seconds: None,
            export_path: None,
        }
    }
}

impl Settings {
    /// 設定檔覆蓋預設值
    pub fn from_file_config(file: &TomlConfig) -> Self {
        Self {
            base_url: file.backend.base_url.clone(),
            token: file.token().map(str::to_string),
            timeout_seconds: file.backend.timeout_seconds,
            export_path: file.export_path().map(str::to_string),
        }
    }

    /// 最後才讀環境變數中的 token
    pub fn with_env_token(mut self) -> Self {
        if self.token.is_none() {
            self.token = std::env::var(TOKEN_ENV)
                .ok()
                .filter(|token| !token.trim().is_empty());
        }
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    pub fn session(&self) -> Result<Session> {
        let token = validate_required_field("token", &self.token)?;
        Session::new(&self.base_url, token.clone())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        crate::utils::validation::validate_url("base_url", &self.base_url)?;
        if let Some(timeout) = self.timeout_seconds {
            validate_range("timeout_seconds", timeout, 1, 600)?;
        }
        if self.token.is_none() {
            return Err(PipelineError::MissingConfigError {
                field: format!("token (use --token, the config file, or {})", TOKEN_ENV),
            });
        }
        Ok(())
    }
}
