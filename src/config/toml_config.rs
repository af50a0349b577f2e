use crate::utils::error::{PipelineError, Result};
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub backend: BackendConfig,
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PipelineError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PipelineError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PLACEMENT_TOKEN})，找不到的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PipelineError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// token 仍是未替換的 ${VAR} 時視為沒有設定
    pub fn token(&self) -> Option<&str> {
        self.backend
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty() && !token.starts_with("${"))
    }

    pub fn export_path(&self) -> Option<&str> {
        self.export.as_ref().and_then(|e| e.output_path.as_deref())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_url("backend.base_url", &self.backend.base_url)?;

        if let Some(timeout) = self.backend.timeout_seconds {
            validate_range("backend.timeout_seconds", timeout, 1, 600)?;
        }

        if let Some(path) = self.export_path() {
            validate_path("export.output_path", path)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = TomlConfig::from_toml_str(
            r#"
[backend]
base_url = "http://localhost:5000"
"#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "http://localhost:5000");
        assert_eq!(config.token(), None);
        assert_eq!(config.backend.timeout_seconds, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("PLACEMENT_TEST_TOKEN_SUBST", "abc123");
        let config = TomlConfig::from_toml_str(
            r#"
[backend]
base_url = "http://localhost:5000"
token = "${PLACEMENT_TEST_TOKEN_SUBST}"
timeout_seconds = 30

[export]
output_path = "./out/pipeline.csv"
"#,
        )
        .unwrap();

        assert_eq!(config.token(), Some("abc123"));
        assert_eq!(config.export_path(), Some("./out/pipeline.csv"));
    }

    #[test]
    fn test_unresolved_token_counts_as_missing() {
        let config = TomlConfig::from_toml_str(
            r#"
[backend]
base_url = "http://localhost:5000"
token = "${PLACEMENT_TEST_TOKEN_NEVER_SET}"
"#,
        )
        .unwrap();

        assert_eq!(config.token(), None);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = TomlConfig::from_toml_str(
            r#"
[backend]
base_url = "ftp://localhost"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str(
            r#"
[backend]
base_url = "http://localhost:5000"
timeout_seconds = 0
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            TomlConfig::from_toml_str("[backend"),
            Err(PipelineError::ConfigValidationError { .. })
        ));
    }
}
