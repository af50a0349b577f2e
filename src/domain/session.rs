use crate::utils::error::{PipelineError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use std::fmt;
use url::Url;

/// 明確的連線上下文（後端位址 + bearer token），建構時傳入控制器
#[derive(Clone)]
pub struct Session {
    base_url: Url,
    token: String,
}

impl Session {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        validate_url("base_url", base_url)?;
        let base_url = Url::parse(base_url).map_err(|e| PipelineError::InvalidConfigValueError {
            field: "base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let session = Self {
            base_url,
            token: token.into(),
        };
        session.validate()?;
        Ok(session)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// 把 API 路徑接在 base URL 之後，保留 base 上的路徑前綴
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Validate for Session {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("token", &self.token)
    }
}

// token 不寫進日誌
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"***")
            .finish()
    }
}
