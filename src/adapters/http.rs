use crate::domain::model::{ApiMessage, Application, Posting, StudentApplication};
use crate::domain::ports::{
    MutationReply, PipelineSource, StatusBackend, StatusRequest, StudentSource,
};
use crate::domain::session::Session;
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const POSTINGS_PATH: &str = "/api/officer/postings";
pub const APPLICATIONS_PATH: &str = "/api/officer/applications";
pub const BULK_STATUS_PATH: &str = "/api/officer/applications/bulk-status";
pub const STUDENT_APPLICATIONS_PATH: &str = "/api/student/applications";

/// 後端 API 的 reqwest 實作，所有請求都帶 bearer token
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    session: Session,
}

impl ApiClient {
    pub fn new(session: Session) -> Self {
        Self {
            client: Client::new(),
            session,
        }
    }

    /// 預設沒有逾時；有設定時套用到每個請求
    pub fn with_timeout(session: Session, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| PipelineError::ConfigError {
            message: format!("Failed to build HTTP client: {}", e),
        })?;
        Ok(Self { client, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn get_list<T: DeserializeOwned>(&self, resource: &str, path: &str) -> Result<Vec<T>> {
        let endpoint = self.session.endpoint(path);
        tracing::debug!("📡 Fetching {} from: {}", resource, endpoint);

        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(self.session.token())
            .send()
            .await
            .map_err(|e| PipelineError::fetch_failed(resource, e.to_string()))?;

        let status = response.status();
        tracing::debug!("📡 {} response status: {}", resource, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiMessage>(&body)
                .ok()
                .and_then(|msg| msg.error)
                .unwrap_or_else(|| format!("API request failed with status: {}", status));
            tracing::error!("❌ Failed to load {}: {}", resource, detail);
            return Err(PipelineError::fetch_failed(resource, detail));
        }

        let items: Vec<T> = response
            .json()
            .await
            .map_err(|e| PipelineError::fetch_failed(resource, format!("invalid payload: {}", e)))?;

        tracing::info!("📡 Fetched {} {}", items.len(), resource);
        Ok(items)
    }
}

#[async_trait]
impl PipelineSource for ApiClient {
    async fn fetch_postings(&self) -> Result<Vec<Posting>> {
        self.get_list("postings", POSTINGS_PATH).await
    }

    async fn fetch_applications(&self) -> Result<Vec<Application>> {
        self.get_list("applications", APPLICATIONS_PATH).await
    }
}

#[async_trait]
impl StudentSource for ApiClient {
    async fn fetch_student_applications(&self) -> Result<Vec<StudentApplication>> {
        self.get_list("student applications", STUDENT_APPLICATIONS_PATH)
            .await
    }
}

#[async_trait]
impl StatusBackend for ApiClient {
    async fn send_status(&self, request: &StatusRequest) -> Result<MutationReply> {
        let path = match request {
            StatusRequest::Single { application_id, .. } => {
                format!("/api/officer/applications/{}/status", application_id)
            }
            StatusRequest::Bulk { .. } => BULK_STATUS_PATH.to_string(),
        };
        let endpoint = self.session.endpoint(&path);
        tracing::debug!("📡 PUT {} ({} application(s))", endpoint, request.len());

        let response = self
            .client
            .put(&endpoint)
            .bearer_auth(self.session.token())
            .json(request)
            .send()
            .await
            .map_err(|e| PipelineError::transition_failed(e.to_string()))?;

        let accepted = response.status().is_success();
        tracing::debug!("📡 Status change response: {}", response.status());

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::transition_failed(e.to_string()))?;

        let parsed = serde_json::from_str::<ApiMessage>(&body);
        let payload = match (accepted, parsed) {
            (_, Ok(payload)) => payload,
            // 成功但回應無法解析，視為失敗
            (true, Err(e)) => return Err(PipelineError::SerializationError(e)),
            (false, Err(_)) => ApiMessage::default(),
        };

        Ok(MutationReply {
            accepted,
            message: payload.message,
            error: payload.error,
        })
    }
}
