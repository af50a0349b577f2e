use crate::domain::model::{
    Application, ApplicationId, ApplicationStatus, Posting, StudentApplication,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// 查詢端：Pipeline 所需的兩份列表
#[async_trait]
pub trait PipelineSource: Send + Sync {
    async fn fetch_postings(&self) -> Result<Vec<Posting>>;
    async fn fetch_applications(&self) -> Result<Vec<Application>>;
}

/// 學生端報表的資料來源
#[async_trait]
pub trait StudentSource: Send + Sync {
    async fn fetch_student_applications(&self) -> Result<Vec<StudentApplication>>;
}

/// 寫入端：狀態變更請求
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatusRequest {
    Single {
        #[serde(skip)]
        application_id: ApplicationId,
        status: ApplicationStatus,
    },
    Bulk {
        application_ids: Vec<ApplicationId>,
        status: ApplicationStatus,
    },
}

impl StatusRequest {
    pub fn status(&self) -> ApplicationStatus {
        match self {
            StatusRequest::Single { status, .. } | StatusRequest::Bulk { status, .. } => *status,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            StatusRequest::Single { .. } => 1,
            StatusRequest::Bulk {
                application_ids, ..
            } => application_ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 後端對變更請求的答覆；`accepted == false` 代表非 2xx
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationReply {
    pub accepted: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// `Err` 只用於傳輸或解析失敗，後端拒絕以 `MutationReply` 表示
#[async_trait]
pub trait StatusBackend: Send + Sync {
    async fn send_status(&self, request: &StatusRequest) -> Result<MutationReply>;
}
