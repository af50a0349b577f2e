use crate::domain::model::{ApplicationId, ApplicationStatus};
use crate::domain::ports::{MutationReply, StatusBackend, StatusRequest};
use crate::utils::error::{
    PipelineError, Result, GENERIC_BULK_FAILURE, GENERIC_TRANSITION_FAILURE,
};

const SINGLE_SUCCESS: &str = "Application status updated successfully";

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionReceipt {
    pub applications: Vec<ApplicationId>,
    pub status: ApplicationStatus,
    pub message: String,
}

/// 發送單筆/批次狀態變更。不做樂觀更新，畫面只在成功後整體重載
pub struct TransitionClient<B: StatusBackend> {
    backend: B,
}

impl<B: StatusBackend> TransitionClient<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn transition_one(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<TransitionReceipt> {
        tracing::info!("🔁 Moving application {} to {}", id, status);
        let request = StatusRequest::Single {
            application_id: id,
            status,
        };
        let message = self
            .dispatch(&request, GENERIC_TRANSITION_FAILURE)
            .await?
            .unwrap_or_else(|| SINGLE_SUCCESS.to_string());

        Ok(TransitionReceipt {
            applications: vec![id],
            status,
            message,
        })
    }

    /// 空清單在本地直接拒絕，不會送到後端
    pub async fn transition_many(
        &self,
        ids: &[ApplicationId],
        status: ApplicationStatus,
    ) -> Result<TransitionReceipt> {
        if ids.is_empty() {
            tracing::warn!("🔁 Bulk move to {} refused: nothing selected", status);
            return Err(PipelineError::EmptySelection);
        }

        tracing::info!("🔁 Moving {} application(s) to {}", ids.len(), status);
        let request = StatusRequest::Bulk {
            application_ids: ids.to_vec(),
            status,
        };
        let message = self
            .dispatch(&request, GENERIC_BULK_FAILURE)
            .await?
            .unwrap_or_else(|| format!("Updated {} application(s) to {}", ids.len(), status));

        Ok(TransitionReceipt {
            applications: ids.to_vec(),
            status,
            message,
        })
    }

    async fn dispatch(&self, request: &StatusRequest, fallback: &str) -> Result<Option<String>> {
        let reply = match self.backend.send_status(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("❌ Status request did not complete: {}", e);
                return Err(PipelineError::transition_failed(fallback));
            }
        };

        let MutationReply {
            accepted,
            message,
            error,
        } = reply;

        if accepted {
            tracing::info!("✅ Backend accepted status change to {}", request.status());
            Ok(message)
        } else {
            let text = error
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string());
            tracing::error!("❌ Backend rejected status change: {}", text);
            Err(PipelineError::transition_failed(text))
        }
    }
}
