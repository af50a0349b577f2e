use crate::adapters::http::ApiClient;
use crate::core::pipeline_model::{ColumnKey, PipelineModel};
use crate::core::report::{ReportAggregator, ReportSummary};
use crate::core::selection::{SelectionBoard, SelectionTracker};
use crate::core::transition::{TransitionClient, TransitionReceipt};
use crate::domain::model::{ApplicationId, ApplicationStatus};
use crate::domain::ports::{PipelineSource, StatusBackend};
use crate::domain::session::Session;
use crate::utils::error::{PipelineError, Result};
use std::time::Duration;

/// 一次完整載入的結果，任何變更成功後整個替換，不做局部修補
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSnapshot {
    pub model: PipelineModel,
    pub selection: SelectionBoard,
    pub summary: ReportSummary,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    Idle,
    /// 任一查詢失敗時整個 Pipeline 只顯示失敗提示，不顯示部分資料
    Failed { message: String },
    Ready(PipelineSnapshot),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub receipt: TransitionReceipt,
    /// 變更成功但重載失敗時為 false，此時狀態為 `Failed`
    pub reloaded: bool,
}

/// Pipeline 的唯一擁有者：抓資料、建模型、處理勾選與狀態轉換。
///
/// 不做 debounce 或請求去重；每次成功的變更都觸發一次完整重載，
/// 最後完成的重載就是畫面上的狀態。
pub struct PipelineController<S: PipelineSource, B: StatusBackend> {
    source: S,
    transitions: TransitionClient<B>,
    state: PipelineState,
    generation: u64,
}

impl PipelineController<ApiClient, ApiClient> {
    /// 以明確的 session 建立連到真實後端的控制器
    pub fn connect(session: Session, timeout: Option<Duration>) -> Result<Self> {
        let api = ApiClient::with_timeout(session, timeout)?;
        Ok(Self::new(api.clone(), api))
    }
}

impl<S: PipelineSource, B: StatusBackend> PipelineController<S, B> {
    pub fn new(source: S, backend: B) -> Self {
        Self {
            source,
            transitions: TransitionClient::new(backend),
            state: PipelineState::Idle,
            generation: 0,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn snapshot(&self) -> Result<&PipelineSnapshot> {
        match &self.state {
            PipelineState::Ready(snapshot) => Ok(snapshot),
            PipelineState::Idle | PipelineState::Failed { .. } => Err(PipelineError::NotLoaded),
        }
    }

    pub async fn activate(&mut self) -> Result<&PipelineSnapshot> {
        tracing::info!("🚀 Activating application pipeline");
        self.reload().await
    }

    /// 同時抓職缺與申請，兩者都成功才重建；否則整體標記為失敗
    pub async fn reload(&mut self) -> Result<&PipelineSnapshot> {
        let fetched = tokio::try_join!(
            self.source.fetch_postings(),
            self.source.fetch_applications()
        );

        let (postings, applications) = match fetched {
            Ok(lists) => lists,
            Err(e) => {
                tracing::error!("❌ Pipeline load failed: {}", e);
                self.state = PipelineState::Failed {
                    message: e.to_string(),
                };
                return Err(PipelineError::fetch_failed("pipeline", e.to_string()));
            }
        };

        let model = PipelineModel::build(&postings, &applications);
        for issue in &model.issues {
            tracing::warn!("⚠️ Skipped record: {}", issue);
        }
        let selection = SelectionBoard::for_model(&model);
        let summary = ReportAggregator::summarize(&postings, &applications);

        self.generation += 1;
        tracing::info!(
            "✅ Pipeline built: {} posting(s), {} application(s), generation {}",
            model.groups.len(),
            model.application_count(),
            self.generation
        );

        self.state = PipelineState::Ready(PipelineSnapshot {
            model,
            selection,
            summary,
            generation: self.generation,
        });
        self.snapshot()
    }

    fn tracker(&self, key: ColumnKey) -> Result<&SelectionTracker> {
        self.snapshot()?
            .selection
            .tracker(key)
            .ok_or(PipelineError::UnknownColumn {
                posting: key.posting,
                status: key.status,
            })
    }

    fn tracker_mut(&mut self, key: ColumnKey) -> Result<&mut SelectionTracker> {
        match &mut self.state {
            PipelineState::Ready(snapshot) => {
                snapshot
                    .selection
                    .tracker_mut(key)
                    .ok_or(PipelineError::UnknownColumn {
                        posting: key.posting,
                        status: key.status,
                    })
            }
            _ => Err(PipelineError::NotLoaded),
        }
    }

    pub fn toggle(&mut self, key: ColumnKey, id: ApplicationId) -> Result<bool> {
        self.tracker_mut(key)?
            .toggle(id)
            .ok_or_else(|| PipelineError::InvalidInput {
                message: format!("application {} is not in column {}", id, key),
            })
    }

    /// 勾選或取消單一申請；與 toggle 不同，重複呼叫不會翻轉狀態
    pub fn set_selected(
        &mut self,
        key: ColumnKey,
        id: ApplicationId,
        selected: bool,
    ) -> Result<()> {
        self.tracker_mut(key)?
            .set(id, selected)
            .map(|_| ())
            .ok_or_else(|| PipelineError::InvalidInput {
                message: format!("application {} is not in column {}", id, key),
            })
    }

    pub fn select_all(&mut self, key: ColumnKey, applied: bool) -> Result<()> {
        self.tracker_mut(key)?.select_all(applied);
        Ok(())
    }

    pub fn is_all_selected(&self, key: ColumnKey) -> Result<bool> {
        Ok(self.tracker(key)?.is_all_selected())
    }

    pub fn selected(&self, key: ColumnKey) -> Result<Vec<ApplicationId>> {
        Ok(self.tracker(key)?.selected())
    }

    pub fn available_actions(&self, key: ColumnKey) -> Result<&'static [ApplicationStatus]> {
        Ok(self.tracker(key)?.key().status.allowed_transitions())
    }

    /// 目前畫面上已知的申請必須符合轉換表；未知的交給後端判斷
    fn check_eligible(&self, ids: &[ApplicationId], next: ApplicationStatus) -> Result<()> {
        let Ok(snapshot) = self.snapshot() else {
            return Ok(());
        };
        for id in ids {
            if let Some(app) = snapshot.model.find_application(*id) {
                if !app.status.can_transition_to(next) {
                    return Err(PipelineError::ActionUnavailable {
                        from: app.status,
                        to: next,
                    });
                }
            } else {
                tracing::debug!("Application {} not in current view, deferring to backend", id);
            }
        }
        Ok(())
    }

    pub async fn transition_one(
        &mut self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<TransitionOutcome> {
        self.check_eligible(&[id], status)?;
        let receipt = self.transitions.transition_one(id, status).await?;
        Ok(self.after_success(receipt).await)
    }

    pub async fn transition_many(
        &mut self,
        ids: &[ApplicationId],
        status: ApplicationStatus,
    ) -> Result<TransitionOutcome> {
        self.check_eligible(ids, status)?;
        let receipt = self.transitions.transition_many(ids, status).await?;
        Ok(self.after_success(receipt).await)
    }

    /// 對某欄位目前勾選的申請做批次轉換
    pub async fn transition_selected(
        &mut self,
        key: ColumnKey,
        status: ApplicationStatus,
    ) -> Result<TransitionOutcome> {
        let tracker = self.tracker(key)?;
        if !key.status.can_transition_to(status) {
            return Err(PipelineError::ActionUnavailable {
                from: key.status,
                to: status,
            });
        }
        let ids = tracker.selected();
        let receipt = self.transitions.transition_many(&ids, status).await?;
        Ok(self.after_success(receipt).await)
    }

    async fn after_success(&mut self, receipt: TransitionReceipt) -> TransitionOutcome {
        tracing::info!("✅ {}", receipt.message);
        let reloaded = match self.reload().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("⚠️ Status changed but reload failed: {}", e);
                false
            }
        };
        TransitionOutcome { receipt, reloaded }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Application, Posting, PostingId};
    use crate::domain::ports::{MutationReply, StatusRequest};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use ApplicationStatus::*;

    /// 每次 fetch_applications 取下一份列表，最後一份重複使用
    #[derive(Clone)]
    struct MockSource {
        postings: Arc<Mutex<std::result::Result<Vec<Posting>, String>>>,
        applications: Arc<Mutex<VecDeque<Vec<Application>>>>,
        fail_applications: Arc<Mutex<bool>>,
        fetches: Arc<AtomicUsize>,
    }

    impl MockSource {
        fn new(postings: Vec<Posting>, applications: Vec<Vec<Application>>) -> Self {
            Self {
                postings: Arc::new(Mutex::new(Ok(postings))),
                applications: Arc::new(Mutex::new(applications.into())),
                fail_applications: Arc::new(Mutex::new(false)),
                fetches: Arc::new(AtomicUsize::new(0)),
            }
        }

        async fn fail_postings(&self) {
            *self.postings.lock().await = Err("status 500".to_string());
        }

        async fn set_applications_failing(&self, failing: bool) {
            *self.fail_applications.lock().await = failing;
        }
    }

    #[async_trait::async_trait]
    impl PipelineSource for MockSource {
        async fn fetch_postings(&self) -> Result<Vec<Posting>> {
            self.postings
                .lock()
                .await
                .clone()
                .map_err(|message| PipelineError::fetch_failed("postings", message))
        }

        async fn fetch_applications(&self) -> Result<Vec<Application>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if *self.fail_applications.lock().await {
                return Err(PipelineError::fetch_failed("applications", "status 500"));
            }
            let mut queue = self.applications.lock().await;
            if queue.len() > 1 {
                Ok(queue.pop_front().unwrap_or_default())
            } else {
                Ok(queue.front().cloned().unwrap_or_default())
            }
        }
    }

    #[derive(Clone)]
    struct MockBackend {
        requests: Arc<Mutex<Vec<StatusRequest>>>,
        reply: MutationReply,
    }

    impl MockBackend {
        fn accepting() -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                reply: MutationReply {
                    accepted: true,
                    message: Some("ok".to_string()),
                    error: None,
                },
            }
        }

        fn rejecting(error: &str) -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                reply: MutationReply {
                    accepted: false,
                    message: None,
                    error: Some(error.to_string()),
                },
            }
        }

        async fn sent(&self) -> usize {
            self.requests.lock().await.len()
        }

        async fn last(&self) -> Option<StatusRequest> {
            self.requests.lock().await.last().cloned()
        }
    }

    #[async_trait::async_trait]
    impl StatusBackend for MockBackend {
        async fn send_status(&self, request: &StatusRequest) -> Result<MutationReply> {
            self.requests.lock().await.push(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn postings() -> Vec<Posting> {
        vec![Posting::new(1, "P1").with_package(8.0), Posting::new(2, "P2")]
    }

    fn initial() -> Vec<Application> {
        vec![
            Application::new(1, 1, "A1", Applied),
            Application::new(2, 1, "A2", Shortlisted),
            Application::new(3, 1, "A3", Rejected),
            Application::new(4, 2, "A4", Applied),
        ]
    }

    fn after_shortlist() -> Vec<Application> {
        vec![
            Application::new(1, 1, "A1", Shortlisted),
            Application::new(2, 1, "A2", Shortlisted),
            Application::new(3, 1, "A3", Rejected),
            Application::new(4, 2, "A4", Applied),
        ]
    }

    fn key(posting: i64, status: ApplicationStatus) -> ColumnKey {
        ColumnKey::new(PostingId(posting), status)
    }

    #[tokio::test]
    async fn test_activate_builds_model_and_summary() {
        let source = MockSource::new(postings(), vec![initial()]);
        let mut controller = PipelineController::new(source, MockBackend::accepting());

        let snapshot = controller.activate().await.unwrap();

        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.model.groups.len(), 2);
        assert_eq!(snapshot.summary.total_postings, 2);
        assert_eq!(snapshot.summary.total_applications, 4);
        assert!(snapshot.selection.is_empty());
    }

    #[tokio::test]
    async fn test_activation_failure_shows_no_partial_data() {
        let source = MockSource::new(postings(), vec![initial()]);
        source.fail_postings().await;
        let mut controller = PipelineController::new(source, MockBackend::accepting());

        let err = controller.activate().await.unwrap_err();

        assert!(matches!(err, PipelineError::FetchFailed { .. }));
        assert!(matches!(controller.state(), PipelineState::Failed { .. }));
        assert!(matches!(
            controller.snapshot(),
            Err(PipelineError::NotLoaded)
        ));
    }

    #[tokio::test]
    async fn test_transition_one_then_reload_moves_application() {
        let source = MockSource::new(postings(), vec![initial(), after_shortlist()]);
        let backend = MockBackend::accepting();
        let mut controller = PipelineController::new(source.clone(), backend.clone());
        controller.activate().await.unwrap();

        let outcome = controller
            .transition_one(ApplicationId(1), Shortlisted)
            .await
            .unwrap();

        assert!(outcome.reloaded);
        assert_eq!(backend.sent().await, 1);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
        let snapshot = controller.snapshot().unwrap();
        assert_eq!(snapshot.generation, 2);
        let group = snapshot.model.group(PostingId(1)).unwrap();
        assert!(group.column(Applied).unwrap().is_empty());
        assert_eq!(
            group.column(Shortlisted).unwrap().ids(),
            vec![ApplicationId(1), ApplicationId(2)]
        );
    }

    #[tokio::test]
    async fn test_reload_resets_selection() {
        let source = MockSource::new(postings(), vec![initial(), after_shortlist()]);
        let mut controller = PipelineController::new(source, MockBackend::accepting());
        controller.activate().await.unwrap();

        controller.select_all(key(1, Applied), true).unwrap();
        controller.toggle(key(2, Applied), ApplicationId(4)).unwrap();
        assert!(controller.is_all_selected(key(1, Applied)).unwrap());

        controller
            .transition_selected(key(1, Applied), Shortlisted)
            .await
            .unwrap();

        let snapshot = controller.snapshot().unwrap();
        assert!(snapshot.selection.is_empty());
        for column in snapshot.model.columns() {
            assert!(controller.selected(column.key).unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_failed_transition_leaves_state_untouched() {
        let source = MockSource::new(postings(), vec![initial()]);
        let mut controller =
            PipelineController::new(source.clone(), MockBackend::rejecting("Application not found"));
        controller.activate().await.unwrap();
        controller.toggle(key(1, Applied), ApplicationId(1)).unwrap();
        let before = controller.snapshot().unwrap().clone();

        let err = controller
            .transition_selected(key(1, Applied), Rejected)
            .await
            .unwrap_err();

        assert_eq!(err.user_friendly_message(), "Application not found");
        assert_eq!(controller.snapshot().unwrap(), &before);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bulk_with_empty_selection_is_local() {
        let source = MockSource::new(postings(), vec![initial()]);
        let backend = MockBackend::accepting();
        let mut controller = PipelineController::new(source, backend.clone());
        controller.activate().await.unwrap();

        let err = controller
            .transition_selected(key(1, Applied), Shortlisted)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::EmptySelection));
        assert_eq!(backend.sent().await, 0);
    }

    #[tokio::test]
    async fn test_repeated_set_selected_keeps_application() {
        let source = MockSource::new(postings(), vec![initial()]);
        let backend = MockBackend::accepting();
        let mut controller = PipelineController::new(source, backend.clone());
        controller.activate().await.unwrap();

        for _ in 0..2 {
            controller
                .set_selected(key(1, Applied), ApplicationId(1), true)
                .unwrap();
        }
        assert_eq!(
            controller.selected(key(1, Applied)).unwrap(),
            vec![ApplicationId(1)]
        );
        assert!(matches!(
            controller.set_selected(key(1, Applied), ApplicationId(4), true),
            Err(PipelineError::InvalidInput { .. })
        ));

        controller
            .transition_selected(key(1, Applied), Rejected)
            .await
            .unwrap();

        assert_eq!(
            backend.last().await,
            Some(StatusRequest::Bulk {
                application_ids: vec![ApplicationId(1)],
                status: Rejected,
            })
        );
    }

    #[tokio::test]
    async fn test_actions_follow_transition_table() {
        let source = MockSource::new(postings(), vec![initial()]);
        let backend = MockBackend::accepting();
        let mut controller = PipelineController::new(source, backend.clone());
        controller.activate().await.unwrap();

        assert_eq!(
            controller.available_actions(key(1, Shortlisted)).unwrap(),
            &[Rejected]
        );

        let err = controller
            .transition_one(ApplicationId(2), Applied)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ActionUnavailable {
                from: Shortlisted,
                to: Applied
            }
        ));

        controller.select_all(key(1, Rejected), true).unwrap();
        let err = controller
            .transition_selected(key(1, Rejected), Shortlisted)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ActionUnavailable { .. }));
        assert_eq!(backend.sent().await, 0);
    }

    #[tokio::test]
    async fn test_selection_is_scoped_per_posting() {
        let source = MockSource::new(postings(), vec![initial()]);
        let mut controller = PipelineController::new(source, MockBackend::accepting());
        controller.activate().await.unwrap();

        assert!(controller.toggle(key(1, Applied), ApplicationId(1)).unwrap());
        assert!(controller.selected(key(2, Applied)).unwrap().is_empty());

        // A4 屬於 P2，不能在 P1 的欄位勾選
        assert!(matches!(
            controller.toggle(key(1, Applied), ApplicationId(4)),
            Err(PipelineError::InvalidInput { .. })
        ));
        assert!(matches!(
            controller.toggle(key(9, Applied), ApplicationId(1)),
            Err(PipelineError::UnknownColumn { .. })
        ));
    }

    #[tokio::test]
    async fn test_reload_failure_after_success_marks_failed() {
        let source = MockSource::new(postings(), vec![initial()]);
        let mut controller = PipelineController::new(source.clone(), MockBackend::accepting());
        controller.activate().await.unwrap();
        source.set_applications_failing(true).await;

        let outcome = controller
            .transition_one(ApplicationId(1), Shortlisted)
            .await
            .unwrap();

        assert!(!outcome.reloaded);
        assert!(matches!(controller.state(), PipelineState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_selection_requires_loaded_pipeline() {
        let source = MockSource::new(postings(), vec![initial()]);
        let mut controller = PipelineController::new(source, MockBackend::accepting());

        assert!(matches!(
            controller.toggle(key(1, Applied), ApplicationId(1)),
            Err(PipelineError::NotLoaded)
        ));
    }
}
