use crate::domain::model::{Application, ApplicationId, ApplicationStatus, Posting, PostingId};
use crate::utils::error::PipelineError;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// 一個欄位的識別：(職缺, 狀態)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnKey {
    pub posting: PostingId,
    pub status: ApplicationStatus,
}

impl ColumnKey {
    pub fn new(posting: PostingId, status: ApplicationStatus) -> Self {
        Self { posting, status }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.posting, self.status)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineColumn {
    pub key: ColumnKey,
    pub applications: Vec<Application>,
}

impl PipelineColumn {
    fn empty(key: ColumnKey) -> Self {
        Self {
            key,
            applications: Vec::new(),
        }
    }

    pub fn status(&self) -> ApplicationStatus {
        self.key.status
    }

    pub fn ids(&self) -> Vec<ApplicationId> {
        self.applications.iter().map(|app| app.id).collect()
    }

    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }

    /// 這個欄位可提供的動作（由狀態轉換表決定）
    pub fn available_actions(&self) -> &'static [ApplicationStatus] {
        self.key.status.allowed_transitions()
    }
}

/// 單一職缺的分組結果：三個顯示欄位 + 已錄取（只用於報表）
#[derive(Debug, Clone, PartialEq)]
pub struct PostingGroup {
    pub posting: Posting,
    columns: Vec<PipelineColumn>,
    selected: Vec<Application>,
}

impl PostingGroup {
    fn new(posting: Posting) -> Self {
        let columns = ApplicationStatus::pipeline_columns()
            .into_iter()
            .map(|status| PipelineColumn::empty(ColumnKey::new(posting.id, status)))
            .collect();
        Self {
            posting,
            columns,
            selected: Vec::new(),
        }
    }

    fn push(&mut self, application: Application) {
        match application.status {
            ApplicationStatus::Selected => self.selected.push(application),
            status => {
                if let Some(column) = self.columns.iter_mut().find(|c| c.key.status == status) {
                    column.applications.push(application);
                }
            }
        }
    }

    /// 依固定順序 Applied, Shortlisted, Rejected
    pub fn columns(&self) -> &[PipelineColumn] {
        &self.columns
    }

    pub fn column(&self, status: ApplicationStatus) -> Option<&PipelineColumn> {
        self.columns.iter().find(|c| c.key.status == status)
    }

    pub fn selected(&self) -> &[Application] {
        &self.selected
    }

    /// 任一狀態的成員，包含不顯示的 Selected
    pub fn members(&self, status: ApplicationStatus) -> &[Application] {
        match status {
            ApplicationStatus::Selected => &self.selected,
            other => self
                .column(other)
                .map(|c| c.applications.as_slice())
                .unwrap_or(&[]),
        }
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(PipelineColumn::len).sum::<usize>() + self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// 被排除在分組之外的輸入記錄
#[derive(Debug, Clone, PartialEq)]
pub enum InputIssue {
    UnknownPosting {
        application: ApplicationId,
        posting: PostingId,
    },
    DuplicateApplication {
        application: ApplicationId,
    },
    DuplicatePosting {
        posting: PostingId,
    },
}

impl fmt::Display for InputIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputIssue::UnknownPosting {
                application,
                posting,
            } => write!(
                f,
                "application {} references unknown posting {}",
                application, posting
            ),
            InputIssue::DuplicateApplication { application } => {
                write!(f, "application {} appears more than once", application)
            }
            InputIssue::DuplicatePosting { posting } => {
                write!(f, "posting {} appears more than once", posting)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineModel {
    pub groups: Vec<PostingGroup>,
    pub issues: Vec<InputIssue>,
}

impl PipelineModel {
    /// 純函式：把職缺與申請分組成 Pipeline view-model。
    ///
    /// 職缺與欄位內的申請都保留來源順序；沒有申請的職缺仍會產生空欄位。
    /// 指向未知職缺或重複的記錄不會進入任何欄位，而是記錄在 `issues`。
    pub fn build(postings: &[Posting], applications: &[Application]) -> Self {
        let mut groups: Vec<PostingGroup> = Vec::with_capacity(postings.len());
        let mut index: HashMap<PostingId, usize> = HashMap::with_capacity(postings.len());
        let mut issues = Vec::new();

        for posting in postings {
            if index.contains_key(&posting.id) {
                issues.push(InputIssue::DuplicatePosting {
                    posting: posting.id,
                });
                continue;
            }
            index.insert(posting.id, groups.len());
            groups.push(PostingGroup::new(posting.clone()));
        }

        let mut seen: HashSet<ApplicationId> = HashSet::with_capacity(applications.len());
        for application in applications {
            let Some(&slot) = index.get(&application.posting_id) else {
                issues.push(InputIssue::UnknownPosting {
                    application: application.id,
                    posting: application.posting_id,
                });
                continue;
            };
            if !seen.insert(application.id) {
                issues.push(InputIssue::DuplicateApplication {
                    application: application.id,
                });
                continue;
            }
            groups[slot].push(application.clone());
        }

        Self { groups, issues }
    }

    pub fn group(&self, posting: PostingId) -> Option<&PostingGroup> {
        self.groups.iter().find(|g| g.posting.id == posting)
    }

    pub fn column(&self, key: ColumnKey) -> Option<&PipelineColumn> {
        self.group(key.posting).and_then(|g| g.column(key.status))
    }

    pub fn columns(&self) -> impl Iterator<Item = &PipelineColumn> {
        self.groups.iter().flat_map(|g| g.columns().iter())
    }

    /// 目前顯示狀態下找申請（含 Selected）
    pub fn find_application(&self, id: ApplicationId) -> Option<&Application> {
        self.groups.iter().find_map(|g| {
            ApplicationStatus::all()
                .into_iter()
                .flat_map(|status| g.members(status).iter())
                .find(|app| app.id == id)
        })
    }

    pub fn application_count(&self) -> usize {
        self.groups.iter().map(PostingGroup::total).sum()
    }

    pub fn input_error(&self) -> Option<PipelineError> {
        if self.issues.is_empty() {
            return None;
        }
        let details: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        Some(PipelineError::InvalidInput {
            message: details.join("; "),
        })
    }
}
