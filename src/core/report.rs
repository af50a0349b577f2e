use crate::domain::model::{Application, ApplicationStatus, Posting, PostingId, StudentApplication};
use serde::Serialize;
use std::collections::HashMap;

/// Pipeline 摘要面板
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_postings: usize,
    pub total_applications: usize,
    pub selected: usize,
    pub avg_package: f64,
}

impl ReportSummary {
    pub fn avg_package_display(&self) -> String {
        format!("{:.2}", self.avg_package)
    }
}

/// 學生端報表：只看自己的申請
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudentReport {
    pub total: usize,
    pub shortlisted: usize,
    pub selected: usize,
    pub rejected: usize,
}

pub struct ReportAggregator;

impl ReportAggregator {
    /// 平均薪資只計算已錄取且所屬職缺有數值 package 的申請；沒有時為 0。
    /// 重複的職缺 id 以第一筆為準，與分組結果一致
    pub fn summarize(postings: &[Posting], applications: &[Application]) -> ReportSummary {
        let mut packages: HashMap<PostingId, Option<f64>> =
            HashMap::with_capacity(postings.len());
        for posting in postings {
            packages.entry(posting.id).or_insert_with(|| posting.package());
        }

        let selected: Vec<&Application> = applications
            .iter()
            .filter(|app| app.status == ApplicationStatus::Selected)
            .collect();

        let priced: Vec<f64> = selected
            .iter()
            .filter_map(|app| packages.get(&app.posting_id).copied().flatten())
            .collect();

        let avg_package = if priced.is_empty() {
            0.0
        } else {
            priced.iter().sum::<f64>() / priced.len() as f64
        };

        ReportSummary {
            total_postings: postings.len(),
            total_applications: applications.len(),
            selected: selected.len(),
            avg_package,
        }
    }

    pub fn summarize_student(applications: &[StudentApplication]) -> StudentReport {
        let count = |status: ApplicationStatus| {
            applications
                .iter()
                .filter(|app| app.status == status)
                .count()
        };

        StudentReport {
            total: applications.len(),
            shortlisted: count(ApplicationStatus::Shortlisted),
            selected: count(ApplicationStatus::Selected),
            rejected: count(ApplicationStatus::Rejected),
        }
    }
}
