use crate::core::pipeline_model::PipelineModel;
use crate::domain::model::ApplicationStatus;
use crate::utils::error::{PipelineError, Result};
use std::path::Path;

/// 把 Pipeline 攤平成 CSV：每筆申請一列，含已錄取
pub fn to_csv(model: &PipelineModel) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "job_id",
        "posting_title",
        "status",
        "application_id",
        "student_name",
        "applied_on",
    ])?;

    for group in &model.groups {
        for status in ApplicationStatus::all() {
            for app in group.members(status) {
                let applied_on = app
                    .submitted_at()
                    .map(|ts| ts.format("%Y-%m-%d").to_string())
                    .or_else(|| app.applied_on.clone())
                    .unwrap_or_default();
                writer.write_record([
                    group.posting.id.to_string(),
                    group.posting.title.clone(),
                    status.label().to_string(),
                    app.id.to_string(),
                    app.student_name.clone(),
                    applied_on,
                ])?;
            }
        }
    }

    let bytes = writer.into_inner().map_err(|e| PipelineError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| PipelineError::InvalidInput {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

pub fn write_csv<P: AsRef<Path>>(model: &PipelineModel, path: P) -> Result<()> {
    let content = to_csv(model)?;
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&path, content)?;
    tracing::info!("📁 Pipeline exported to: {}", path.as_ref().display());
    Ok(())
}
