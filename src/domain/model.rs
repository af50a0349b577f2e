use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub i64);

impl fmt::Display for PostingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 申請狀態（封閉列舉），後端以原樣字串傳輸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    Rejected,
    Selected,
}

impl ApplicationStatus {
    pub const fn all() -> [Self; 4] {
        [Self::Applied, Self::Shortlisted, Self::Rejected, Self::Selected]
    }

    /// Pipeline 上實際顯示的欄位順序；Selected 已離開篩選流程，不顯示
    pub const fn pipeline_columns() -> [Self; 3] {
        [Self::Applied, Self::Shortlisted, Self::Rejected]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::Shortlisted => "Shortlisted",
            Self::Rejected => "Rejected",
            Self::Selected => "Selected",
        }
    }

    /// 唯一的狀態轉換表：動作可用性與控制器的資格檢查都查這裡
    pub const fn allowed_transitions(self) -> &'static [ApplicationStatus] {
        match self {
            Self::Applied => &[Self::Shortlisted, Self::Rejected],
            Self::Shortlisted => &[Self::Rejected],
            Self::Rejected | Self::Selected => &[],
        }
    }

    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown status '{}', expected one of: Applied, Shortlisted, Rejected, Selected",
                    s
                )
            })
    }
}

/// 後端的 DECIMAL 欄位可能序列化成數字，也可能是字串
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Numeric(pub serde_json::Value);

impl Numeric {
    pub fn as_f64(&self) -> Option<f64> {
        let value = match &self.0 {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|value| value.is_finite())
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Self(serde_json::json!(value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    #[serde(rename = "job_id")]
    pub id: PostingId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub branch_eligibility: Option<String>,
    #[serde(default)]
    pub min_cgpa: Option<Numeric>,
    #[serde(default)]
    pub package_stipend: Option<Numeric>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Posting {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id: PostingId(id),
            title: title.into(),
            description: None,
            branch_eligibility: None,
            min_cgpa: None,
            package_stipend: None,
            deadline: None,
            created_at: None,
        }
    }

    pub fn with_package(mut self, package: f64) -> Self {
        self.package_stipend = Some(Numeric::from(package));
        self
    }

    pub fn package(&self) -> Option<f64> {
        self.package_stipend.as_ref().and_then(Numeric::as_f64)
    }

    pub fn min_cgpa(&self) -> Option<f64> {
        self.min_cgpa.as_ref().and_then(Numeric::as_f64)
    }

    pub fn deadline_date(&self) -> Option<NaiveDate> {
        self.deadline
            .as_deref()
            .and_then(parse_timestamp)
            .map(|ts| ts.date_naive())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(rename = "application_id")]
    pub id: ApplicationId,
    #[serde(rename = "job_id")]
    pub posting_id: PostingId,
    pub student_name: String,
    #[serde(default)]
    pub job_title: Option<String>,
    pub status: ApplicationStatus,
    #[serde(default, deserialize_with = "lenient_string")]
    pub applied_on: Option<String>,
}

impl Application {
    pub fn new(
        id: i64,
        posting_id: i64,
        student_name: impl Into<String>,
        status: ApplicationStatus,
    ) -> Self {
        Self {
            id: ApplicationId(id),
            posting_id: PostingId(posting_id),
            student_name: student_name.into(),
            job_title: None,
            status,
            applied_on: None,
        }
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.applied_on.as_deref().and_then(parse_timestamp)
    }
}

/// 學生端的申請列表（/api/student/applications）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentApplication {
    #[serde(rename = "application_id")]
    pub id: ApplicationId,
    pub title: String,
    pub status: ApplicationStatus,
    #[serde(default, deserialize_with = "lenient_string")]
    pub applied_on: Option<String>,
}

/// 後端回傳的 {message} 或 {error}
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// 解析後端的時間格式：RFC 2822（Flask 預設）、RFC 3339、或 MySQL 風格
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}
