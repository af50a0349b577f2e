use crate::config::{Settings, TomlConfig};
use crate::domain::model::ApplicationStatus;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "placement-pipeline")]
#[command(about = "Review and triage placement applications from the command line")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Backend base URL (overrides the config file)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Officer bearer token (overrides the config file and PLACEMENT_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Per-request timeout; no timeout when unset
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show every posting with its Applied / Shortlisted / Rejected columns
    Pipeline,
    /// Show the officer summary panel
    Report,
    /// Show the report for the student owning the token
    StudentReport,
    /// Move a single application to a new status
    Transition {
        #[arg(long)]
        id: i64,
        #[arg(long, value_parser = parse_status)]
        status: ApplicationStatus,
    },
    /// Select applications in one column and move them together
    Bulk {
        #[arg(long)]
        posting: i64,
        #[arg(long, value_parser = parse_status)]
        from: ApplicationStatus,
        /// Applications to select; the whole column when omitted
        #[arg(long, value_delimiter = ',')]
        ids: Vec<i64>,
        #[arg(long, value_parser = parse_status)]
        status: ApplicationStatus,
    },
    /// Write the pipeline as CSV
    Export {
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn parse_status(raw: &str) -> std::result::Result<ApplicationStatus, String> {
    raw.parse()
}

impl CliConfig {
    /// 預設值 < 設定檔 < 命令列旗標；token 最後才看環境變數
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                Settings::from_file_config(&file)
            }
            None => Settings::default(),
        };

        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(token) = &self.token {
            settings.token = Some(token.clone());
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout_seconds = Some(timeout);
        }

        let settings = settings.with_env_token();
        settings.validate()?;
        Ok(settings)
    }
}
