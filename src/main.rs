use clap::Parser;
use placement_pipeline::core::export;
use placement_pipeline::domain::model::{ApplicationId, PostingId};
use placement_pipeline::domain::ports::{PipelineSource, StatusBackend, StudentSource};
use placement_pipeline::utils::error::ErrorSeverity;
use placement_pipeline::utils::logger;
use placement_pipeline::utils::validation::validate_path;
use placement_pipeline::{
    ApiClient, CliConfig, ColumnKey, Command, PipelineController, PipelineError, PipelineSnapshot,
    ReportAggregator, ReportSummary, Result, Settings, StudentReport,
};

const DEFAULT_EXPORT_PATH: &str = "./pipeline.csv";

// UI 模型是單執行緒事件迴圈，這裡用 current_thread runtime 對應
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting placement-pipeline CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config.command);
    }

    let settings = match config.resolve() {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };

    if let Err(e) = run(&config.command, &settings).await {
        fail(&e);
    }

    Ok(())
}

fn fail(e: &PipelineError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 1,      // 操作被拒絕
        ErrorSeverity::Medium => 2,   // 可重試
        ErrorSeverity::High => 1,     // 設定或輸入錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    };
    std::process::exit(exit_code)
}

async fn run(command: &Command, settings: &Settings) -> Result<()> {
    let session = settings.session()?;

    match command {
        Command::StudentReport => {
            let api = ApiClient::with_timeout(session, settings.timeout())?;
            let applications = api.fetch_student_applications().await?;
            print_student_report(&ReportAggregator::summarize_student(&applications));
            return Ok(());
        }
        Command::Pipeline
        | Command::Report
        | Command::Transition { .. }
        | Command::Bulk { .. }
        | Command::Export { .. } => {}
    }

    let mut controller = PipelineController::connect(session, settings.timeout())?;
    let snapshot = controller.activate().await?;
    if let Some(issue) = snapshot.model.input_error() {
        eprintln!("⚠️ {}", issue.user_friendly_message());
    }

    match command {
        Command::Pipeline => print_pipeline(controller.snapshot()?),
        Command::Report => print_summary(&controller.snapshot()?.summary),
        Command::Transition { id, status } => {
            let outcome = controller
                .transition_one(ApplicationId(*id), *status)
                .await?;
            println!("✅ {}", outcome.receipt.message);
            report_reload(&controller, outcome.reloaded)?;
        }
        Command::Bulk {
            posting,
            from,
            ids,
            status,
        } => {
            let key = ColumnKey::new(PostingId(*posting), *from);
            if ids.is_empty() {
                controller.select_all(key, true)?;
            } else {
                for id in ids {
                    controller.set_selected(key, ApplicationId(*id), true)?;
                }
            }
            tracing::info!(
                "☑️ {} selected in {} (all selected: {})",
                controller.selected(key)?.len(),
                key,
                controller.is_all_selected(key)?
            );
            let outcome = controller.transition_selected(key, *status).await?;
            println!("✅ {}", outcome.receipt.message);
            report_reload(&controller, outcome.reloaded)?;
        }
        Command::Export { output } => {
            let path = output
                .as_deref()
                .or(settings.export_path.as_deref())
                .unwrap_or(DEFAULT_EXPORT_PATH);
            validate_path("output", path)?;
            export::write_csv(&controller.snapshot()?.model, path)?;
            println!("📁 Output saved to: {}", path);
        }
        Command::StudentReport => {}
    }

    Ok(())
}

fn report_reload<S, B>(controller: &PipelineController<S, B>, reloaded: bool) -> Result<()>
where
    S: PipelineSource,
    B: StatusBackend,
{
    if reloaded {
        print_pipeline(controller.snapshot()?);
        Ok(())
    } else {
        Err(PipelineError::fetch_failed(
            "pipeline",
            "status changed but the pipeline could not be reloaded",
        ))
    }
}

fn print_pipeline(snapshot: &PipelineSnapshot) {
    if snapshot.model.groups.is_empty() {
        println!("No job postings available.");
        return;
    }

    for group in &snapshot.model.groups {
        println!("== {} (job {}) ==", group.posting.title, group.posting.id);
        for column in group.columns() {
            let actions: Vec<&str> = column
                .available_actions()
                .iter()
                .map(|status| status.label())
                .collect();
            println!(
                "  {} ({}) actions: [{}]",
                column.status(),
                column.len(),
                actions.join(", ")
            );
            if column.is_empty() {
                println!("    No applications");
            }
            for app in &column.applications {
                let applied = app
                    .submitted_at()
                    .map(|ts| ts.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("    #{} {} (applied {})", app.id, app.student_name, applied);
            }
        }
        println!("  Selected: {}", group.selected().len());
    }
    println!();
    print_summary(&snapshot.summary);
}

fn print_summary(summary: &ReportSummary) {
    println!("Total postings:      {}", summary.total_postings);
    println!("Total applications:  {}", summary.total_applications);
    println!("Selected students:   {}", summary.selected);
    println!("Average package:     {}", summary.avg_package_display());
}

fn print_student_report(report: &StudentReport) {
    println!("Total applications:  {}", report.total);
    println!("Shortlisted:         {}", report.shortlisted);
    println!("Selected:            {}", report.selected);
    println!("Rejected:            {}", report.rejected);
}
