pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, Command};

pub use adapters::ApiClient;
pub use config::{Settings, TomlConfig};
pub use core::{
    controller::{PipelineController, PipelineSnapshot, PipelineState, TransitionOutcome},
    pipeline_model::{ColumnKey, PipelineColumn, PipelineModel, PostingGroup},
    report::{ReportAggregator, ReportSummary, StudentReport},
    selection::SelectionTracker,
    transition::{TransitionClient, TransitionReceipt},
};
pub use domain::session::Session;
pub use utils::error::{PipelineError, Result};
