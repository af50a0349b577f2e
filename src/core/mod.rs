pub mod controller;
pub mod export;
pub mod pipeline_model;
pub mod report;
pub mod selection;
pub mod transition;

pub use crate::domain::model::{Application, ApplicationId, ApplicationStatus, Posting, PostingId};
pub use crate::domain::ports::{PipelineSource, StatusBackend, StudentSource};
pub use crate::utils::error::Result;
