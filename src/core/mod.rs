pub mod aggregate;
pub mod etl;
pub mod ingest;
pub mod pipeline;

pub use crate::domain::model::{AnalysisResult, IngestResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
