use crate::domain::model::{AnalysisResult, IngestResult};
use crate::report::ChartFormat;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Names of the files directly under the storage root with the given
    /// extension (case-insensitive), sorted.
    fn list_files(
        &self,
        extension: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
    fn location(&self) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn data_dir(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn file_extension(&self) -> &str;
    fn peak_readings(&self) -> usize;
    fn trend_sample_size(&self) -> usize;
    fn summary_formats(&self) -> &[String];
    fn chart_format(&self) -> ChartFormat;
    fn chart_size(&self) -> (u32, u32);
    fn archive_filename(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<IngestResult>;
    async fn transform(&self, data: IngestResult) -> Result<AnalysisResult>;
    async fn load(&self, result: AnalysisResult) -> Result<String>;
}
