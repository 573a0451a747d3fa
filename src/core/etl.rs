use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting energy dashboard pipeline...");
        self.monitor.start();

        // Extract
        tracing::info!("Extracting meter data...");
        let ingested = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} reading(s) from {} file(s), {} file(s) skipped",
            ingested.readings.len(),
            ingested.loaded_files.len(),
            ingested.skipped_files.len()
        );
        self.monitor.finish_phase("Extract", ingested.readings.len());

        // Transform
        tracing::info!("Aggregating consumption...");
        let analysis = self.pipeline.transform(ingested).await?;
        tracing::info!(
            "Aggregated {} day(s) and {} week(s) across {} building(s)",
            analysis.daily_totals.len(),
            analysis.weekly_aggregates.len(),
            analysis.building_summaries.len()
        );
        self.monitor.finish_phase("Transform", analysis.readings.len());

        // Load
        tracing::info!("Writing dashboard and exports...");
        let written_rows = analysis.readings.len();
        let output_path = self.pipeline.load(analysis).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.finish_phase("Load", written_rows);
        self.monitor.log_summary();

        Ok(output_path)
    }
}
