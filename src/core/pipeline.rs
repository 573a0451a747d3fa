use crate::core::{aggregate, ingest, AnalysisResult, ConfigProvider, IngestResult, Pipeline, Storage};
use crate::report::{
    dashboard, export, CLEANED_DATA_FILE, SUMMARY_CSV_FILE, SUMMARY_JSON_FILE, SUMMARY_TEXT_FILE,
};
use crate::utils::error::{EtlError, Result};

/// Reads building files from `input`, writes every artifact to `output`.
pub struct EnergyPipeline<S: Storage, C: ConfigProvider> {
    input: S,
    output: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> EnergyPipeline<S, C> {
    pub fn new(input: S, output: S, config: C) -> Self {
        Self {
            input,
            output,
            config,
        }
    }

    fn render_artifacts(&self, result: &AnalysisResult) -> Result<Vec<(String, Vec<u8>)>> {
        let mut artifacts = vec![(
            CLEANED_DATA_FILE.to_string(),
            export::cleaned_data_csv(&result.readings)?,
        )];

        let mut formats: Vec<String> = self
            .config
            .summary_formats()
            .iter()
            .map(|f| f.trim().to_ascii_lowercase())
            .collect();
        formats.sort();
        formats.dedup();

        for format in &formats {
            match format.as_str() {
                "csv" => artifacts.push((
                    SUMMARY_CSV_FILE.to_string(),
                    export::building_summary_csv(&result.building_summaries)?,
                )),
                "json" => artifacts.push((
                    SUMMARY_JSON_FILE.to_string(),
                    export::building_summary_json(&result.building_summaries)?,
                )),
                other => tracing::warn!("Ignoring unsupported summary format: {}", other),
            }
        }

        artifacts.push((
            SUMMARY_TEXT_FILE.to_string(),
            export::summary_report(result, self.config.trend_sample_size()).into_bytes(),
        ));

        let chart_format = self.config.chart_format();
        tracing::debug!(
            "Rendering {} dashboard at {:?}",
            chart_format,
            self.config.chart_size()
        );
        artifacts.push((
            chart_format.file_name(),
            dashboard::render_dashboard(result, chart_format, self.config.chart_size())?,
        ));

        Ok(artifacts)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for EnergyPipeline<S, C> {
    async fn extract(&self) -> Result<IngestResult> {
        let extension = self.config.file_extension();
        tracing::debug!("Looking for .{} files in {}", extension, self.input.location());

        let files = self.input.list_files(extension).await?;
        if files.is_empty() {
            return Err(EtlError::NoValidInput {
                message: format!("no .{} files found in {}", extension, self.input.location()),
            });
        }

        ingest::load_all_building_data(&self.input, &files).await
    }

    async fn transform(&self, data: IngestResult) -> Result<AnalysisResult> {
        let result = aggregate::analyse(data, self.config.peak_readings());

        tracing::info!("Building Reports:");
        for report in &result.building_reports {
            tracing::info!("{}", report);
        }

        Ok(result)
    }

    async fn load(&self, result: AnalysisResult) -> Result<String> {
        let artifacts = self.render_artifacts(&result)?;

        for (name, data) in &artifacts {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.output.write_file(name, data).await?;
        }

        if let Some(archive) = self.config.archive_filename() {
            let bundle = export::bundle_archive(&artifacts)?;
            tracing::debug!("Writing archive {} ({} bytes)", archive, bundle.len());
            self.output.write_file(archive, &bundle).await?;
        }

        tracing::info!(
            "Exported {} file(s) to {}",
            artifacts.len(),
            self.output.location()
        );
        Ok(self.output.location())
    }
}
