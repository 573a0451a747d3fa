use anyhow::Context;
use campus_energy_dashboard::core::{ConfigProvider, Storage};
use campus_energy_dashboard::utils::{logger, validation::Validate};
use campus_energy_dashboard::{EnergyPipeline, EtlEngine, LocalStorage, TomlConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-dashboard")]
#[command(about = "Campus energy dashboard driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "dashboard.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the data folder from config
    #[arg(long)]
    data_dir: Option<String>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    let level = if args.verbose {
        logger::verbosity_level(true)
    } else {
        config.log_level().unwrap_or(logger::verbosity_level(false))
    };
    logger::init_cli_logger_at(level);

    tracing::info!("🚀 Starting TOML-based energy dashboard");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(data_dir) = args.data_dir.clone() {
        tracing::info!("🔧 Data folder overridden to: {}", data_dir);
        config.input.data_dir = data_dir;
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be written");
        perform_dry_run(&config).await?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let input = LocalStorage::new(config.data_dir());
    let output = LocalStorage::new(config.output_dir());
    let pipeline = EnergyPipeline::new(input, output, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Project completed successfully!");
            println!("✅ Dashboard and summary exported to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Pipeline failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    if let Some(description) = &config.pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  Data: {} (*.{})", config.data_dir(), config.file_extension());
    println!("  Output: {}", config.output_dir());
    println!("  Summary Formats: {}", config.summary_formats().join(", "));

    let (width, height) = config.chart_size();
    println!("  Dashboard: {} ({}x{})", config.chart_format(), width, height);
    println!("  Peak Readings: {}", config.peak_readings());

    if let Some(archive) = config.archive_filename() {
        println!("  Archive: {}", archive);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();

    let input = LocalStorage::new(config.data_dir());
    let files = input
        .list_files(config.file_extension())
        .await
        .with_context(|| format!("cannot list meter files in {}", config.data_dir()))?;

    println!("📡 Meter Files:");
    if files.is_empty() {
        println!("  ⚠️ No .{} files found", config.file_extension());
    }
    for file in &files {
        let size = input.read_file(file).await.map(|d| d.len()).unwrap_or(0);
        println!("  {} ({} bytes)", file, size);
    }

    println!();
    println!("💾 Files that would be written to {}:", config.output_dir());
    println!("  cleaned_energy_data.csv");
    for format in config.summary_formats() {
        println!("  building_summary.{}", format.to_ascii_lowercase());
    }
    println!("  summary.txt");
    println!("  {}", config.chart_format().file_name());
    if let Some(archive) = config.archive_filename() {
        println!("  {}", archive);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
