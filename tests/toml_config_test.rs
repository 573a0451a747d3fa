use campus_energy_dashboard::core::ConfigProvider;
use campus_energy_dashboard::utils::validation::Validate;
use campus_energy_dashboard::{EnergyPipeline, EtlEngine, LocalStorage, TomlConfig};
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[tokio::test]
async fn test_toml_driven_run() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("meters");
    let output_dir = temp_dir.path().join("reports");
    fs::create_dir(&data_dir).unwrap();

    fs::write(
        data_dir.join("Hostel.csv"),
        "timestamp,kwh\n2024-03-04 08:00,10\n2024-03-05 08:00,12\n2024-03-11 08:00,20\n",
    )
    .unwrap();
    fs::write(
        data_dir.join("Canteen.csv"),
        "timestamp,kwh\n2024-03-04 12:00,5\n2024-03-06 12:00,not-a-number\n",
    )
    .unwrap();

    let toml_content = format!(
        r#"
[pipeline]
name = "campus-energy"
version = "1.0.0"

[input]
data_dir = "{}"

[analysis]
trend_sample_size = 2

[output]
output_dir = "{}"
summary_formats = ["json"]

[output.chart]
format = "svg"
width = 640
height = 480
"#,
        data_dir.display(),
        output_dir.display()
    );

    let mut config_file = NamedTempFile::new().unwrap();
    config_file.write_all(toml_content.as_bytes()).unwrap();

    let config = TomlConfig::from_file(config_file.path()).unwrap();
    assert!(config.validate().is_ok());

    let input = LocalStorage::new(config.data_dir());
    let output = LocalStorage::new(config.output_dir());
    let engine = EtlEngine::new(EnergyPipeline::new(input, output, config));
    engine.run().await.unwrap();

    assert!(output_dir.join("building_summary.json").exists());
    assert!(!output_dir.join("building_summary.csv").exists());
    assert!(output_dir.join("dashboard.svg").exists());

    let summary = fs::read_to_string(output_dir.join("summary.txt")).unwrap();
    assert!(summary.contains("Total Campus Consumption: 47.00 kWh"));
    assert!(summary.contains("Highest Consuming Building: Hostel"));
    assert!(summary.contains("Peak Load Time: 2024-03-11 08:00:00 (Hostel, 20.00 kWh)"));
    // 2024-03-04 is a Monday: two Sunday-ending weeks
    assert!(summary.contains("week ending 2024-03-10  27.00 kWh"));
    assert!(summary.contains("week ending 2024-03-17  20.00 kWh"));
    assert!(summary.contains("  2024-03-05  12.00 kWh"));
    assert!(!summary.contains("  2024-03-06  "));
}
