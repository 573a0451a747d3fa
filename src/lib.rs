pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;

pub use adapters::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use core::{etl::EtlEngine, pipeline::EnergyPipeline};
pub use utils::error::{EtlError, Result};
