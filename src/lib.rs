pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{ArchiveArgs, CliConfig, Command};

pub use adapters::{
    astronomical_provider::{AstronomicalProvider, LunarDate},
    memory_provider::MemoryProvider,
    table_provider::TableProvider,
};
pub use config::{cli::LocalStorage, toml_config::TomlConfig, ArchiveSettings};
pub use crate::core::{archive::ArchivePipeline, engine::GanzhiEngine, runner::ArchiveRunner};
pub use domain::model::{
    Branch, CivilMoment, FourPillars, GanzhiResult, LunarRecord, Pillar, Status, Stem,
};
pub use domain::ports::LunarConversionProvider;
pub use utils::error::{GanzhiError, Result};
