pub mod archive;
pub mod boundary;
pub mod engine;
pub mod hour;
pub mod runner;

pub use crate::domain::model::{ArchiveBatch, HistoryEntry, Signal};
pub use crate::domain::ports::{ConfigProvider, LunarConversionProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
