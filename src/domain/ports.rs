use crate::domain::model::{ArchiveBatch, LunarRecord, Signal};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of raw lunar-calendar records for Gregorian dates.
///
/// Implementations must answer or fail within the call; the engine keeps no
/// state between lookups and may call from several threads at once.
pub trait LunarConversionProvider: Send + Sync {
    fn lookup(&self, year: i32, month: u32, day: u32) -> Result<LunarRecord>;
}

impl<P: LunarConversionProvider + ?Sized> LunarConversionProvider for &P {
    fn lookup(&self, year: i32, month: u32, day: u32) -> Result<LunarRecord> {
        (**self).lookup(year, month, day)
    }
}

impl<P: LunarConversionProvider + ?Sized> LunarConversionProvider for Box<P> {
    fn lookup(&self, year: i32, month: u32, day: u32) -> Result<LunarRecord> {
        (**self).lookup(year, month, day)
    }
}

impl<P: LunarConversionProvider + ?Sized> LunarConversionProvider for Arc<P> {
    fn lookup(&self, year: i32, month: u32, day: u32) -> Result<LunarRecord> {
        (**self).lookup(year, month, day)
    }
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn append_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
    /// Moves `from` to `to`, creating the parent of `to` when missing.
    fn rename_file(
        &self,
        from: &str,
        to: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// File names (not paths) directly under `dir`, sorted.
    fn list_files(&self, dir: &str)
        -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn signal_dir(&self) -> &str;
    fn history_file(&self) -> &str;
    fn prompt_file(&self) -> &str;
    fn signal_prefix(&self) -> &str;
    fn header_lines(&self) -> usize;
    fn min_item_chars(&self) -> usize;
    /// Directory under the signal directory receiving archived signal files
    fn processed_dir(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Signal>>;
    async fn transform(&self, signals: Vec<Signal>) -> Result<ArchiveBatch>;
    async fn load(&self, batch: ArchiveBatch) -> Result<String>;
}
