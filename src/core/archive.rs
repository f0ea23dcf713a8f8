use crate::core::engine::GanzhiEngine;
use crate::core::{ArchiveBatch, ConfigProvider, HistoryEntry, Pipeline, Signal, Storage};
use crate::domain::model::{CivilMoment, GanzhiResult};
use crate::domain::ports::LunarConversionProvider;
use crate::utils::error::{GanzhiError, Result};
use chrono::{Local, NaiveDateTime};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads signal files, stamps them with the pillars of the archive moment,
/// appends them to the history log and refreshes the prompt file.
pub struct ArchivePipeline<S: Storage, C: ConfigProvider, P: LunarConversionProvider> {
    storage: S,
    config: C,
    engine: GanzhiEngine<P>,
    moment: Option<NaiveDateTime>,
}

impl<S: Storage, C: ConfigProvider, P: LunarConversionProvider> ArchivePipeline<S, C, P> {
    pub fn new(storage: S, config: C, engine: GanzhiEngine<P>) -> Self {
        Self {
            storage,
            config,
            engine,
            moment: None,
        }
    }

    /// Archive at a fixed moment instead of the local wall clock.
    pub fn with_moment(mut self, moment: NaiveDateTime) -> Self {
        self.moment = Some(moment);
        self
    }

    fn archive_moment(&self) -> NaiveDateTime {
        self.moment
            .unwrap_or_else(|| Local::now().naive_local())
    }

    async fn read_signal(&self, name: &str) -> Result<String> {
        let path = Path::new(self.config.signal_dir()).join(name);
        let bytes = self.storage.read_file(&path.to_string_lossy()).await?;
        String::from_utf8(bytes).map_err(|e| GanzhiError::ProcessingError {
            message: format!("{} is not valid UTF-8: {}", name, e),
        })
    }
}

pub fn is_signal_file(file_name: &str, prefix: &str) -> bool {
    file_name.starts_with(prefix)
}

/// Drops the header lines and keeps trimmed lines longer than `min_item_chars`.
pub fn parse_signal(source: &str, text: &str, header_lines: usize, min_item_chars: usize) -> Signal {
    let items = text
        .lines()
        .skip(header_lines)
        .map(str::trim)
        .filter(|line| line.chars().count() > min_item_chars)
        .map(String::from)
        .collect();

    Signal {
        source: source.to_string(),
        items,
    }
}

pub fn render_prompt(result: &GanzhiResult, full_text: &str) -> String {
    format!(
        "你现在是 Zen-AI 时空解析助手。\n\
         当前时空坐标：{}年 {}月 {}日 {}时\n\
         捕获世界信号详情：\n\
         {}\n\
         \n\
         请基于阴阳五行逻辑，解读这些信号在此时空坐标下的深层含义，并给出预测倾向。",
        result.year, result.month, result.day, result.hour, full_text
    )
}

fn history_csv(entries: &[HistoryEntry], with_header: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer
        .into_inner()
        .map_err(|e| GanzhiError::IoError(e.into_error()))
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, P: LunarConversionProvider> Pipeline
    for ArchivePipeline<S, C, P>
{
    /// Signal files still in the signal directory. An empty directory is not
    /// an error; files that cannot be read are skipped unless none can be.
    async fn extract(&self) -> Result<Vec<Signal>> {
        let dir = self.config.signal_dir();
        let prefix = self.config.signal_prefix();

        let names: Vec<String> = self
            .storage
            .list_files(dir)
            .await?
            .into_iter()
            .filter(|name| is_signal_file(name, prefix))
            .collect();

        tracing::debug!("Found {} signal files in {}", names.len(), dir);

        if names.is_empty() {
            tracing::info!("No new files starting with {:?} in {}", prefix, dir);
            return Ok(Vec::new());
        }

        let mut signals = Vec::with_capacity(names.len());
        for name in &names {
            let text = match self.read_signal(name).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("⚠️ Skipping signal {}: {}", name, e);
                    continue;
                }
            };

            let signal = parse_signal(
                name,
                &text,
                self.config.header_lines(),
                self.config.min_item_chars(),
            );
            tracing::info!("📡 Signal {}: {} items", signal.source, signal.items.len());
            signals.push(signal);
        }

        if signals.is_empty() {
            return Err(GanzhiError::ProcessingError {
                message: format!(
                    "none of the {} signal files in {} could be read",
                    names.len(),
                    dir
                ),
            });
        }

        Ok(signals)
    }

    async fn transform(&self, signals: Vec<Signal>) -> Result<ArchiveBatch> {
        let moment = CivilMoment::from_datetime(self.archive_moment());
        let recorded_at = moment.to_string();
        let mut batch = ArchiveBatch::default();

        for signal in signals {
            let result = self.engine.compute_at(&moment);
            if !result.is_success() {
                tracing::warn!(
                    "⚠️ Archiving {} with failed coordinate: {}",
                    signal.source,
                    result.message.as_deref().unwrap_or_default()
                );
            }

            batch.entries.push(HistoryEntry {
                recorded_at: recorded_at.clone(),
                coordinate: result.coordinate(),
                summary: signal.primary().to_string(),
            });
            batch.prompt = Some(render_prompt(&result, &signal.full_text()));
            batch.sources.push(signal.source);
        }

        Ok(batch)
    }

    async fn load(&self, batch: ArchiveBatch) -> Result<String> {
        let history = self.config.history_file();
        if batch.entries.is_empty() {
            tracing::debug!("Nothing to archive, {} left untouched", history);
            return Ok(history.to_string());
        }

        if self.storage.exists(history).await? {
            let rows = history_csv(&batch.entries, false)?;
            self.storage.append_file(history, &rows).await?;
        } else {
            let mut data = UTF8_BOM.to_vec();
            data.extend(history_csv(&batch.entries, true)?);
            self.storage.write_file(history, &data).await?;
        }

        for entry in &batch.entries {
            let preview: String = entry.summary.chars().take(20).collect();
            tracing::info!("📝 Archived {} (first item: {}...)", entry.coordinate, preview);
        }

        if let Some(prompt) = &batch.prompt {
            let prompt_file = self.config.prompt_file();
            self.storage.write_file(prompt_file, prompt.as_bytes()).await?;
            tracing::info!("🤖 Prompt written to {}", prompt_file);
        }

        let dir = Path::new(self.config.signal_dir());
        let processed = dir.join(self.config.processed_dir());
        for source in &batch.sources {
            let from = dir.join(source);
            let to = processed.join(source);
            self.storage
                .rename_file(&from.to_string_lossy(), &to.to_string_lossy())
                .await?;
            tracing::debug!("Moved {} to {}", from.display(), to.display());
        }

        Ok(history.to_string())
    }
}
