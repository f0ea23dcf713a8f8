use crate::adapters::memory_provider::MemoryProvider;
use crate::domain::model::{LunarRecord, Pillar};
use crate::domain::ports::LunarConversionProvider;
use crate::utils::error::{GanzhiError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const TERM_SEPARATOR: char = '|';

#[derive(Debug, Deserialize)]
struct TableRow {
    date: String,
    year: String,
    month: String,
    day: String,
    #[serde(default)]
    terms: String,
}

impl TableRow {
    fn into_record(self) -> Result<LunarRecord> {
        let mut record = LunarRecord::new(
            self.year.parse::<Pillar>()?,
            self.month.parse::<Pillar>()?,
            self.day.parse::<Pillar>()?,
        );
        for term in self
            .terms
            .split(TERM_SEPARATOR)
            .map(str::trim)
            .filter(|term| !term.is_empty())
        {
            record = record.with_term(term);
        }
        Ok(record)
    }
}

/// Lunar provider backed by a CSV calendar table.
///
/// Expected header: `date,year,month,day,terms`, with `date` as `YYYY-MM-DD`
/// and `terms` a `|`-separated list that may be empty.
#[derive(Debug, Clone)]
pub struct TableProvider {
    records: MemoryProvider,
}

impl TableProvider {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading calendar table from {}", path.display());
        let file = File::open(path)?;
        let provider = Self::from_reader(file)?;
        tracing::info!(
            "📅 Loaded {} calendar rows from {}",
            provider.records.len(),
            path.display()
        );
        Ok(provider)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader.headers()?.clone();

        let mut records = MemoryProvider::new();
        for row in reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            let parsed: TableRow = row.deserialize(Some(&headers))?;

            let date = NaiveDate::parse_from_str(&parsed.date, "%Y-%m-%d").map_err(|e| {
                GanzhiError::TableError {
                    line,
                    message: format!("invalid date {:?}: {}", parsed.date, e),
                }
            })?;
            let record = parsed.into_record().inspect_err(|e| {
                tracing::warn!("Calendar table line {}: {}", line, e);
            })?;

            if records.insert(date, record).is_some() {
                return Err(GanzhiError::TableError {
                    line,
                    message: format!("duplicate row for {}", date),
                });
            }
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn coverage(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.records.coverage()
    }
}

impl LunarConversionProvider for TableProvider {
    fn lookup(&self, year: i32, month: u32, day: u32) -> Result<LunarRecord> {
        self.records.lookup(year, month, day)
    }
}
