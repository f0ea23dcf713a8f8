use crate::domain::model::LunarRecord;
use crate::domain::ports::LunarConversionProvider;
use crate::utils::error::{GanzhiError, Result};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Lunar provider answering from records held in memory.
///
/// Dates without a record fail the lookup, which makes it a convenient way
/// to pin a provider to a known window of the calendar.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    records: HashMap<NaiveDate, LunarRecord>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemoryProvider::insert`]. Invalid dates are ignored.
    pub fn with_record(mut self, year: i32, month: u32, day: u32, record: LunarRecord) -> Self {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            self.insert(date, record);
        }
        self
    }

    pub fn insert(&mut self, date: NaiveDate, record: LunarRecord) -> Option<LunarRecord> {
        self.records.insert(date, record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest dates with a record.
    pub fn coverage(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.keys().min()?;
        let last = self.records.keys().max()?;
        Some((*first, *last))
    }
}

impl LunarConversionProvider for MemoryProvider {
    fn lookup(&self, year: i32, month: u32, day: u32) -> Result<LunarRecord> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| GanzhiError::provider_lookup(year, month, day, "not a Gregorian date"))?;
        self.records
            .get(&date)
            .cloned()
            .ok_or_else(|| GanzhiError::provider_lookup(year, month, day, "date not covered"))
    }
}
