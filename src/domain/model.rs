use crate::utils::error::{GanzhiError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Heavenly stems, in cycle order.
pub const STEMS: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];

/// Earthly branches, in cycle order.
pub const BRANCHES: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];

/// Names under which a provider may report the Start-of-Spring solar term.
pub const START_OF_SPRING_NAMES: [&str; 2] = ["立春", "Start-of-Spring"];

/// Value placed in every pillar field of a failed result.
pub const ERROR_SENTINEL: &str = "Error";

/// Placeholder used when a signal file holds no usable item.
pub const NO_SIGNAL_ITEMS: &str = "未发现有效条目";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Stem(u8);

impl Stem {
    pub fn from_index(index: usize) -> Result<Self> {
        if index < STEMS.len() {
            Ok(Self(index as u8))
        } else {
            Err(GanzhiError::SymbolLookup {
                kind: "stem",
                symbol: format!("#{}", index),
            })
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn symbol(self) -> &'static str {
        STEMS[self.index()]
    }
}

impl FromStr for Stem {
    type Err = GanzhiError;

    fn from_str(s: &str) -> Result<Self> {
        STEMS
            .iter()
            .position(|&symbol| symbol == s)
            .map(|index| Self(index as u8))
            .ok_or_else(|| GanzhiError::SymbolLookup {
                kind: "stem",
                symbol: s.to_string(),
            })
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Branch(u8);

impl Branch {
    pub fn from_index(index: usize) -> Result<Self> {
        if index < BRANCHES.len() {
            Ok(Self(index as u8))
        } else {
            Err(GanzhiError::SymbolLookup {
                kind: "branch",
                symbol: format!("#{}", index),
            })
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn symbol(self) -> &'static str {
        BRANCHES[self.index()]
    }
}

impl FromStr for Branch {
    type Err = GanzhiError;

    fn from_str(s: &str) -> Result<Self> {
        BRANCHES
            .iter()
            .position(|&symbol| symbol == s)
            .map(|index| Self(index as u8))
            .ok_or_else(|| GanzhiError::SymbolLookup {
                kind: "branch",
                symbol: s.to_string(),
            })
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A stem-branch pair belonging to the sixty-term cycle.
///
/// Only pairs whose stem and branch indices share parity exist; every
/// constructor enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pillar {
    stem: Stem,
    branch: Branch,
}

impl Pillar {
    pub fn new(stem: Stem, branch: Branch) -> Result<Self> {
        if stem.index() % 2 != branch.index() % 2 {
            return Err(GanzhiError::InvalidPillar {
                stem: stem.to_string(),
                branch: branch.to_string(),
            });
        }
        Ok(Self { stem, branch })
    }

    /// Pillar at position `index` of the cycle, 0 being 甲子. Wraps modulo 60.
    pub fn from_cycle_index(index: usize) -> Self {
        let index = index % 60;
        Self {
            stem: Stem((index % 10) as u8),
            branch: Branch((index % 12) as u8),
        }
    }

    pub fn cycle_index(self) -> usize {
        (6 * self.stem.index() + 60 - 5 * self.branch.index()) % 60
    }

    pub fn stem(self) -> Stem {
        self.stem
    }

    pub fn branch(self) -> Branch {
        self.branch
    }
}

impl FromStr for Pillar {
    type Err = GanzhiError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(stem), Some(branch), None) => {
                let stem: Stem = stem.to_string().parse()?;
                let branch: Branch = branch.to_string().parse()?;
                Self::new(stem, branch)
            }
            _ => Err(GanzhiError::SymbolLookup {
                kind: "pillar",
                symbol: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

impl Serialize for Pillar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pillar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// A validated Gregorian date with a clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CivilMoment {
    date: NaiveDate,
    hour: u32,
    minute: u32,
}

impl CivilMoment {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Result<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            GanzhiError::InvalidMoment {
                message: format!("{:04}-{:02}-{:02} is not a Gregorian date", year, month, day),
            }
        })?;
        if hour > 23 {
            return Err(GanzhiError::InvalidMoment {
                message: format!("hour {} is outside 0-23", hour),
            });
        }
        if minute > 59 {
            return Err(GanzhiError::InvalidMoment {
                message: format!("minute {} is outside 0-59", minute),
            });
        }
        Ok(Self { date, hour, minute })
    }

    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self {
            date: datetime.date(),
            hour: datetime.hour(),
            minute: datetime.minute(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }
}

impl fmt::Display for CivilMoment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}",
            self.date.format("%Y-%m-%d"),
            self.hour,
            self.minute
        )
    }
}

/// Raw answer of a lunar provider for one Gregorian date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunarRecord {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub solar_terms: BTreeSet<String>,
}

impl LunarRecord {
    pub fn new(year: Pillar, month: Pillar, day: Pillar) -> Self {
        Self {
            year,
            month,
            day,
            solar_terms: BTreeSet::new(),
        }
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.solar_terms.insert(term.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FourPillars {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Pillar,
}

impl fmt::Display for FourPillars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.year, self.month, self.day, self.hour)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Value-shaped outcome of one conversion. Failures carry the
/// [`ERROR_SENTINEL`] in every pillar field and never a partial answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanzhiResult {
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GanzhiResult {
    pub fn success(pillars: &FourPillars) -> Self {
        Self {
            year: pillars.year.to_string(),
            month: pillars.month.to_string(),
            day: pillars.day.to_string(),
            hour: pillars.hour.to_string(),
            status: Status::Success,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            year: ERROR_SENTINEL.to_string(),
            month: ERROR_SENTINEL.to_string(),
            day: ERROR_SENTINEL.to_string(),
            hour: ERROR_SENTINEL.to_string(),
            status: Status::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// `"<year> <month> <day> <hour>"`, as written to the history log.
    pub fn coordinate(&self) -> String {
        format!("{} {} {} {}", self.year, self.month, self.day, self.hour)
    }
}

impl From<Result<FourPillars>> for GanzhiResult {
    fn from(result: Result<FourPillars>) -> Self {
        match result {
            Ok(pillars) => Self::success(&pillars),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

/// Items extracted from one signal file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub source: String,
    pub items: Vec<String>,
}

impl Signal {
    pub fn primary(&self) -> &str {
        self.items
            .first()
            .map(String::as_str)
            .unwrap_or(NO_SIGNAL_ITEMS)
    }

    pub fn full_text(&self) -> String {
        if self.items.is_empty() {
            NO_SIGNAL_ITEMS.to_string()
        } else {
            self.items.join("\n")
        }
    }
}

/// One row of the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    #[serde(rename = "实际时间")]
    pub recorded_at: String,
    #[serde(rename = "干支时空坐标")]
    pub coordinate: String,
    #[serde(rename = "首条新闻摘要")]
    pub summary: String,
}

#[derive(Debug, Clone, Default)]
pub struct ArchiveBatch {
    pub entries: Vec<HistoryEntry>,
    pub prompt: Option<String>,
    /// Signal file names consumed by this batch
    pub sources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pillar_parse_and_display() {
        let pillar: Pillar = "甲辰".parse().unwrap();
        assert_eq!(pillar.stem().index(), 0);
        assert_eq!(pillar.branch().index(), 4);
        assert_eq!(pillar.to_string(), "甲辰");
    }

    #[test]
    fn test_pillar_rejects_mismatched_parity() {
        let err = "甲丑".parse::<Pillar>().unwrap_err();
        assert!(matches!(err, GanzhiError::InvalidPillar { .. }));
    }

    #[test]
    fn test_pillar_rejects_unknown_symbols() {
        for text in ["", "甲", "甲子子", "X子", "甲Y"] {
            let err = text.parse::<Pillar>().unwrap_err();
            assert!(
                matches!(err, GanzhiError::SymbolLookup { .. }),
                "{:?} -> {:?}",
                text,
                err
            );
        }
    }

    #[test]
    fn test_cycle_index_round_trip_covers_all_sixty() {
        let mut seen = std::collections::HashSet::new();
        for index in 0..60 {
            let pillar = Pillar::from_cycle_index(index);
            assert_eq!(pillar.cycle_index(), index);
            assert_eq!(pillar.stem().index() % 2, pillar.branch().index() % 2);
            seen.insert(pillar);
        }
        assert_eq!(seen.len(), 60);
        assert_eq!(Pillar::from_cycle_index(0).to_string(), "甲子");
        assert_eq!(Pillar::from_cycle_index(59).to_string(), "癸亥");
        assert_eq!(Pillar::from_cycle_index(40).to_string(), "甲辰");
    }

    #[test]
    fn test_index_lookup_out_of_range() {
        assert!(Stem::from_index(10).is_err());
        assert!(Branch::from_index(12).is_err());
        assert_eq!(Stem::from_index(9).unwrap().symbol(), "癸");
        assert_eq!(Branch::from_index(11).unwrap().symbol(), "亥");
    }

    #[test]
    fn test_civil_moment_validation() {
        assert!(CivilMoment::new(2024, 2, 29, 23, 59).is_ok());
        assert!(CivilMoment::new(2023, 2, 29, 0, 0).is_err());
        assert!(CivilMoment::new(2024, 13, 1, 0, 0).is_err());
        assert!(CivilMoment::new(2024, 1, 1, 24, 0).is_err());
        assert!(CivilMoment::new(2024, 1, 1, 0, 60).is_err());
    }

    #[test]
    fn test_civil_moment_from_datetime_drops_seconds() {
        let datetime = NaiveDate::from_ymd_opt(2024, 2, 5)
            .unwrap()
            .and_hms_opt(23, 10, 45)
            .unwrap();
        let moment = CivilMoment::from_datetime(datetime);
        assert_eq!(moment, CivilMoment::new(2024, 2, 5, 23, 10).unwrap());
        assert_eq!(moment.to_string(), "2024-02-05 23:10");
    }

    #[test]
    fn test_error_result_uses_sentinel() {
        let result = GanzhiResult::error("boom");
        assert_eq!(result.coordinate(), "Error Error Error Error");
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_result_json_shape() {
        let pillars = FourPillars {
            year: "甲辰".parse().unwrap(),
            month: "丙寅".parse().unwrap(),
            day: "己亥".parse().unwrap(),
            hour: "己巳".parse().unwrap(),
        };
        let json = serde_json::to_value(GanzhiResult::success(&pillars)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "year": "甲辰",
                "month": "丙寅",
                "day": "己亥",
                "hour": "己巳",
                "status": "success"
            })
        );
    }

    #[test]
    fn test_signal_placeholder() {
        let signal = Signal {
            source: "wiki_zh_2024-02-05_10-00.txt".to_string(),
            items: vec![],
        };
        assert_eq!(signal.primary(), NO_SIGNAL_ITEMS);
        assert_eq!(signal.full_text(), NO_SIGNAL_ITEMS);
    }
}
