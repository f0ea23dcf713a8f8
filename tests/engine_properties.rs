use chrono::{Datelike, NaiveDate};
use ganzhi_archive::{
    GanzhiEngine, GanzhiError, LunarConversionProvider, LunarRecord, Pillar, Result, Status,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Synthetic calendar: lunar years turn on February 10, Start-of-Spring is
/// reported on February 4, day pillars follow the Julian day number.
#[derive(Default)]
struct SyntheticProvider {
    lookups: AtomicUsize,
}

impl SyntheticProvider {
    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl LunarConversionProvider for SyntheticProvider {
    fn lookup(&self, year: i32, month: u32, day: u32) -> Result<LunarRecord> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| GanzhiError::provider_lookup(year, month, day, "bad date"))?;

        let lunar_year = if (month, day) < (2, 10) { year - 1 } else { year };
        let jdn = date.num_days_from_ce() as i64 + 1_721_425;

        let mut record = LunarRecord::new(
            Pillar::from_cycle_index((lunar_year - 4).rem_euclid(60) as usize),
            Pillar::from_cycle_index(month as usize * 2),
            Pillar::from_cycle_index(((jdn + 49) % 60) as usize),
        );
        if month == 2 && day == 4 {
            record = record.with_term("立春");
        }
        Ok(record)
    }
}

struct FailingProvider;

impl LunarConversionProvider for FailingProvider {
    fn lookup(&self, year: i32, month: u32, day: u32) -> Result<LunarRecord> {
        Err(GanzhiError::provider_lookup(year, month, day, "out of supported range"))
    }
}

fn days_of(year: i32) -> impl Iterator<Item = NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
    first.iter_days().take_while(move |d| d.year() == year)
}

#[test]
fn test_synthetic_provider_matches_known_day() {
    let record = SyntheticProvider::default().lookup(2024, 2, 5).unwrap();
    assert_eq!(record.day.to_string(), "己亥");
    assert_eq!(record.year.to_string(), "癸卯");
}

#[test]
fn test_march_through_december_keep_raw_year() {
    let engine = GanzhiEngine::new(SyntheticProvider::default());
    for date in days_of(2024).filter(|d| d.month() >= 3) {
        let raw = engine
            .provider()
            .lookup(date.year(), date.month(), date.day())
            .unwrap();
        let result = engine.compute_pillars(date.year(), date.month(), date.day(), 12, 0);
        assert_eq!(result.year, raw.year.to_string(), "{}", date);
    }
}

#[test]
fn test_start_of_spring_boundary_2024() {
    let engine = GanzhiEngine::new(SyntheticProvider::default());
    let anchor = engine.provider().lookup(2024, 7, 1).unwrap();

    let result = engine.compute_pillars(2024, 2, 5, 10, 0);
    assert_eq!(result.status, Status::Success);
    assert_eq!(result.year, anchor.year.to_string());
    assert_eq!(result.year, "甲辰");

    assert_eq!(engine.compute_pillars(2024, 2, 4, 10, 0).year, "甲辰");
    assert_eq!(engine.compute_pillars(2024, 2, 3, 10, 0).year, "癸卯");
    assert_eq!(engine.compute_pillars(2024, 1, 31, 10, 0).year, "癸卯");
}

#[test]
fn test_year_pillar_across_whole_january_and_february() {
    let engine = GanzhiEngine::new(SyntheticProvider::default());
    for date in days_of(2025).filter(|d| d.month() <= 2) {
        let result = engine.compute_pillars(date.year(), date.month(), date.day(), 8, 0);
        // the synthetic provider reports Start-of-Spring on February 4
        let expected = if (date.month(), date.day()) >= (2, 4) {
            "乙巳"
        } else {
            "甲辰"
        };
        assert_eq!(result.year, expected, "{}", date);
    }
}

#[test]
fn test_late_hour_takes_next_day_pillar() {
    let engine = GanzhiEngine::new(SyntheticProvider::default());
    for date in days_of(2024) {
        let next = date.succ_opt().unwrap();
        let raw_next = engine
            .provider()
            .lookup(next.year(), next.month(), next.day())
            .unwrap();
        let raw_today = engine
            .provider()
            .lookup(date.year(), date.month(), date.day())
            .unwrap();

        let result = engine.compute_pillars(date.year(), date.month(), date.day(), 23, 15);
        assert_eq!(result.day, raw_next.day.to_string(), "{}", date);
        assert_eq!(result.month, raw_today.month.to_string(), "{}", date);
        assert_eq!(result.hour.chars().nth(1), Some('子'));
    }
}

#[test]
fn test_hour_pillars_always_valid() {
    let engine = GanzhiEngine::new(SyntheticProvider::default());
    // ten consecutive days cover every day stem
    for day in 1..=10 {
        for hour in 0..24 {
            let result = engine.compute_pillars(2024, 5, day, hour, 0);
            let pillar: Pillar = result.hour.parse().unwrap();
            assert_eq!(pillar.stem().index() % 2, pillar.branch().index() % 2);
        }
    }
}

#[test]
fn test_identical_inputs_yield_identical_results() {
    let engine = GanzhiEngine::new(SyntheticProvider::default());
    let first = engine.compute_pillars(2024, 2, 5, 23, 0);
    let second = engine.compute_pillars(2024, 2, 5, 23, 0);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[test]
fn test_provider_failure_yields_sentinels() {
    let engine = GanzhiEngine::new(FailingProvider);
    for (year, month, day, hour) in [(2024, 2, 5, 10), (1900, 1, 1, 0), (2024, 12, 31, 23)] {
        let result = engine.compute_pillars(year, month, day, hour, 0);
        assert_eq!(result.status, Status::Error);
        for field in [&result.year, &result.month, &result.day, &result.hour] {
            assert_eq!(field, "Error");
        }
        assert!(result
            .message
            .as_deref()
            .unwrap()
            .contains("out of supported range"));
    }
}

#[test]
fn test_minute_never_changes_result() {
    let engine = GanzhiEngine::new(SyntheticProvider::default());
    for hour in [0, 10, 22, 23] {
        let baseline = engine.compute_pillars(2024, 2, 5, hour, 0);
        for minute in 1..60 {
            assert_eq!(engine.compute_pillars(2024, 2, 5, hour, minute), baseline);
        }
    }
}

#[test]
fn test_at_most_three_lookups_per_call() {
    for (month, day, hour) in [(2, 5, 23), (1, 15, 23), (6, 1, 10), (2, 2, 0)] {
        let engine = GanzhiEngine::new(SyntheticProvider::default());
        engine.compute_pillars(2024, month, day, hour, 0);
        assert!(engine.provider().lookups() <= 3);
    }
}

#[test]
fn test_concurrent_callers_agree() {
    let engine = Arc::new(GanzhiEngine::new(SyntheticProvider::default()));
    let expected = engine.compute_pillars(2024, 2, 5, 23, 0);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let engine = Arc::clone(&engine);
            let expected = expected.clone();
            scope.spawn(move || {
                for _ in 0..100 {
                    assert_eq!(engine.compute_pillars(2024, 2, 5, 23, 0), expected);
                }
            });
        }
    });
}
