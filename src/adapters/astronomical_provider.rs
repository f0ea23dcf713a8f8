use crate::adapters::ephemeris::{
    day_number, longitude_crossed, lunation_on_or_before, new_moon_day, winter_solstice_day,
};
use crate::domain::model::{LunarRecord, Pillar};
use crate::domain::ports::LunarConversionProvider;
use crate::utils::error::{GanzhiError, Result};
use chrono::NaiveDate;
use std::ops::RangeInclusive;

/// Gregorian years the ephemeris is trusted for.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1901..=2099;

/// Solar terms by solar longitude / 15°, starting at the March equinox.
const SOLAR_TERMS: [&str; 24] = [
    "春分", "清明", "谷雨", "立夏", "小满", "芒种", "夏至", "小暑", "大暑", "立秋", "处暑", "白露",
    "秋分", "寒露", "霜降", "立冬", "小雪", "大雪", "冬至", "小寒", "大寒", "立春", "雨水", "惊蛰",
];

/// Cycle index of the first month of lunar year 1900 (戊寅).
const MONTH_CYCLE_EPOCH: i64 = 14;

/// A date in the Chinese lunisolar calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LunarDate {
    /// Lunar year, changing on the first day of the first month
    pub year: i32,
    pub month: u32,
    pub leap: bool,
    pub day: u32,
}

#[derive(Debug, Clone, Copy)]
struct LunarMonth {
    start: i64,
    number: u32,
    leap: bool,
}

/// Lunar months from the 11th month containing the December solstice of
/// `sui - 1` up to and including the 11th month of `sui`.
///
/// Between two solstices with thirteen new moons, the first month without a
/// principal term (a multiple of 30° of solar longitude) is the leap month.
fn months_of_sui(sui: i32) -> Vec<LunarMonth> {
    let first = lunation_on_or_before(winter_solstice_day(sui - 1));
    let last = lunation_on_or_before(winter_solstice_day(sui));
    let starts: Vec<i64> = (first..=last).map(new_moon_day).collect();

    let mut needs_leap = last - first == 13;
    let mut months = Vec::with_capacity(starts.len());
    let mut number = 10;
    for (i, &start) in starts.iter().enumerate() {
        let next = starts.get(i + 1).copied();
        if needs_leap && next.is_some_and(|next| longitude_crossed(start, next, 30.0).is_none()) {
            months.push(LunarMonth {
                start,
                number,
                leap: true,
            });
            needs_leap = false;
            continue;
        }
        number = number % 12 + 1;
        months.push(LunarMonth {
            start,
            number,
            leap: false,
        });
    }
    months
}

/// Lunar calendar computed from the ephemeris: lunar years start on the
/// first new moon of the first month, month pillars follow lunar months
/// (a leap month shares its pillar with the month it repeats), and solar
/// terms are reported on the day they fall on in China Standard Time.
#[derive(Debug, Clone, Copy, Default)]
pub struct AstronomicalProvider;

impl AstronomicalProvider {
    pub fn new() -> Self {
        Self
    }

    fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
        if !SUPPORTED_YEARS.contains(&year) {
            return Err(GanzhiError::provider_lookup(
                year,
                month,
                day,
                format!(
                    "outside the supported years {}-{}",
                    SUPPORTED_YEARS.start(),
                    SUPPORTED_YEARS.end()
                ),
            ));
        }
        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| GanzhiError::provider_lookup(year, month, day, "not a Gregorian date"))
    }

    pub fn lunar_date(&self, year: i32, month: u32, day: u32) -> Result<LunarDate> {
        let date = Self::date(year, month, day)?;
        let today = day_number(date);

        let next_sui_start = new_moon_day(lunation_on_or_before(winter_solstice_day(year)));
        let sui = if today >= next_sui_start { year + 1 } else { year };

        let lunar_month = months_of_sui(sui)
            .into_iter()
            .take_while(|m| m.start <= today)
            .last()
            .ok_or_else(|| {
                GanzhiError::provider_lookup(year, month, day, "no lunar month found")
            })?;

        Ok(LunarDate {
            year: if lunar_month.number >= 11 { sui - 1 } else { sui },
            month: lunar_month.number,
            leap: lunar_month.leap,
            day: (today - lunar_month.start + 1) as u32,
        })
    }

    /// Solar term falling on the given day, if any.
    pub fn solar_term(&self, year: i32, month: u32, day: u32) -> Result<Option<&'static str>> {
        let today = day_number(Self::date(year, month, day)?);
        Ok(longitude_crossed(today, today + 1, 15.0)
            .map(|longitude| SOLAR_TERMS[(longitude / 15.0).round() as usize % 24]))
    }
}

impl LunarConversionProvider for AstronomicalProvider {
    fn lookup(&self, year: i32, month: u32, day: u32) -> Result<LunarRecord> {
        let lunar = self.lunar_date(year, month, day)?;
        let today = day_number(Self::date(year, month, day)?);

        let year_index = (lunar.year as i64 - 4).rem_euclid(60);
        let month_index =
            ((lunar.year as i64 - 1900) * 12 + lunar.month as i64 - 1 + MONTH_CYCLE_EPOCH)
                .rem_euclid(60);
        let day_index = (today + 49).rem_euclid(60);

        let mut record = LunarRecord::new(
            Pillar::from_cycle_index(year_index as usize),
            Pillar::from_cycle_index(month_index as usize),
            Pillar::from_cycle_index(day_index as usize),
        );
        if let Some(term) = self.solar_term(year, month, day)? {
            record = record.with_term(term);
        }

        tracing::trace!(
            "{:04}-{:02}-{:02} -> lunar {}-{}{}-{}",
            year,
            month,
            day,
            lunar.year,
            if lunar.leap { "闰" } else { "" },
            lunar.month,
            lunar.day
        );
        Ok(record)
    }
}
