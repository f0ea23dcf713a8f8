use crate::core::boundary::is_boundary_passed;
use crate::core::hour::hour_pillar;
use crate::domain::model::{CivilMoment, FourPillars, GanzhiResult, Pillar};
use crate::domain::ports::LunarConversionProvider;
use crate::utils::error::{GanzhiError, Result};
use chrono::Datelike;

/// Sampled before the next Start-of-Spring and after the current Lunar New Year.
const PREVIOUS_YEAR_ANCHOR: (u32, u32) = (12, 20);
/// Sampled after both Start-of-Spring and Lunar New Year.
const CURRENT_YEAR_ANCHOR: (u32, u32) = (7, 1);

/// Converts civil moments into year, month, day and hour pillars.
///
/// Stateless apart from the provider it borrows answers from; it is safe to
/// share between threads whenever the provider is.
#[derive(Debug, Clone)]
pub struct GanzhiEngine<P: LunarConversionProvider> {
    provider: P,
}

impl<P: LunarConversionProvider> GanzhiEngine<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Entry point used by callers holding raw clock fields. Never fails:
    /// any error becomes a result with `status = error` and sentinel pillars.
    /// `minute` does not influence any pillar.
    pub fn compute_pillars(
        &self,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> GanzhiResult {
        match CivilMoment::new(year, month, day, hour, minute) {
            Ok(moment) => self.compute_at(&moment),
            Err(e) => {
                tracing::warn!(
                    "Rejected moment {:04}-{:02}-{:02} {:02}:{:02}: {}",
                    year,
                    month,
                    day,
                    hour,
                    minute,
                    e
                );
                GanzhiResult::error(e.to_string())
            }
        }
    }

    /// Same as [`compute_pillars`](Self::compute_pillars) for an already validated moment.
    pub fn compute_at(&self, moment: &CivilMoment) -> GanzhiResult {
        let outcome = self.pillars_for(moment);
        if let Err(e) = &outcome {
            tracing::warn!("Pillar conversion failed for {}: {}", moment, e);
        }
        GanzhiResult::from(outcome)
    }

    pub fn pillars_for(&self, moment: &CivilMoment) -> Result<FourPillars> {
        let record = self
            .provider
            .lookup(moment.year(), moment.month(), moment.day())?;

        let passed = is_boundary_passed(moment.month(), moment.day(), &record.solar_terms);
        let year = self.year_pillar(moment, passed, record.year)?;
        let day = self.day_pillar(moment, record.day)?;
        let hour = hour_pillar(moment.hour(), day.stem())?;

        tracing::debug!(
            "{} -> {} {} {} {} (boundary passed: {})",
            moment,
            year,
            record.month,
            day,
            hour,
            passed
        );

        Ok(FourPillars {
            year,
            month: record.month,
            day,
            hour,
        })
    }

    fn year_pillar(&self, moment: &CivilMoment, passed: bool, raw: Pillar) -> Result<Pillar> {
        let anchor = if !passed && moment.month() <= 2 {
            let (month, day) = PREVIOUS_YEAR_ANCHOR;
            Some((moment.year() - 1, month, day))
        } else if passed && moment.month() == 2 {
            let (month, day) = CURRENT_YEAR_ANCHOR;
            Some((moment.year(), month, day))
        } else {
            None
        };

        match anchor {
            Some((year, month, day)) => {
                let pillar = self.provider.lookup(year, month, day)?.year;
                tracing::debug!(
                    "Year pillar for {} resampled at {:04}-{:02}-{:02}: {} -> {}",
                    moment,
                    year,
                    month,
                    day,
                    raw,
                    pillar
                );
                Ok(pillar)
            }
            None => Ok(raw),
        }
    }

    /// From 23:00 the day pillar already belongs to the next calendar day.
    fn day_pillar(&self, moment: &CivilMoment, raw: Pillar) -> Result<Pillar> {
        if moment.hour() < 23 {
            return Ok(raw);
        }
        let next = moment.date().succ_opt().ok_or_else(|| {
            GanzhiError::provider_lookup(
                moment.year(),
                moment.month(),
                moment.day(),
                "no following calendar day",
            )
        })?;
        Ok(self
            .provider
            .lookup(next.year(), next.month(), next.day())?
            .day)
    }
}
