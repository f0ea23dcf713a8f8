//! Low-precision solar and lunar ephemeris after Meeus, *Astronomical
//! Algorithms* (chapters 25 and 49).
//!
//! New moons are good to about a minute, solar longitudes to about 0.01°,
//! which places solar terms within a quarter of an hour. Days are Julian day
//! numbers in China Standard Time (UTC+8).

use chrono::{Datelike, NaiveDate};

const J2000: f64 = 2_451_545.0;
const SYNODIC_MONTH: f64 = 29.530_588_861;
const TROPICAL_YEAR: f64 = 365.242_2;
/// UTC+8, in days
const CST_OFFSET: f64 = 8.0 / 24.0;
/// Julian day number of 0000-12-31 (chrono's day 0)
const CE_EPOCH_JDN: i64 = 1_721_425;

pub fn day_number(date: NaiveDate) -> i64 {
    date.num_days_from_ce() as i64 + CE_EPOCH_JDN
}

/// ΔT = TT - UT in seconds, Espenak and Meeus polynomials.
fn delta_t(year: f64) -> f64 {
    if year < 1920.0 {
        let t = year - 1900.0;
        -2.79 + 1.494119 * t - 0.0598939 * t.powi(2) + 0.0061966 * t.powi(3)
            - 0.000197 * t.powi(4)
    } else if year < 1941.0 {
        let t = year - 1920.0;
        21.20 + 0.84493 * t - 0.076100 * t.powi(2) + 0.0020936 * t.powi(3)
    } else if year < 1961.0 {
        let t = year - 1950.0;
        29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
    } else if year < 1986.0 {
        let t = year - 1975.0;
        45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
    } else if year < 2005.0 {
        let t = year - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t.powi(2)
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else if year < 2050.0 {
        let t = year - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t.powi(2)
    } else {
        -20.0 + 32.0 * ((year - 1820.0) / 100.0).powi(2) - 0.5628 * (2150.0 - year)
    }
}

fn delta_t_days(jd: f64) -> f64 {
    delta_t(2000.0 + (jd - J2000) / 365.25) / 86_400.0
}

/// CST day containing the dynamical-time instant `jde`.
fn cst_day(jde: f64) -> i64 {
    let ut = jde - delta_t_days(jde);
    (ut + 0.5 + CST_OFFSET).floor() as i64
}

/// Dynamical time of the CST midnight starting `day`.
fn cst_midnight(day: i64) -> f64 {
    let ut = day as f64 - 0.5 - CST_OFFSET;
    ut + delta_t_days(ut)
}

/// Mean new moon number `k` corrected to the true new moon, in JDE.
pub fn new_moon(k: i64) -> f64 {
    let k = k as f64;
    let t = k / 1236.85;
    let (t2, t3, t4) = (t * t, t * t * t, t * t * t * t);

    let mean = 2_451_550.097_66 + SYNODIC_MONTH * k + 0.000_154_37 * t2 - 0.000_000_150 * t3
        + 0.000_000_000_73 * t4;
    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t2;
    let m = (2.5534 + 29.105_356_70 * k - 0.000_001_4 * t2 - 0.000_000_11 * t3).to_radians();
    let mp = (201.5643 + 385.816_935_28 * k + 0.010_758_2 * t2 + 0.000_012_38 * t3
        - 0.000_000_058 * t4)
        .to_radians();
    let f = (160.7108 + 390.670_502_84 * k - 0.001_611_8 * t2 - 0.000_002_27 * t3
        + 0.000_000_011 * t4)
        .to_radians();
    let omega = (124.7746 - 1.563_755_88 * k + 0.002_067_2 * t2 + 0.000_002_15 * t3).to_radians();

    let periodic = -0.40720 * mp.sin() + 0.17241 * e * m.sin() + 0.01608 * (2.0 * mp).sin()
        + 0.01039 * (2.0 * f).sin()
        + 0.00739 * e * (mp - m).sin()
        - 0.00514 * e * (mp + m).sin()
        + 0.00208 * e * e * (2.0 * m).sin()
        - 0.00111 * (mp - 2.0 * f).sin()
        - 0.00057 * (mp + 2.0 * f).sin()
        + 0.00056 * e * (2.0 * mp + m).sin()
        - 0.00042 * (3.0 * mp).sin()
        + 0.00042 * e * (m + 2.0 * f).sin()
        + 0.00038 * e * (m - 2.0 * f).sin()
        - 0.00024 * e * (2.0 * mp - m).sin()
        - 0.00017 * omega.sin()
        - 0.00007 * (mp + 2.0 * m).sin()
        + 0.00004 * (2.0 * mp - 2.0 * f).sin()
        + 0.00004 * (3.0 * m).sin()
        + 0.00003 * (mp + m - 2.0 * f).sin()
        + 0.00003 * (2.0 * mp + 2.0 * f).sin()
        - 0.00003 * (mp + m + 2.0 * f).sin()
        + 0.00003 * (mp - m + 2.0 * f).sin()
        - 0.00002 * (mp - m - 2.0 * f).sin()
        - 0.00002 * (3.0 * mp + m).sin()
        + 0.00002 * (4.0 * mp).sin();

    // (amplitude, phase at k = 0, rate per lunation) of the planetary arguments
    const PLANETARY: [(f64, f64, f64); 14] = [
        (0.000_325, 299.77, 0.107_408),
        (0.000_165, 251.88, 0.016_321),
        (0.000_164, 251.83, 26.651_886),
        (0.000_126, 349.42, 36.412_478),
        (0.000_110, 84.66, 18.206_239),
        (0.000_062, 141.74, 53.303_771),
        (0.000_060, 207.14, 2.453_732),
        (0.000_056, 154.84, 7.306_860),
        (0.000_047, 34.52, 27.261_239),
        (0.000_042, 207.19, 0.121_824),
        (0.000_040, 291.34, 1.844_379),
        (0.000_037, 161.72, 24.198_154),
        (0.000_035, 239.56, 25.513_099),
        (0.000_023, 331.55, 3.592_518),
    ];
    let planetary: f64 = PLANETARY
        .iter()
        .enumerate()
        .map(|(i, &(amplitude, phase, rate))| {
            let mut angle = phase + rate * k;
            if i == 0 {
                angle -= 0.009_173 * t2;
            }
            amplitude * angle.to_radians().sin()
        })
        .sum();

    mean + periodic + planetary
}

/// CST day of new moon `k`.
pub fn new_moon_day(k: i64) -> i64 {
    cst_day(new_moon(k))
}

/// Number of the last new moon falling on or before `day`.
pub fn lunation_on_or_before(day: i64) -> i64 {
    let mut k = ((day as f64 - 2_451_550.1) / SYNODIC_MONTH).floor() as i64;
    while new_moon_day(k) > day {
        k -= 1;
    }
    while new_moon_day(k + 1) <= day {
        k += 1;
    }
    k
}

/// Apparent geocentric longitude of the Sun in degrees, `[0, 360)`.
pub fn sun_longitude(jde: f64) -> f64 {
    let t = (jde - J2000) / 36_525.0;
    let l0 = 280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t * t;
    let m = (357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t).to_radians();
    let center = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * m.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * m).sin()
        + 0.000_289 * (3.0 * m).sin();
    let omega = (125.04 - 1_934.136 * t).to_radians();
    (l0 + center - 0.005_69 - 0.004_78 * omega.sin()).rem_euclid(360.0)
}

/// CST day on which the Sun reaches `longitude`, searching from `guess`.
pub fn solar_term_day(longitude: f64, guess: f64) -> i64 {
    let mut jde = guess;
    for _ in 0..10 {
        let offset = (longitude - sun_longitude(jde) + 540.0).rem_euclid(360.0) - 180.0;
        jde += offset * TROPICAL_YEAR / 360.0;
        if offset.abs() < 1e-7 {
            break;
        }
    }
    cst_day(jde)
}

/// CST day of the December solstice of Gregorian `year`.
pub fn winter_solstice_day(year: i32) -> i64 {
    // 2000-12-21 12:00 TT
    let guess = 2_451_900.0 + (year - 2000) as f64 * TROPICAL_YEAR;
    solar_term_day(270.0, guess)
}

/// First multiple of `step` degrees the Sun passes in the days `from..to`.
pub fn longitude_crossed(from: i64, to: i64, step: f64) -> Option<f64> {
    let start = sun_longitude(cst_midnight(from));
    let travelled = (sun_longitude(cst_midnight(to)) - start).rem_euclid(360.0);
    let next = ((start / step).floor() + 1.0) * step;
    (next < start + travelled).then(|| next.rem_euclid(360.0))
}
