//! # Civil time, Julian Date and sidereal time
//!
//! KCDC records carry their timestamp as two packed decimal integers: the civil date
//! `YYYYMMDD` and the time of day `HHMMSS` (UTC). This module turns them into a
//! continuous **Julian Date** and derives the **Greenwich Sidereal Time** used by the
//! horizontal → equatorial conversion.
//!
//! Functions
//! -----------------
//! * [`julian_date`] – packed date/time (+ optional nanoseconds) → Julian Date.
//! * [`greenwich_sidereal_time`] – Julian Date → mean sidereal time at Greenwich, in
//!   **seconds** (not reduced to one sidereal day).
//! * [`local_sidereal_time`] – sidereal time at an [`ObserverSite`], in degrees.
//! * [`epoch_from_julian_date`] / [`julian_date_of_epoch`] – bridges to
//!   [`hifitime::Epoch`] for logging and cross-checks.
//!
//! The date arithmetic follows Meeus, *Astronomical Algorithms*, ch. 7: January and
//! February count as months 13 and 14 of the previous year and the Gregorian correction
//! is applied unconditionally. Packed inputs are **not** validated; a month of `0` or
//! `13` silently produces a meaningless date.
use hifitime::Epoch;

use crate::constants::{
    JulianDate, Seconds, DAYS_PER_CENTURY, GST_COEFFS, J2000, SECONDS_PER_DAY, SIDEREAL_RATIO,
};
use crate::conversion::normalize_to_360;
use crate::observer::ObserverSite;

/// Split a packed `YYYYMMDD` integer into (year, month, day).
#[inline]
fn unpack_ymd(ymd: u64) -> (f64, f64, f64) {
    let years = ymd / 10_000;
    let months = (ymd - years * 10_000) / 100;
    let days = ymd - years * 10_000 - months * 100;
    (years as f64, months as f64, days as f64)
}

/// Split a packed `HHMMSS` integer into (hours, minutes, seconds).
#[inline]
fn unpack_hms(hms: u64) -> (f64, f64, f64) {
    let hours = hms / 10_000;
    let minutes = (hms - hours * 10_000) / 100;
    let seconds = hms - hours * 10_000 - minutes * 100;
    (hours as f64, minutes as f64, seconds as f64)
}

/// Julian Date of a packed civil timestamp.
///
/// Arguments
/// -----------------
/// * `ymd`: civil date packed as `YYYYMMDD` (e.g. `19980702`).
/// * `hms`: time of day packed as `HHMMSS` (e.g. `145647`, UTC).
/// * `subsecond_ns`: additional nanoseconds (KCDC exports never carry them, pass `0`).
///
/// Return
/// ----------
/// * The Julian Date in days. The day boundary is at noon, so `20000101`, `120000`
///   gives exactly `2451545.0`.
///
/// Notes
/// ----------
/// * No validation is done on the packed fields.
pub fn julian_date(ymd: u64, hms: u64, subsecond_ns: u64) -> JulianDate {
    let (mut years, mut months, mut days) = unpack_ymd(ymd);

    if months <= 2.0 {
        months += 12.0;
        years -= 1.0;
    }

    let (hours, minutes, seconds) = unpack_hms(hms);
    let seconds = seconds + subsecond_ns as f64 * 1e-9;
    days += (hours + (minutes + seconds / 60.0) / 60.0) / 24.0;

    // Gregorian calendar correction
    let century = (years / 100.0).floor();
    let b = 2.0 - century + (century / 4.0).floor();

    (365.25 * (years + 4716.0).floor()).floor() + (306.0 * (months + 1.0) / 10.0).floor() + b + days
        - 1524.5
}

/// Greenwich mean sidereal time, in seconds, for a Julian Date.
///
/// The Julian Date is shifted by half a day so that the integer part designates the
/// civil day (0h UT) and the fractional part the elapsed fraction of that day. The mean
/// sidereal time at 0h is the cubic polynomial [`GST_COEFFS`] in Julian centuries,
/// evaluated in Horner form; the elapsed fraction of the day is scaled by the
/// sidereal/solar rate ratio.
///
/// Return
/// ----------
/// * Sidereal time in seconds. The value is **not** reduced modulo one sidereal day,
///   callers normalize the derived angle.
pub fn greenwich_sidereal_time(jd: JulianDate) -> Seconds {
    let shifted = jd + 0.5;
    let julian_day_part = shifted.trunc();
    let day_fraction = shifted.fract();

    let julian_centuries = (julian_day_part - (J2000 + 0.5)) / DAYS_PER_CENTURY;

    let mean_gst0 = GST_COEFFS[..3]
        .iter()
        .rev()
        .fold(GST_COEFFS[3], |acc, c| acc * julian_centuries + c);

    mean_gst0 + day_fraction * SIDEREAL_RATIO * SECONDS_PER_DAY
}

/// Local sidereal time at `site`, in degrees within `[0, 360)`.
///
/// Uses the same longitude convention as
/// [`horizontal_to_equatorial`](crate::ref_system::horizontal_to_equatorial): the site
/// longitude is subtracted from the Greenwich angle. For an event at the zenith the
/// right ascension returned by the transformer equals this value.
pub fn local_sidereal_time(jd: JulianDate, site: &ObserverSite) -> f64 {
    // 240 sidereal seconds per degree
    normalize_to_360(greenwich_sidereal_time(jd) / 240.0 - site.longitude())
}

/// Build a UTC [`Epoch`] from a Julian Date.
pub fn epoch_from_julian_date(jd: JulianDate) -> Epoch {
    Epoch::from_jde_utc(jd)
}

/// Julian Date (UTC) of an [`Epoch`].
pub fn julian_date_of_epoch(epoch: &Epoch) -> JulianDate {
    epoch.to_jde_utc_days()
}

#[cfg(test)]
mod time_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_julian_date_j2000() {
        assert_abs_diff_eq!(julian_date(20000101, 120000, 0), J2000, epsilon = 1e-6);
        assert_abs_diff_eq!(julian_date(20000101, 0, 0), 2451544.5, epsilon = 1e-9);
    }

    #[test]
    fn test_julian_date_kcdc_sample() {
        assert_abs_diff_eq!(
            julian_date(19980702, 145647, 0),
            2450997.1227662037,
            epsilon = 1e-9
        );
        // leading zero of the packed time is lost when read as an integer
        assert_abs_diff_eq!(
            julian_date(20000108, 33015, 0),
            2451551.6460069446,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_julian_date_january_february_rollover() {
        // Feb 28 → Mar 1 in a leap year spans two days
        let feb28 = julian_date(20000228, 0, 0);
        let feb29 = julian_date(20000229, 0, 0);
        let mar01 = julian_date(20000301, 0, 0);
        assert_abs_diff_eq!(feb29 - feb28, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(mar01 - feb29, 1.0, epsilon = 1e-9);

        // year boundary
        let dec31 = julian_date(19991231, 235959, 0);
        let jan01 = julian_date(20000101, 0, 0);
        assert_abs_diff_eq!(jan01 - dec31, 1.0 / 86400.0, epsilon = 1e-9);
    }

    #[test]
    fn test_julian_date_subsecond() {
        let base = julian_date(20040615, 101010, 0);
        let half = julian_date(20040615, 101010, 500_000_000);
        assert_abs_diff_eq!((half - base) * 86400.0, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_julian_date_strictly_increasing() {
        let stamps = [
            (19980702, 145646),
            (19980702, 145647),
            (19980702, 145700),
            (19980703, 0),
            (19990101, 10203),
        ];
        let jds: Vec<f64> = stamps
            .iter()
            .map(|&(ymd, hms)| julian_date(ymd, hms, 0))
            .collect();
        assert!(jds.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_julian_date_matches_hifitime() {
        let epoch = Epoch::from_gregorian_utc(1998, 7, 2, 14, 56, 47, 0);
        assert_abs_diff_eq!(
            julian_date(19980702, 145647, 0),
            julian_date_of_epoch(&epoch),
            epsilon = 1e-6
        );

        let epoch = Epoch::from_gregorian_utc(2011, 2, 14, 23, 5, 9, 0);
        assert_abs_diff_eq!(
            julian_date(20110214, 230509, 0),
            julian_date_of_epoch(&epoch),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_epoch_round_trip() {
        let epoch = epoch_from_julian_date(julian_date(20000101, 120000, 0));
        assert_abs_diff_eq!(julian_date_of_epoch(&epoch), J2000, epsilon = 1e-6);
    }

    #[test]
    fn test_gst_at_j2000() {
        // 0h UT on 2000-01-01 plus half a day, evaluated with the T offset of the series
        assert_abs_diff_eq!(
            greenwich_sidereal_time(J2000),
            67310.54840996566,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_gst_advances_at_sidereal_rate() {
        let jd0 = julian_date(20050315, 10000, 0);
        let jd1 = julian_date(20050315, 20000, 0);
        let dt = greenwich_sidereal_time(jd1) - greenwich_sidereal_time(jd0);
        assert_abs_diff_eq!(dt, 3600.0 * SIDEREAL_RATIO, epsilon = 1e-3);
    }

    #[test]
    fn test_local_sidereal_time_range() {
        let site = ObserverSite::default();
        for hms in [0, 61500, 120000, 183030, 235959] {
            let lst = local_sidereal_time(julian_date(20050315, hms, 0), &site);
            assert!((0.0..360.0).contains(&lst));
        }
    }
}
