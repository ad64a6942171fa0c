//! # KCDC air-shower events
//!
//! One [`EventRecord`] per line of a KCDC export. The reconstruction quantities are kept
//! as read; the sky position is derived on demand with [`EventRecord::sky_position`].
//!
//! ## Input layout
//!
//! A header line, then 18 whitespace-separated columns per event:
//!
//! ```text
//!         E          YC          XC          ZE          AZ          NE         NMU     ESUMHAD        NHAD           T           P          GT          MT         YMD         HMS           R          EV         AGE
//!   15.0428     43.7400     79.5148     44.2007      7.4743      3.9608      3.8254     -1.0000          -1     20.2800   1001.3107   899391407   756894400    19980702      145647        1000       10007      1.1117
//! ```
//!
//! `ZE`/`AZ` are the reconstructed zenith angle and azimuth in degrees (detector
//! convention: azimuth 0 toward north), `YMD`/`HMS` the packed UTC date and time.
//!
//! ## Parsing policy
//!
//! * **Lenient** (default): a field that cannot be parsed, and every field after it on
//!   the same line, reads as zero; a missing field reads as zero. Such records are kept.
//! * **Strict**: the first bad or missing field aborts with
//!   [`KcdcError::InvalidRecord`] / [`KcdcError::ShortRecord`].
//!
//! ## See also
//! ------------
//! * [`reader::EventReader`] – Streaming reader over a KCDC file.
//! * [`crate::ref_system`] – Frame conversions used by [`EventRecord::sky_position`].
pub mod reader;

use std::fmt;
use std::str::{FromStr, SplitWhitespace};

use serde::{Deserialize, Serialize};

use crate::constants::{Degree, JulianDate};
use crate::conversion::{convert_range_to_180, normalize_to_360};
use crate::kcdc_errors::KcdcError;
use crate::observer::ObserverSite;
use crate::ref_system::{
    equatorial_to_galactic, horizontal_to_equatorial, Equatorial, Galactic, GalacticPole,
    Horizontal,
};
use crate::time::julian_date;

/// Number of columns of a KCDC record
pub const KCDC_FIELD_COUNT: usize = 18;

/// A single reconstructed air shower.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventRecord {
    /// `E`: reconstructed energy, as exported
    pub energy: f64,
    /// `YC`: shower core y, m
    pub core_y: f64,
    /// `XC`: shower core x, m
    pub core_x: f64,
    /// `ZE`: zenith angle, degrees
    pub zenith: Degree,
    /// `AZ`: azimuth, degrees, detector convention
    pub azimuth: Degree,
    /// `NE`: electron number
    pub electron_number: f64,
    /// `NMU`: muon number
    pub muon_number: f64,
    /// `ESUMHAD`: hadron energy sum
    pub hadron_energy_sum: f64,
    /// `NHAD`: hadron count (`-1` when not reconstructed)
    pub hadron_count: i64,
    /// `T`: air temperature
    pub temperature: f64,
    /// `P`: air pressure
    pub pressure: f64,
    /// `GT`: GPS time stamp
    pub gps_time: u64,
    /// `MT`: microsecond counter
    pub micro_time: u64,
    /// `YMD`: packed UTC date
    pub ymd: u64,
    /// `HMS`: packed UTC time
    pub hms: u64,
    /// `R`: run number
    pub run: u64,
    /// `EV`: event number
    pub event: u64,
    /// `AGE`: shower age
    pub age: f64,
    /// Sub-second part of the time stamp, ns (not part of KCDC exports)
    #[serde(default)]
    pub subsecond_ns: u64,
}

/// Derived celestial position of an event.
///
/// `equatorial.ra` and `galactic.lon` are in `[-180, 180)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SkyPosition {
    pub julian_date: JulianDate,
    pub equatorial: Equatorial,
    pub galactic: Galactic,
}

/// Sequential field extraction with the lenient/strict policy described in the module
/// documentation.
struct FieldCursor<'a> {
    tokens: SplitWhitespace<'a>,
    line_number: u64,
    position: usize,
    strict: bool,
    failed: bool,
}

impl<'a> FieldCursor<'a> {
    fn new(line: &'a str, line_number: u64, strict: bool) -> Self {
        FieldCursor {
            tokens: line.split_whitespace(),
            line_number,
            position: 0,
            strict,
            failed: false,
        }
    }

    fn next<T: FromStr + Default>(&mut self, field: &'static str) -> Result<T, KcdcError> {
        let token = self.tokens.next();
        self.position += 1;

        if self.failed {
            return Ok(T::default());
        }

        match token {
            Some(raw) => match raw.parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) if self.strict => Err(KcdcError::InvalidRecord {
                    line: self.line_number,
                    field,
                    value: raw.to_string(),
                }),
                Err(_) => {
                    self.failed = true;
                    Ok(T::default())
                }
            },
            None if self.strict => Err(KcdcError::ShortRecord {
                line: self.line_number,
                found: self.position - 1,
                expected: KCDC_FIELD_COUNT,
            }),
            None => {
                self.failed = true;
                Ok(T::default())
            }
        }
    }
}

impl EventRecord {
    /// Parse one data line.
    ///
    /// Arguments
    /// -----------------
    /// * `line`: the raw text line (header excluded).
    /// * `line_number`: 1-based line number in the file, used in error messages.
    /// * `strict`: reject malformed lines instead of zero-filling them.
    ///
    /// Errors
    /// ----------
    /// * Only in strict mode: [`KcdcError::InvalidRecord`] or [`KcdcError::ShortRecord`].
    pub fn from_line(line: &str, line_number: u64, strict: bool) -> Result<Self, KcdcError> {
        let mut c = FieldCursor::new(line, line_number, strict);

        Ok(EventRecord {
            energy: c.next("E")?,
            core_y: c.next("YC")?,
            core_x: c.next("XC")?,
            zenith: c.next("ZE")?,
            azimuth: c.next("AZ")?,
            electron_number: c.next("NE")?,
            muon_number: c.next("NMU")?,
            hadron_energy_sum: c.next("ESUMHAD")?,
            hadron_count: c.next("NHAD")?,
            temperature: c.next("T")?,
            pressure: c.next("P")?,
            gps_time: c.next("GT")?,
            micro_time: c.next("MT")?,
            ymd: c.next("YMD")?,
            hms: c.next("HMS")?,
            run: c.next("R")?,
            event: c.next("EV")?,
            age: c.next("AGE")?,
            subsecond_ns: 0,
        })
    }

    /// Julian Date of the event time stamp.
    pub fn julian_date(&self) -> JulianDate {
        julian_date(self.ymd, self.hms, self.subsecond_ns)
    }

    /// Azimuth converted from the detector convention to the south-based convention of
    /// [`horizontal_to_equatorial`], in `[0, 360)`.
    pub fn south_azimuth(&self) -> Degree {
        normalize_to_360(self.azimuth + 180.0)
    }

    /// Arrival direction in the local horizontal frame (south-based azimuth).
    pub fn horizontal(&self) -> Horizontal {
        Horizontal {
            azimuth: self.south_azimuth(),
            zenith: self.zenith,
        }
    }

    /// Equatorial direction of the event, as seen at time `jd` instead of the event's own
    /// time stamp. `ra` is in `[0, 360)`.
    pub fn equatorial_at(&self, jd: JulianDate, site: &ObserverSite) -> Equatorial {
        horizontal_to_equatorial(self.south_azimuth(), self.zenith, jd, site)
    }

    /// Full celestial position of the event.
    ///
    /// The galactic conversion is done from the `[0, 360)` right ascension, then both
    /// longitudes are folded into `[-180, 180)`.
    pub fn sky_position(&self, site: &ObserverSite, pole: &GalacticPole) -> SkyPosition {
        let jd = self.julian_date();
        let equatorial = self.equatorial_at(jd, site);
        let galactic = equatorial_to_galactic(&equatorial, pole);

        SkyPosition {
            julian_date: jd,
            equatorial: Equatorial {
                ra: convert_range_to_180(equatorial.ra),
                dec: equatorial.dec,
            },
            galactic: Galactic {
                lon: convert_range_to_180(galactic.lon),
                lat: galactic.lat,
            },
        }
    }
}

/// Fixed-width rendering of the 18 input columns: width 11 for the energy, 12 for the
/// rest, 4 decimals for floating-point columns.
impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>11.4}", self.energy)?;
        for v in [
            self.core_y,
            self.core_x,
            self.zenith,
            self.azimuth,
            self.electron_number,
            self.muon_number,
            self.hadron_energy_sum,
        ] {
            write!(f, "{v:>12.4}")?;
        }
        write!(
            f,
            "{:>12}{:>12.4}{:>12.4}",
            self.hadron_count, self.temperature, self.pressure
        )?;
        for v in [
            self.gps_time,
            self.micro_time,
            self.ymd,
            self.hms,
            self.run,
            self.event,
        ] {
            write!(f, "{v:>12}")?;
        }
        write!(f, "{:>12.4}", self.age)
    }
}
