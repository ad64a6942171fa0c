//! # Field augmentation
//!
//! Streaming pass that re-emits every KCDC record with six derived columns:
//!
//! | Column  | Width | Content                                              |
//! |---------|-------|------------------------------------------------------|
//! | `RA`    | 13    | right ascension, degrees, `[-180, 180)`              |
//! | `DEC`   | 12    | declination, degrees                                 |
//! | `LON`   | 12    | galactic longitude, degrees, `[-180, 180)`           |
//! | `LAT`   | 12    | galactic latitude, degrees                           |
//! | `JDAYS` | 20    | Julian Date of the event, 6 decimals                 |
//! | `DIST`  | 12    | angular distance to the target direction, degrees    |
//!
//! The input header is copied and the six column titles appended to it. Records farther
//! than `max_distance` from the target are left out when `max_distance > 0`.
//!
//! With [`Projection::HammerAitoff`] the (RA, DEC) and (LON, LAT) pairs are replaced by
//! their Hammer–Aitoff projection before `DIST` is computed.
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};

use camino::Utf8Path;
use log::info;
use serde::Serialize;

use crate::conversion::project_hammer_aitoff;
use crate::events::reader::EventReader;
use crate::kcdc_errors::KcdcError;
use crate::params::{KcdcParams, Projection};
use crate::progress::Progress;
use crate::ref_system::{Equatorial, Galactic};

/// Counters of an augmentation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AugmentSummary {
    /// Records read (blank lines excluded)
    pub records: u64,
    /// Records written
    pub written: u64,
    /// Records left out by the distance cut
    pub filtered: u64,
}

/// Distance in degrees between `eq` and `target` in the flat approximation around the
/// target, right ascension scaled by the target declination:
///
/// ```text
/// DIST = sqrt((δ − δ₀)² + (α − α₀)² / cos²(δ₀))
/// ```
///
/// Both right ascensions are expected in the same `[-180, 180)` convention; no
/// wrap-around is applied.
pub fn distance_to_target(eq: &Equatorial, target: &Equatorial) -> f64 {
    let cos_dec0 = target.dec.to_radians().cos();
    let d_dec = eq.dec - target.dec;
    let d_ra = eq.ra - target.ra;
    (d_dec * d_dec + d_ra * d_ra / (cos_dec0 * cos_dec0)).sqrt()
}

/// Output header: the input header followed by the derived column titles.
pub fn augmented_header(input_header: &str) -> String {
    format!(
        "{input_header}{:>12}{:>12}{:>12}{:>12}{:>20}{:>12}",
        "RA", "DEC", "LON", "LAT", "JDAYS", "DIST"
    )
}

/// Augment a stream of records.
///
/// Arguments
/// -----------------
/// * `reader`: source of records; its header is copied to the output.
/// * `out`: destination.
/// * `params`: site, galactic pole, distance target and cut, projection.
///
/// Errors
/// ----------
/// * Write failures, and malformed records when the reader is strict.
pub fn augment_stream<R: BufRead, W: Write>(
    reader: EventReader<R>,
    mut out: W,
    params: &KcdcParams,
) -> Result<AugmentSummary, KcdcError> {
    writeln!(out, "{}", augmented_header(reader.header()))?;

    let mut summary = AugmentSummary::default();
    let mut progress = Progress::new("augment");

    for item in reader {
        let (_, record) = item?;
        progress.line();
        summary.records += 1;

        let pos = record.sky_position(&params.site, &params.galactic_pole);
        let (equatorial, galactic) = match params.projection {
            Projection::None => (pos.equatorial, pos.galactic),
            Projection::HammerAitoff => {
                let (ra, dec) = project_hammer_aitoff(pos.equatorial.ra, pos.equatorial.dec);
                let (lon, lat) = project_hammer_aitoff(pos.galactic.lon, pos.galactic.lat);
                (Equatorial { ra, dec }, Galactic { lon, lat })
            }
        };

        let dist = distance_to_target(&equatorial, &params.distance_target);
        if params.max_distance > 0.0 && dist > params.max_distance {
            summary.filtered += 1;
            continue;
        }

        writeln!(
            out,
            "{record}{:>13.4}{:>12.4}{:>12.4}{:>12.4}{:>20.6}{:>12.4}",
            equatorial.ra, equatorial.dec, galactic.lon, galactic.lat, pos.julian_date, dist
        )?;
        summary.written += 1;
    }

    out.flush()?;
    progress.finish();
    Ok(summary)
}

/// Augment the KCDC file `input` into `output`.
pub fn augment(
    input: &Utf8Path,
    output: &Utf8Path,
    params: &KcdcParams,
) -> Result<AugmentSummary, KcdcError> {
    let reader = EventReader::open(input, params.strict)?;
    let file = File::create(output).map_err(|source| KcdcError::OpenFile {
        path: output.to_string(),
        source,
    })?;

    info!("Processing input ({input}) output ({output})");
    if params.max_distance > 0.0 {
        info!("Using max distance ({})", params.max_distance);
    }

    let summary = augment_stream(reader, BufWriter::new(file), params)?;
    info!(
        "{} records read, {} written, {} outside the distance cut",
        summary.records, summary.written, summary.filtered
    );
    Ok(summary)
}
