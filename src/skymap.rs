//! # Sky histograms
//!
//! Dense 2-D count maps of arrival directions in equatorial coordinates.
//!
//! ## Geometry
//!
//! A [`SkyGrid`] covers the whole sphere with square bins: row index from the shifted
//! declination `dec + 90 ∈ [0, 180)`, column index from the shifted right ascension
//! `ra + 180 ∈ [0, 360)`. The default grid has 360 × 720 bins of 0.5°.
//!
//! ```text
//!  dec_idx = ⌊(dec + 90) / bin⌋     ∈ [0, dec_bins)
//!  ra_idx  = ⌊(ra + 180) / bin⌋     ∈ [0, ra_bins)
//! ```
//!
//! ## Out-of-range accumulations
//!
//! A direction whose indices fall outside the grid (`dec = +90°` exactly, a right
//! ascension that was not folded into `[-180, 180)`, NaN from a pole singularity, …)
//! is **dropped**: a warning is logged, the drop is counted in
//! [`SkyHistogram::dropped`], and the run continues.
//!
//! ## Export
//!
//! [`SkyHistogram::export`] writes one text line per declination row, **north first**,
//! with space-separated integer counts divided by a caller-supplied divisor (the
//! oversampling factor for time-scrambled maps).
use std::fs::File;
use std::io::{BufWriter, Write};

use camino::Utf8Path;
use itertools::Itertools;
use log::warn;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{Degree, BIN_SIZE, DEC_BINS, RA_BINS};
use crate::kcdc_errors::KcdcError;

/// Binning of a sky map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyGrid {
    pub dec_bins: usize,
    pub ra_bins: usize,
    /// Bin width in degrees, shared by both axes
    pub bin_size: Degree,
}

impl Default for SkyGrid {
    fn default() -> Self {
        SkyGrid {
            dec_bins: DEC_BINS,
            ra_bins: RA_BINS,
            bin_size: BIN_SIZE,
        }
    }
}

/// Direction falling outside a [`SkyGrid`].
///
/// The raw (floored) indices are kept for diagnostics; they may be NaN.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("sky bin out of range: dec={dec}, ra={ra} -> (dec_idx={dec_index}, ra_idx={ra_index})")]
pub struct BinOutOfRange {
    pub dec: Degree,
    pub ra: Degree,
    pub dec_index: f64,
    pub ra_index: f64,
}

impl SkyGrid {
    /// Check that the grid is usable: non-empty, positive finite bin width.
    pub fn validate(&self) -> Result<(), KcdcError> {
        if self.dec_bins == 0 || self.ra_bins == 0 {
            return Err(KcdcError::InvalidParameter(
                "sky grid must have at least one bin per axis".into(),
            ));
        }
        if !(self.bin_size.is_finite() && self.bin_size > 0.0) {
            return Err(KcdcError::InvalidParameter("sky grid bin size must be > 0".into()));
        }
        Ok(())
    }

    /// Declination span covered by the grid, degrees
    pub fn dec_span(&self) -> Degree {
        self.dec_bins as f64 * self.bin_size
    }

    /// Right-ascension span covered by the grid, degrees
    pub fn ra_span(&self) -> Degree {
        self.ra_bins as f64 * self.bin_size
    }

    /// Bin indices of a direction.
    ///
    /// Arguments
    /// -----------------
    /// * `dec`: declination in degrees.
    /// * `ra`: right ascension in degrees, `[-180, 180)` convention.
    ///
    /// Return
    /// ----------
    /// * `(dec_idx, ra_idx)` or [`BinOutOfRange`] when either index leaves the grid or
    ///   is not a number.
    pub fn bin_index(&self, dec: Degree, ra: Degree) -> Result<(usize, usize), BinOutOfRange> {
        let dec_index = ((dec + 90.0) / self.bin_size).floor();
        let ra_index = ((ra + 180.0) / self.bin_size).floor();

        // NaN fails both comparisons
        let dec_ok = dec_index >= 0.0 && dec_index < self.dec_bins as f64;
        let ra_ok = ra_index >= 0.0 && ra_index < self.ra_bins as f64;

        if dec_ok && ra_ok {
            Ok((dec_index as usize, ra_index as usize))
        } else {
            Err(BinOutOfRange {
                dec,
                ra,
                dec_index,
                ra_index,
            })
        }
    }
}

/// Count map over a [`SkyGrid`].
///
/// Rows are declination bins (south → north), columns right-ascension bins.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyHistogram {
    label: String,
    grid: SkyGrid,
    counts: DMatrix<u64>,
    dropped: u64,
}

impl SkyHistogram {
    /// Zero-filled histogram. `label` only appears in log messages.
    pub fn new(label: impl Into<String>, grid: SkyGrid) -> Self {
        SkyHistogram {
            label: label.into(),
            grid,
            counts: DMatrix::zeros(grid.dec_bins, grid.ra_bins),
            dropped: 0,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn grid(&self) -> &SkyGrid {
        &self.grid
    }

    /// Raw counts, `dec_bins × ra_bins`.
    pub fn counts(&self) -> &DMatrix<u64> {
        &self.counts
    }

    /// Count of one bin.
    pub fn get(&self, dec_idx: usize, ra_idx: usize) -> Option<u64> {
        self.counts.get((dec_idx, ra_idx)).copied()
    }

    /// Add one event at `(dec, ra)`.
    ///
    /// A direction outside the grid is not fatal: it is logged, counted in
    /// [`SkyHistogram::dropped`] and handed back as the error.
    pub fn increment(&mut self, dec: Degree, ra: Degree) -> Result<(), BinOutOfRange> {
        match self.grid.bin_index(dec, ra) {
            Ok(idx) => {
                self.counts[idx] += 1;
                Ok(())
            }
            Err(err) => {
                warn!("{} map: {err}, accumulation dropped", self.label);
                self.dropped += 1;
                Err(err)
            }
        }
    }

    /// Sum of all bins.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of accumulations rejected as out of range.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Add the counts of another histogram over the same grid.
    ///
    /// Used to combine partial maps accumulated independently; the result does not depend
    /// on the order of the merges.
    pub fn merge(&mut self, other: &SkyHistogram) -> Result<(), KcdcError> {
        if self.grid != other.grid {
            return Err(KcdcError::InvalidParameter(format!(
                "cannot merge sky maps with different grids ({:?} vs {:?})",
                self.grid, other.grid
            )));
        }
        self.counts += &other.counts;
        self.dropped += other.dropped;
        Ok(())
    }

    /// Write the map as text, north row first.
    ///
    /// Arguments
    /// -----------------
    /// * `writer`: destination.
    /// * `divisor`: every count is integer-divided by this value (1 for a raw export).
    ///
    /// Errors
    /// ----------
    /// * [`KcdcError::InvalidParameter`] if `divisor` is 0.
    /// * [`KcdcError::IoError`] on write failure.
    pub fn export<W: Write>(&self, mut writer: W, divisor: u64) -> Result<(), KcdcError> {
        if divisor == 0 {
            return Err(KcdcError::InvalidParameter("sky map divisor must be >= 1".into()));
        }

        for row in (0..self.grid.dec_bins).rev() {
            let line = self.counts.row(row).iter().map(|c| c / divisor).join(" ");
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// [`SkyHistogram::export`] into a new file at `path`.
    pub fn write_to_path(&self, path: &Utf8Path, divisor: u64) -> Result<(), KcdcError> {
        let file = File::create(path).map_err(|source| KcdcError::OpenFile {
            path: path.to_string(),
            source,
        })?;
        self.export(BufWriter::new(file), divisor)
    }
}
