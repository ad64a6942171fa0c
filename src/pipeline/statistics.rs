//! # Sky-map statistics
//!
//! Buffered pass producing the two sky maps of an anisotropy search:
//!
//! * the **real** map: every accepted event at its own equatorial position,
//! * the **fake** map: the time-scrambled background from [`TimeScrambler`], divided by
//!   the oversampling factor on export.
//!
//! Events outside the inclusive energy range `[emin, emax]` enter neither map. The maps
//! are written as `<base>.nreal.dat` and `<base>.nfake.dat` (see
//! [`SkyHistogram::export`] for the layout).
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use serde::Serialize;

use crate::conversion::convert_range_to_180;
use crate::events::reader::EventReader;
use crate::kcdc_errors::KcdcError;
use crate::params::KcdcParams;
use crate::progress::{fmt_dur, BlockTimer, Progress};
use crate::scrambler::{ResampleStats, TimeScrambler};
use crate::skymap::SkyHistogram;
use crate::time::epoch_from_julian_date;

/// Real and background maps of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyMaps {
    pub real: SkyHistogram,
    pub fake: SkyHistogram,
}

/// Counters of a sky-map run, serializable as the JSON run summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkyMapSummary {
    /// Records read (blank lines excluded)
    pub records: u64,
    /// Records inside the energy range
    pub accepted: u64,
    /// Records outside the energy range
    pub rejected: u64,
    /// Accepted records counted in the real map
    pub real_binned: u64,
    pub real_dropped: u64,
    pub blocks_resampled: u64,
    pub events_resampled: u64,
    /// Accepted records of a discarded trailing block
    pub events_discarded: u64,
    pub fake_draws: u64,
    pub fake_binned: u64,
    pub fake_dropped: u64,
    pub block_size: usize,
    pub oversampling: u32,
    pub seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_map: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fake_map: Option<String>,
}

impl SkyMapSummary {
    /// Write the summary as pretty-printed JSON.
    pub fn write_json(&self, path: &Utf8Path) -> Result<(), KcdcError> {
        let file = File::create(path).map_err(|source| KcdcError::OpenFile {
            path: path.to_string(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    fn add_pass(&mut self, stats: &ResampleStats) {
        self.fake_draws += stats.draws;
        self.fake_binned += stats.binned;
    }
}

/// `<base>.nreal.dat` and `<base>.nfake.dat`.
///
/// The suffixes are appended to `base` as is, so `run.2024` gives `run.2024.nreal.dat`.
pub fn output_paths(base: &Utf8Path) -> (Utf8PathBuf, Utf8PathBuf) {
    (
        Utf8PathBuf::from(format!("{base}.nreal.dat")),
        Utf8PathBuf::from(format!("{base}.nfake.dat")),
    )
}

fn log_pass(index: u64, stats: &ResampleStats, timer: &BlockTimer) {
    match stats.time_span {
        Some((first, last)) => info!(
            "Block {index}: {} events from {} to {}, {} draws",
            stats.events,
            epoch_from_julian_date(first),
            epoch_from_julian_date(last),
            stats.draws
        ),
        None => info!("Block {index}: {} events", stats.events),
    }
    debug!("Average resampling time per block: {}", fmt_dur(timer.average()));
}

/// Accumulate both maps from a stream of records.
///
/// Arguments
/// -----------------
/// * `reader`: source of records (its header is ignored).
/// * `params`: site, grid, energy range and resampling settings.
///
/// Return
/// ----------
/// * The maps and the run counters. Output paths in the summary are left empty.
pub fn accumulate<R: BufRead>(
    reader: EventReader<R>,
    params: &KcdcParams,
) -> Result<(SkyMaps, SkyMapSummary), KcdcError> {
    let mut real = SkyHistogram::new("real", params.grid);
    let mut fake = SkyHistogram::new("fake", params.grid);
    let mut scrambler = TimeScrambler::new(
        params.block_size,
        params.oversampling,
        params.seed,
        params.site.clone(),
    )?;

    let mut summary = SkyMapSummary {
        block_size: params.block_size,
        oversampling: params.oversampling,
        seed: params.seed,
        ..Default::default()
    };
    let mut progress = Progress::new("skymap");
    let mut timer = BlockTimer::new(0.2);

    for item in reader {
        let (_, record) = item?;
        progress.line();
        summary.records += 1;

        if !params.accepts_energy(record.energy) {
            summary.rejected += 1;
            continue;
        }
        summary.accepted += 1;

        let eq = record.equatorial_at(record.julian_date(), &params.site);
        if real.increment(eq.dec, convert_range_to_180(eq.ra)).is_ok() {
            summary.real_binned += 1;
        }

        if scrambler.push(&record) {
            let (stats, _) = timer.time(|| scrambler.resample_block(&mut fake));
            summary.add_pass(&stats);
            log_pass(scrambler.blocks_resampled(), &stats, &timer);
        }
    }

    let pending = scrambler.pending() as u64;
    match scrambler.finish(&mut fake, params.resample_partial_block) {
        Some(stats) => {
            summary.add_pass(&stats);
            log_pass(scrambler.blocks_resampled(), &stats, &timer);
        }
        None => summary.events_discarded = pending,
    }
    progress.finish();

    summary.real_dropped = real.dropped();
    summary.fake_dropped = fake.dropped();
    summary.blocks_resampled = scrambler.blocks_resampled();
    summary.events_resampled = scrambler.events_resampled();

    Ok((SkyMaps { real, fake }, summary))
}

/// Run the sky-map pass on the KCDC file `input` and write both maps next to `base`.
///
/// Return
/// ----------
/// * The run counters, with the paths of the written maps.
pub fn statistics(
    input: &Utf8Path,
    base: &Utf8Path,
    params: &KcdcParams,
) -> Result<SkyMapSummary, KcdcError> {
    let reader = EventReader::open(input, params.strict)?;
    info!(
        "Building sky maps from {input}: E in [{:e}, {:e}], N = {}, K = {}, seed = {}",
        params.emin, params.emax, params.block_size, params.oversampling, params.seed
    );

    let (maps, mut summary) = accumulate(reader, params)?;

    let (real_path, fake_path) = output_paths(base);
    maps.real.write_to_path(&real_path, 1)?;
    maps.fake.write_to_path(&fake_path, u64::from(params.oversampling))?;
    info!("Wrote {real_path} and {fake_path}");

    summary.real_map = Some(real_path.into_string());
    summary.fake_map = Some(fake_path.into_string());
    Ok(summary)
}
