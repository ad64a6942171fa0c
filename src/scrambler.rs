//! # Time scrambling
//!
//! Estimate of the isotropic background sky from the data themselves.
//!
//! Accepted events are buffered into blocks of `N`. When a block is full, every event `i`
//! of the block is re-projected `K` times onto the sky, each time keeping its own local
//! arrival direction (azimuth, zenith) but borrowing the time stamp of an event `j` drawn
//! uniformly from the same block. The resulting background map has `K` times the
//! statistics of the real map and is divided by `K` on export.
//!
//! Since a detector's acceptance is fixed in local coordinates, mixing directions and
//! times within a block washes out any anisotropy in right ascension while preserving
//! the declination exposure and the time-dependent rate.
//!
//! The random source is a single [`StdRng`] seeded once; the same seed, input and
//! `K` give a bit-identical background map.
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::{Degree, JulianDate};
use crate::conversion::convert_range_to_180;
use crate::events::EventRecord;
use crate::kcdc_errors::KcdcError;
use crate::observer::ObserverSite;
use crate::ref_system::horizontal_to_equatorial;
use crate::skymap::SkyHistogram;

/// The part of an event the resampler needs.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BlockEntry {
    /// South-based azimuth, degrees
    azimuth: Degree,
    zenith: Degree,
    julian_date: JulianDate,
}

impl From<&EventRecord> for BlockEntry {
    fn from(rec: &EventRecord) -> Self {
        BlockEntry {
            azimuth: rec.south_azimuth(),
            zenith: rec.zenith,
            julian_date: rec.julian_date(),
        }
    }
}

/// Outcome of one resampling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResampleStats {
    /// Events of the block
    pub events: usize,
    /// Draws performed (`events × K`)
    pub draws: u64,
    /// Draws that landed in the background map
    pub binned: u64,
    /// Earliest and latest Julian Date of the block
    pub time_span: Option<(JulianDate, JulianDate)>,
}

/// Buffered block resampler.
#[derive(Debug, Clone)]
pub struct TimeScrambler {
    block_size: usize,
    oversampling: u32,
    site: ObserverSite,
    rng: StdRng,
    block: Vec<BlockEntry>,
    blocks_resampled: u64,
    events_resampled: u64,
}

impl TimeScrambler {
    /// Create a resampler.
    ///
    /// Arguments
    /// -----------------
    /// * `block_size`: number of events per block `N` (≥ 1).
    /// * `oversampling`: number of draws per event `K` (≥ 1).
    /// * `seed`: seed of the random generator.
    /// * `site`: observing site used for the re-projection.
    ///
    /// Errors
    /// ----------
    /// * [`KcdcError::InvalidParameter`] if `block_size` or `oversampling` is 0.
    pub fn new(
        block_size: usize,
        oversampling: u32,
        seed: u64,
        site: ObserverSite,
    ) -> Result<Self, KcdcError> {
        if block_size == 0 {
            return Err(KcdcError::InvalidParameter("block size must be >= 1".into()));
        }
        if oversampling == 0 {
            return Err(KcdcError::InvalidParameter("oversampling factor must be >= 1".into()));
        }

        Ok(TimeScrambler {
            block_size,
            oversampling,
            site,
            rng: StdRng::seed_from_u64(seed),
            block: Vec::with_capacity(block_size),
            blocks_resampled: 0,
            events_resampled: 0,
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn oversampling(&self) -> u32 {
        self.oversampling
    }

    /// Events currently buffered
    pub fn pending(&self) -> usize {
        self.block.len()
    }

    pub fn blocks_resampled(&self) -> u64 {
        self.blocks_resampled
    }

    pub fn events_resampled(&self) -> u64 {
        self.events_resampled
    }

    /// Buffer an accepted event.
    ///
    /// The block never grows past `block_size`: once `push` returns `true` the caller
    /// must run [`TimeScrambler::resample_block`] before pushing again.
    ///
    /// Return
    /// ----------
    /// * `true` once the block holds `block_size` events.
    ///
    /// Panics
    /// ----------
    /// * In debug builds, when called on a full block.
    pub fn push(&mut self, record: &EventRecord) -> bool {
        debug_assert!(
            self.block.len() < self.block_size,
            "push on a full block of {} events",
            self.block_size
        );
        self.block.push(BlockEntry::from(record));
        self.block.len() >= self.block_size
    }

    /// Resample the buffered block into `background`, then clear the block.
    ///
    /// For every event `i` and each of the `K` draws, `j` is drawn uniformly in
    /// `[0, len)`; the direction `(azimuth_i, zenith_i)` is converted at the time of `j`
    /// and accumulated with its right ascension in `[-180, 180)`. An empty block is a
    /// no-op.
    pub fn resample_block(&mut self, background: &mut SkyHistogram) -> ResampleStats {
        let len = self.block.len();
        if len == 0 {
            return ResampleStats::default();
        }

        let mut stats = ResampleStats {
            events: len,
            ..Default::default()
        };

        for i in 0..len {
            let entry = self.block[i];

            for _ in 0..self.oversampling {
                let j = self.rng.random_range(0..len);
                let jd = self.block[j].julian_date;
                let eq = horizontal_to_equatorial(entry.azimuth, entry.zenith, jd, &self.site);

                stats.draws += 1;
                if background
                    .increment(eq.dec, convert_range_to_180(eq.ra))
                    .is_ok()
                {
                    stats.binned += 1;
                }
            }
        }

        stats.time_span = self.time_span();

        self.block.clear();
        self.blocks_resampled += 1;
        self.events_resampled += len as u64;
        stats
    }

    /// Handle the trailing partial block at end of input.
    ///
    /// Arguments
    /// -----------------
    /// * `background`: background map.
    /// * `resample_partial`: resample the leftover events if `true`, discard them otherwise.
    ///
    /// Return
    /// ----------
    /// * The stats of the last pass, or `None` if nothing was resampled.
    pub fn finish(
        &mut self,
        background: &mut SkyHistogram,
        resample_partial: bool,
    ) -> Option<ResampleStats> {
        if self.block.is_empty() {
            return None;
        }
        if resample_partial {
            Some(self.resample_block(background))
        } else {
            log::info!(
                "Discarding {} events of the trailing partial block",
                self.block.len()
            );
            self.block.clear();
            None
        }
    }

    fn time_span(&self) -> Option<(JulianDate, JulianDate)> {
        self.block
            .iter()
            .map(|e| e.julian_date)
            .minmax_by(f64::total_cmp)
            .into_option()
    }
}

#[cfg(test)]
mod scrambler_test {
    use super::*;
    use crate::ref_system::GalacticPole;
    use crate::skymap::SkyGrid;

    fn event(zenith: f64, azimuth: f64, ymd: u64, hms: u64) -> EventRecord {
        EventRecord {
            zenith,
            azimuth,
            ymd,
            hms,
            ..Default::default()
        }
    }

    fn sample_events() -> Vec<EventRecord> {
        vec![
            event(44.2007, 7.4743, 19980702, 145647),
            event(12.5, 200.0, 20000108, 33015),
            event(30.0, 90.0, 19990315, 221500),
            event(5.0, 300.0, 20011231, 235959),
            event(20.0, 45.0, 19970610, 120000),
        ]
    }

    fn background() -> SkyHistogram {
        SkyHistogram::new("fake", SkyGrid::default())
    }

    #[test]
    fn test_invalid_construction() {
        let site = ObserverSite::default();
        assert!(TimeScrambler::new(0, 20, 42, site.clone()).is_err());
        assert!(TimeScrambler::new(10, 0, 42, site).is_err());
    }

    #[test]
    fn test_push_reports_full_block() {
        let mut s = TimeScrambler::new(3, 1, 1, ObserverSite::default()).unwrap();
        let events = sample_events();
        assert!(!s.push(&events[0]));
        assert!(!s.push(&events[1]));
        assert!(s.push(&events[2]));
        assert_eq!(s.pending(), 3);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "push on a full block")]
    fn test_push_past_full_block_panics() {
        let mut s = TimeScrambler::new(2, 1, 1, ObserverSite::default()).unwrap();
        let events = sample_events();
        s.push(&events[0]);
        assert!(s.push(&events[1]));
        s.push(&events[2]);
    }

    #[test]
    fn test_block_sum_is_k_times_events() {
        let mut s = TimeScrambler::new(5, 7, 42, ObserverSite::default()).unwrap();
        let mut fake = background();
        for e in &sample_events() {
            s.push(e);
        }

        let stats = s.resample_block(&mut fake);
        assert_eq!(stats.events, 5);
        assert_eq!(stats.draws, 35);
        assert_eq!(stats.binned, 35);
        assert_eq!(fake.total(), 35);
        assert_eq!(fake.dropped(), 0);
    }

    #[test]
    fn test_block_is_cleared_once() {
        let mut s = TimeScrambler::new(2, 3, 42, ObserverSite::default()).unwrap();
        let mut fake = background();
        let events = sample_events();

        s.push(&events[0]);
        s.push(&events[1]);
        s.resample_block(&mut fake);
        assert_eq!(s.pending(), 0);
        assert_eq!(s.blocks_resampled(), 1);

        // the next block only sees its own events
        s.push(&events[2]);
        s.push(&events[3]);
        let stats = s.resample_block(&mut fake);
        assert_eq!(stats.events, 2);
        assert_eq!(s.events_resampled(), 4);
        assert_eq!(fake.total(), 12);
    }

    #[test]
    fn test_single_event_block_reproduces_real_position() {
        let site = ObserverSite::default();
        let rec = sample_events().remove(0);
        let mut s = TimeScrambler::new(1, 4, 9, site.clone()).unwrap();
        let mut fake = background();

        assert!(s.push(&rec));
        s.resample_block(&mut fake);

        let pos = rec.sky_position(&site, &GalacticPole::default());
        let (di, ri) = fake
            .grid()
            .bin_index(pos.equatorial.dec, pos.equatorial.ra)
            .unwrap();
        assert_eq!(fake.get(di, ri), Some(4));
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let run = |seed: u64| {
            let mut s = TimeScrambler::new(5, 20, seed, ObserverSite::default()).unwrap();
            let mut fake = background();
            for e in &sample_events() {
                s.push(e);
            }
            s.resample_block(&mut fake);
            fake
        };

        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_empty_block_is_noop() {
        let mut s = TimeScrambler::new(4, 2, 42, ObserverSite::default()).unwrap();
        let mut fake = background();
        assert_eq!(s.resample_block(&mut fake), ResampleStats::default());
        assert_eq!(s.blocks_resampled(), 0);
        assert!(s.finish(&mut fake, true).is_none());
    }

    #[test]
    fn test_finish_partial_block() {
        let events = sample_events();

        let mut keep = TimeScrambler::new(10, 2, 42, ObserverSite::default()).unwrap();
        let mut fake = background();
        events.iter().take(3).for_each(|e| {
            keep.push(e);
        });
        let stats = keep.finish(&mut fake, true).unwrap();
        assert_eq!(stats.draws, 6);
        assert_eq!(fake.total(), 6);

        let mut drop = TimeScrambler::new(10, 2, 42, ObserverSite::default()).unwrap();
        let mut fake = background();
        events.iter().take(3).for_each(|e| {
            drop.push(e);
        });
        assert!(drop.finish(&mut fake, false).is_none());
        assert_eq!(drop.pending(), 0);
        assert_eq!(fake.total(), 0);
    }
}
