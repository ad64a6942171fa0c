//! # Run parameters
//!
//! All knobs of the two pipelines live in [`KcdcParams`]. The defaults reproduce the
//! standard KASCADE analysis:
//!
//! | Parameter                | Default                          |
//! |--------------------------|----------------------------------|
//! | `site`                   | KASCADE (49.0994°, 8.4378°)      |
//! | `galactic_pole`          | (192.859508°, 27.128336°, 122.932°) |
//! | `grid`                   | 360 × 720 bins of 0.5°           |
//! | `emin`, `emax`           | `f64::MIN`, `f64::MAX` (no cut)  |
//! | `block_size`             | 100 000                          |
//! | `oversampling`           | 20                               |
//! | `seed`                   | 42                               |
//! | `max_distance`           | 0 (no cut)                       |
//! | `distance_target`        | RA −52°, Dec 40.95°              |
//! | `projection`             | none                             |
//! | `strict`                 | false (lenient parsing)          |
//! | `resample_partial_block` | true                             |
//!
//! Custom parameters are built with [`KcdcParams::builder`], which validates the set in
//! [`KcdcParamsBuilder::build`], or loaded from JSON with [`KcdcParams::from_json_path`]
//! (missing keys take their default).
use std::fs::File;
use std::io::BufReader;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BLOCK_SIZE, DEFAULT_OVERSAMPLING, DEFAULT_SEED, DIST_TARGET_DEC, DIST_TARGET_RA,
};
use crate::kcdc_errors::KcdcError;
use crate::observer::ObserverSite;
use crate::ref_system::{Equatorial, GalacticPole};
use crate::skymap::SkyGrid;

/// Optional projection applied to the derived coordinates of the augmented output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Projection {
    /// Plain spherical coordinates
    #[default]
    None,
    /// Hammer–Aitoff equal-area projection of (RA, Dec) and (l, b)
    HammerAitoff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KcdcParams {
    // --- Geometry ---
    pub site: ObserverSite,
    pub galactic_pole: GalacticPole,
    pub grid: SkyGrid,

    // --- Event selection ---
    /// Sky-map only: inclusive energy cut, in the units of the `E` column
    pub emin: f64,
    pub emax: f64,
    /// Augmentation only: keep records within this distance of `distance_target`
    /// (degrees, ≤ 0 disables the cut)
    pub max_distance: f64,
    /// Reference direction of the distance cut, RA in `[-180, 180)`
    pub distance_target: Equatorial,

    // --- Background estimation ---
    pub block_size: usize,
    pub oversampling: u32,
    pub seed: u64,
    pub resample_partial_block: bool,

    // --- I/O ---
    pub projection: Projection,
    pub strict: bool,
}

impl KcdcParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`KcdcParamsBuilder`] starting from the defaults.
    ///
    /// ```rust
    /// use kcdc_sky::params::KcdcParams;
    ///
    /// let params = KcdcParams::builder()
    ///     .energy_range(6.0, 8.0)
    ///     .oversampling(10)
    ///     .seed(7)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(params.oversampling, 10);
    /// ```
    pub fn builder() -> KcdcParamsBuilder {
        KcdcParamsBuilder::new()
    }

    /// Load parameters from a JSON file and validate them.
    ///
    /// Keys absent from the file keep their default value.
    pub fn from_json_path(path: &Utf8Path) -> Result<Self, KcdcError> {
        let file = File::open(path).map_err(|source| KcdcError::OpenFile {
            path: path.to_string(),
            source,
        })?;
        let params: KcdcParams = serde_json::from_reader(BufReader::new(file))?;
        KcdcParamsBuilder { params }.build()
    }

    /// Whether `energy` passes the inclusive `[emin, emax]` cut.
    #[inline]
    pub fn accepts_energy(&self, energy: f64) -> bool {
        energy >= self.emin && energy <= self.emax
    }
}

impl Default for KcdcParams {
    fn default() -> Self {
        KcdcParams {
            site: ObserverSite::kascade(),
            galactic_pole: GalacticPole::default(),
            grid: SkyGrid::default(),

            emin: f64::MIN,
            emax: f64::MAX,
            max_distance: 0.0,
            distance_target: Equatorial {
                ra: DIST_TARGET_RA,
                dec: DIST_TARGET_DEC,
            },

            block_size: DEFAULT_BLOCK_SIZE,
            oversampling: DEFAULT_OVERSAMPLING,
            seed: DEFAULT_SEED,
            resample_partial_block: true,

            projection: Projection::None,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KcdcParamsBuilder {
    params: KcdcParams,
}

impl KcdcParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: KcdcParams::default(),
        }
    }

    /// Start from an existing parameter set (e.g. loaded from JSON) and override it.
    pub fn from_params(params: KcdcParams) -> Self {
        Self { params }
    }

    pub fn site(mut self, v: ObserverSite) -> Self {
        self.params.site = v;
        self
    }
    pub fn galactic_pole(mut self, v: GalacticPole) -> Self {
        self.params.galactic_pole = v;
        self
    }
    pub fn grid(mut self, v: SkyGrid) -> Self {
        self.params.grid = v;
        self
    }

    pub fn emin(mut self, v: f64) -> Self {
        self.params.emin = v;
        self
    }
    pub fn emax(mut self, v: f64) -> Self {
        self.params.emax = v;
        self
    }
    pub fn energy_range(self, emin: f64, emax: f64) -> Self {
        self.emin(emin).emax(emax)
    }
    pub fn max_distance(mut self, v: f64) -> Self {
        self.params.max_distance = v;
        self
    }
    pub fn distance_target(mut self, ra: f64, dec: f64) -> Self {
        self.params.distance_target = Equatorial { ra, dec };
        self
    }

    pub fn block_size(mut self, v: usize) -> Self {
        self.params.block_size = v;
        self
    }
    pub fn oversampling(mut self, v: u32) -> Self {
        self.params.oversampling = v;
        self
    }
    pub fn seed(mut self, v: u64) -> Self {
        self.params.seed = v;
        self
    }
    pub fn resample_partial_block(mut self, v: bool) -> Self {
        self.params.resample_partial_block = v;
        self
    }

    pub fn projection(mut self, v: Projection) -> Self {
        self.params.projection = v;
        self
    }
    pub fn strict(mut self, v: bool) -> Self {
        self.params.strict = v;
        self
    }

    /// Validate and return the parameters.
    ///
    /// Errors
    /// ----------
    /// * [`KcdcError::InvalidParameter`] naming the first offending parameter.
    pub fn build(self) -> Result<KcdcParams, KcdcError> {
        let p = &self.params;

        if !p.site.is_valid() {
            return Err(KcdcError::InvalidParameter("site latitude must lie in [-90, 90]".into()));
        }
        let pole = &p.galactic_pole;
        if !(pole.ra.is_finite() && pole.dec.is_finite() && pole.lon0.is_finite()) {
            return Err(KcdcError::InvalidParameter("galactic pole must be finite".into()));
        }

        p.grid.validate()?;
        // Tolerance for bin sizes such as 1/3°
        if p.grid.dec_span() < 180.0 - 1e-9 || p.grid.ra_span() < 360.0 - 1e-9 {
            return Err(KcdcError::InvalidParameter(format!(
                "sky grid covers {}° x {}°, must cover 180° x 360°",
                p.grid.dec_span(),
                p.grid.ra_span()
            )));
        }

        // NaN bounds fail here too
        if !(p.emin <= p.emax) {
            return Err(KcdcError::InvalidParameter("require emin <= emax".into()));
        }
        if !p.max_distance.is_finite() {
            return Err(KcdcError::InvalidParameter("max_distance must be finite".into()));
        }
        let target = &p.distance_target;
        if !(target.ra.is_finite() && target.dec.is_finite() && target.dec.abs() < 90.0) {
            return Err(KcdcError::InvalidParameter(
                "distance target declination must lie in (-90, 90)".into(),
            ));
        }

        if p.block_size == 0 {
            return Err(KcdcError::InvalidParameter("block_size must be >= 1".into()));
        }
        if p.oversampling == 0 {
            return Err(KcdcError::InvalidParameter("oversampling must be >= 1".into()));
        }

        Ok(self.params)
    }
}
