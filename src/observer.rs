//! # Observer site
//!
//! Geographic position of the air-shower array. The pipelines only need the latitude and
//! longitude of the site, both in **degrees**; trigonometric terms of the latitude are
//! precomputed since they enter every horizontal → equatorial conversion.
//!
//! The site is immutable once built. [`ObserverSite::default`] is the KASCADE array in
//! Karlsruhe (49.0994° N, 8.4378°).
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Radian, KASCADE_LATITUDE, KASCADE_LONGITUDE};
use crate::kcdc_errors::KcdcError;

/// Geographic position of a detector site.
///
/// Units
/// -----
/// * `latitude`: degrees, north positive.
/// * `longitude`: degrees, entering the sidereal-time relations with a **minus** sign
///   (see [`crate::ref_system::horizontal_to_equatorial`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SiteCoordinates", into = "SiteCoordinates")]
pub struct ObserverSite {
    latitude: NotNan<f64>,
    longitude: NotNan<f64>,
    name: Option<String>,
    sin_lat: f64,
    cos_lat: f64,
}

/// Serialized form of [`ObserverSite`] (the trigonometric cache is rebuilt on load).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SiteCoordinates {
    latitude: NotNan<f64>,
    longitude: NotNan<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl From<SiteCoordinates> for ObserverSite {
    fn from(c: SiteCoordinates) -> Self {
        ObserverSite::from_not_nan(c.latitude, c.longitude, c.name)
    }
}

impl From<ObserverSite> for SiteCoordinates {
    fn from(site: ObserverSite) -> Self {
        SiteCoordinates {
            latitude: site.latitude,
            longitude: site.longitude,
            name: site.name,
        }
    }
}

impl ObserverSite {
    /// Create a new site from geographic coordinates.
    ///
    /// Arguments
    /// -----------------
    /// * `latitude`: latitude in **degrees**.
    /// * `longitude`: longitude in **degrees**.
    /// * `name`: optional human-readable site name.
    ///
    /// Errors
    /// ----------
    /// * [`KcdcError::NanCoordinate`] if either coordinate is NaN.
    pub fn new(
        latitude: Degree,
        longitude: Degree,
        name: Option<String>,
    ) -> Result<ObserverSite, KcdcError> {
        Ok(ObserverSite::from_not_nan(
            NotNan::new(latitude)?,
            NotNan::new(longitude)?,
            name,
        ))
    }

    fn from_not_nan(latitude: NotNan<f64>, longitude: NotNan<f64>, name: Option<String>) -> Self {
        let (sin_lat, cos_lat) = latitude.to_radians().sin_cos();
        ObserverSite {
            latitude,
            longitude,
            name,
            sin_lat,
            cos_lat,
        }
    }

    /// The KASCADE array, Karlsruhe Institute of Technology.
    pub fn kascade() -> ObserverSite {
        ObserverSite::new(KASCADE_LATITUDE, KASCADE_LONGITUDE, Some("KASCADE".into()))
            .expect("KASCADE coordinates are finite")
    }

    /// Latitude in degrees
    pub fn latitude(&self) -> Degree {
        self.latitude.into_inner()
    }

    /// Longitude in degrees
    pub fn longitude(&self) -> Degree {
        self.longitude.into_inner()
    }

    pub fn latitude_rad(&self) -> Radian {
        self.latitude.to_radians()
    }

    pub fn longitude_rad(&self) -> Radian {
        self.longitude.to_radians()
    }

    /// `(sin φ, cos φ)` of the site latitude
    #[inline]
    pub fn sin_cos_latitude(&self) -> (f64, f64) {
        (self.sin_lat, self.cos_lat)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether both coordinates are finite and the latitude lies in `[-90, 90]`.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude())
    }
}

impl Default for ObserverSite {
    fn default() -> Self {
        ObserverSite::kascade()
    }
}
