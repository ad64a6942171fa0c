//! # Celestial reference frames
//!
//! Conversions between the three frames an air-shower direction is expressed in:
//!
//! ```text
//! Horizontal (az, zenith) --(site, GST)--> Equatorial (ra, dec) --(galactic pole)--> Galactic (l, b)
//! ```
//!
//! ## Conventions
//!
//! - All public angles are in **degrees**; radians are only used internally.
//! - The azimuth entering [`horizontal_to_equatorial`] is measured **from the south**,
//!   positive toward the west (Meeus, *Astronomical Algorithms*, ch. 13). Detector
//!   azimuths are converted by [`EventRecord::south_azimuth`](crate::events::EventRecord::south_azimuth).
//! - The right ascension returned by [`horizontal_to_equatorial`] lies in `[0, 360)`;
//!   the galactic longitude returned by [`equatorial_to_galactic`] lies in `[0, 360)`.
//!   The `[-180, 180)` convention used by the sky maps is applied by the callers.
//! - The site longitude is **subtracted** from the Greenwich sidereal angle.
//!
//! ## Numerical edge cases
//!
//! Neither transform guards the poles. At `dec = ±90°` the `tan δ` term of the galactic
//! conversion is infinite; the resulting values are passed on unchanged and any NaN ends
//! up rejected by the sky-map index check.
use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::constants::{
    Degree, JulianDate, DEG2RAD, DPI, GAL_LON0, GAL_N_POLE_DEC, GAL_N_POLE_RA, PI_2, RAD2DEG,
    SEC2RAD,
};
use crate::conversion::normalize_to_360;
use crate::observer::ObserverSite;
use crate::time::greenwich_sidereal_time;

/// Direction in the local horizontal frame of a site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Horizontal {
    /// Azimuth measured from the south toward the west, degrees
    pub azimuth: Degree,
    /// Zenith angle, degrees
    pub zenith: Degree,
}

/// Equatorial coordinates of date.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Equatorial {
    pub ra: Degree,
    pub dec: Degree,
}

/// Galactic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Galactic {
    pub lon: Degree,
    pub lat: Degree,
}

/// Orientation of the galactic frame with respect to the equatorial frame.
///
/// Fields
/// -----------------
/// * `ra`, `dec`: equatorial position of the galactic north pole, degrees.
/// * `lon0`: galactic longitude of the north celestial pole, degrees.
///
/// The default uses the J2000 values (192.859508°, 27.128336°, 122.932°).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GalacticPole {
    pub ra: Degree,
    pub dec: Degree,
    pub lon0: Degree,
}

impl Default for GalacticPole {
    fn default() -> Self {
        GalacticPole {
            ra: GAL_N_POLE_RA,
            dec: GAL_N_POLE_DEC,
            lon0: GAL_LON0,
        }
    }
}

/// Convert a horizontal direction observed at `jd` from `site` into equatorial coordinates.
///
/// The hour angle and the declination follow from the spherical triangle
/// pole–zenith–source:
///
/// ```text
/// H   = atan2(sin A, cos A·sin φ + tan h·cos φ)
/// δ   = asin(sin φ·sin h − cos φ·cos h·cos A)
/// α   = GST − H − λ
/// ```
///
/// with `A` the south-based azimuth, `h = 90° − zenith` the altitude, `φ`/`λ` the site
/// latitude/longitude and GST from [`greenwich_sidereal_time`].
///
/// Arguments
/// -----------------
/// * `azimuth`: south-based azimuth in degrees.
/// * `zenith`: zenith angle in degrees.
/// * `jd`: Julian Date of the observation.
/// * `site`: observing site.
///
/// Return
/// ----------
/// * [`Equatorial`] with `ra ∈ [0, 360)` and `dec ∈ [-90, 90]`.
pub fn horizontal_to_equatorial(
    azimuth: Degree,
    zenith: Degree,
    jd: JulianDate,
    site: &ObserverSite,
) -> Equatorial {
    let az = azimuth * DEG2RAD;
    let height = PI_2 - zenith * DEG2RAD;
    let (sin_lat, cos_lat) = site.sin_cos_latitude();
    let (sin_az, cos_az) = az.sin_cos();

    let hour_angle = sin_az.atan2(cos_az * sin_lat + height.tan() * cos_lat);

    let gst = greenwich_sidereal_time(jd) * SEC2RAD;
    let ra = normalize_to_360((gst - hour_angle - site.longitude_rad()) * RAD2DEG);
    let dec = (sin_lat * height.sin() - cos_lat * height.cos() * cos_az).asin() * RAD2DEG;

    Equatorial { ra, dec }
}

/// Same conversion as [`horizontal_to_equatorial`], computed as a rotation of the unit
/// direction vector instead of the closed-form spherical-triangle relations.
///
/// The horizontal frame (x south, y west, z zenith) is rotated about the west axis by the
/// colatitude of the site, giving the hour-angle frame (x toward `H = 0` on the equator,
/// y toward `H = 90°`, z toward the celestial pole). This form has no `tan h` term and
/// stays well conditioned at the zenith; both agree to better than 1e-6° elsewhere.
pub fn horizontal_to_equatorial_rotation(
    horizontal: &Horizontal,
    jd: JulianDate,
    site: &ObserverSite,
) -> Equatorial {
    let az = horizontal.azimuth * DEG2RAD;
    let height = PI_2 - horizontal.zenith * DEG2RAD;

    let local = Vector3::new(
        height.cos() * az.cos(),
        height.cos() * az.sin(),
        height.sin(),
    );
    let to_hour_angle = Rotation3::from_axis_angle(&Vector3::y_axis(), PI_2 - site.latitude_rad());
    let v = to_hour_angle * local;

    let hour_angle = v.y.atan2(v.x);
    let dec = v.z.clamp(-1.0, 1.0).asin() * RAD2DEG;

    let gst = greenwich_sidereal_time(jd) * SEC2RAD;
    let ra = normalize_to_360((gst - hour_angle - site.longitude_rad()) * RAD2DEG);

    Equatorial { ra, dec }
}

/// Convert equatorial coordinates into galactic coordinates.
///
/// ```text
/// x = atan2(sin(αp − α), cos(αp − α)·sin δp − tan δ·cos δp)
/// b = asin(sin δ·sin δp + cos δ·cos δp·cos(αp − α))
/// l = (π + l0 − x) mod 2π
/// ```
///
/// Arguments
/// -----------------
/// * `equatorial`: position with `ra` in degrees (any turn) and `dec` in degrees.
/// * `pole`: orientation of the galactic frame.
///
/// Return
/// ----------
/// * [`Galactic`] with `lon ∈ [0, 360)` and `lat ∈ [-90, 90]`.
///
/// Notes
/// ----------
/// * At `dec = ±90°` the result is not meaningful (`tan δ` diverges); no guard is applied.
pub fn equatorial_to_galactic(equatorial: &Equatorial, pole: &GalacticPole) -> Galactic {
    let dra = (pole.ra - equatorial.ra) * DEG2RAD;
    let dec = equatorial.dec * DEG2RAD;
    let pole_dec = pole.dec * DEG2RAD;

    let x = dra
        .sin()
        .atan2(dra.cos() * pole_dec.sin() - dec.tan() * pole_dec.cos());
    let sin_lat = dec.sin() * pole_dec.sin() + dec.cos() * pole_dec.cos() * dra.cos();
    let lat = sin_lat.asin() * RAD2DEG;
    let lon = ((std::f64::consts::PI + pole.lon0 * DEG2RAD - x) % DPI) * RAD2DEG;

    Galactic { lon, lat }
}
