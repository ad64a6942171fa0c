//! # Constants and type definitions for kcdc-sky
//!
//! This module centralizes the **physical constants**, **unit conversion factors**, and
//! **unit type aliases** used by the time converter, the coordinate transformer and the
//! sky-map accumulator.
//!
//! ## Overview
//!
//! - Angle conversions (degrees ↔ radians, sidereal seconds → radians)
//! - Time constants (Julian Date of J2000.0, sidereal/solar day ratio)
//! - Reference site of the KASCADE array (Karlsruhe)
//! - Galactic north pole and galactic-centre longitude offset
//! - Default sky-map geometry and resampling parameters
//!
//! None of these values are read directly by the pipelines: they only seed the
//! `Default` implementations of [`ObserverSite`](crate::observer::ObserverSite),
//! [`GalacticPole`](crate::ref_system::GalacticPole), [`SkyGrid`](crate::skymap::SkyGrid)
//! and [`KcdcParams`](crate::params::KcdcParams), which are what the pipelines consume.

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// π/2
pub const PI_2: f64 = std::f64::consts::FRAC_PI_2;

/// Degrees → radians
pub const DEG2RAD: f64 = std::f64::consts::PI / 180.0;

/// Radians → degrees
pub const RAD2DEG: f64 = 180.0 / std::f64::consts::PI;

/// Sidereal seconds → radians (1 h = π/12 rad)
pub const SEC2RAD: f64 = std::f64::consts::PI / 12.0 / 3600.0;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

// -------------------------------------------------------------------------------------------------
// Time
// -------------------------------------------------------------------------------------------------

/// Julian Date of J2000.0 (2000-01-01 12:00:00)
pub const J2000: f64 = 2_451_545.0;

/// Days per Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Ratio of the sidereal rotation rate to the solar day
pub const SIDEREAL_RATIO: f64 = 1.00273790935;

/// Mean sidereal time at 0h UT, polynomial coefficients in seconds (Horner order, T⁰ first)
pub const GST_COEFFS: [f64; 4] = [24110.54841, 8640184.812866, 0.093104, 0.0000062];

// -------------------------------------------------------------------------------------------------
// Sites and reference frames
// -------------------------------------------------------------------------------------------------

/// Latitude of the KASCADE array in degrees
pub const KASCADE_LATITUDE: f64 = 49.0994;

/// Longitude of the KASCADE array in degrees
pub const KASCADE_LONGITUDE: f64 = 8.4378;

/// Right ascension of the galactic north pole (degrees)
pub const GAL_N_POLE_RA: f64 = 192.859508;

/// Declination of the galactic north pole (degrees)
pub const GAL_N_POLE_DEC: f64 = 27.128336;

/// Galactic longitude of the ascending node of the galactic plane (degrees)
pub const GAL_LON0: f64 = 122.932;

// -------------------------------------------------------------------------------------------------
// Sky map and resampling defaults
// -------------------------------------------------------------------------------------------------

/// Number of declination bins of the default sky map
pub const DEC_BINS: usize = 360;

/// Number of right-ascension bins of the default sky map
pub const RA_BINS: usize = 720;

/// Bin width of the default sky map, in degrees
pub const BIN_SIZE: f64 = 0.5;

/// Events buffered before one time-scrambling pass
pub const DEFAULT_BLOCK_SIZE: usize = 100_000;

/// Scrambled copies generated per real event
pub const DEFAULT_OVERSAMPLING: u32 = 20;

/// Seed of the resampling random stream
pub const DEFAULT_SEED: u64 = 42;

/// Default target of the `DIST` column: right ascension in [-180, 180) degrees
pub const DIST_TARGET_RA: f64 = -52.0;

/// Default target of the `DIST` column: declination in degrees
pub const DIST_TARGET_DEC: f64 = 40.95;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Julian Date (days)
pub type JulianDate = f64;
/// Sidereal time in seconds
pub type Seconds = f64;
