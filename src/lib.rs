//! # kcdc-sky
//!
//! Arrival-direction sky maps from KASCADE Cosmic-ray Data Centre (KCDC) air-shower
//! exports.
//!
//! Every record carries a reconstructed arrival direction in the local horizontal frame
//! (zenith, azimuth) and a UTC time stamp. The crate converts it to equatorial and
//! galactic coordinates and offers two passes over a file:
//!
//! * **field augmentation** ([`pipeline::augment`]): the records are echoed with their
//!   RA, Dec, galactic l/b, Julian Date and distance to a target direction;
//! * **sky-map statistics** ([`pipeline::statistics`]): a real count map and an
//!   isotropic background estimated by time scrambling ([`scrambler`]).
//!
//! ```rust, no_run
//! use camino::Utf8Path;
//! use kcdc_sky::params::KcdcParams;
//! use kcdc_sky::pipeline::statistics;
//!
//! let params = KcdcParams::builder()
//!     .energy_range(6.0, 8.0)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! let summary = statistics(
//!     Utf8Path::new("kcdc_export.txt"),
//!     Utf8Path::new("maps/run"),
//!     &params,
//! )
//! .unwrap();
//! println!("{} events in the real map", summary.real_binned);
//! ```
pub mod constants;
pub mod conversion;
pub mod events;
pub mod kcdc_errors;
pub mod observer;
pub mod params;
pub mod pipeline;
pub mod progress;
pub mod ref_system;
pub mod scrambler;
pub mod skymap;
pub mod time;

pub use events::{reader::EventReader, EventRecord, SkyPosition};
pub use kcdc_errors::KcdcError;
pub use observer::ObserverSite;
pub use params::{KcdcParams, KcdcParamsBuilder, Projection};
pub use skymap::{SkyGrid, SkyHistogram};
