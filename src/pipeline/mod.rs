//! # Processing pipelines
//!
//! Both passes read a KCDC export through [`EventReader`](crate::events::reader::EventReader)
//! and share the coordinate conversions of [`crate::ref_system`].
//!
//! * [`augment`] – streaming pass, one output line per input record with the derived sky
//!   coordinates appended.
//! * [`statistics`] – buffered pass producing the real and time-scrambled sky maps.
pub mod augment;
pub mod statistics;

pub use augment::{augment, augment_stream, AugmentSummary};
pub use statistics::{accumulate, output_paths, statistics, SkyMapSummary, SkyMaps};
