//! Binners split unit-of-work tasks into smaller tasks along one axis each:
//! cadences, target tables, channels, sky groups or Kepler IDs.
//!
//! Range splitters hand back tasks whose ranges exactly tile the input range.
//! Group splitters hand back one task per group or channel batch.

pub mod cadence;
pub mod dead_channel;
pub mod integer;
pub mod kepler_id_chunk;
pub mod kic_group;
pub mod mod_out;
pub mod sky_group;
pub mod target_table;
