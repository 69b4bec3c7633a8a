//! Unit-of-work generation for the Kepler science pipeline.
//!
//! A pipeline launch covers a cadence range, a set of CCD channels or a span
//! of Kepler IDs. The generators here split that launch into independent
//! tasks, each small enough for one worker, by running a prototype task
//! through a fixed sequence of binners.

pub mod binner;
pub mod collaborator;
pub mod error;
pub mod focal_plane;
pub mod generator;
pub mod params;
pub mod task;

pub use collaborator::CatalogLookup;
pub use collaborator::InMemoryCatalog;
pub use collaborator::InMemoryLogStore;
pub use collaborator::LogStore;
pub use error::BinningError;
pub use generator::UnitOfWorkTaskGenerator;
pub use params::UowParameters;
pub use task::IntRange;
pub use task::UnitOfWorkTask;
