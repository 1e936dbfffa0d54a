//! # Contracts
//!
//! Frozen data contracts shared by the telemetry crates.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Units
//! - Timestamps are milliseconds (f64), speeds m/s, accelerations m/s²
//! - Positions and distances are reconstructed world units

mod car;
mod car_id;
mod engine_config;
mod error;
mod event;
mod lap;
mod model;
mod race;
mod sample;
mod summary;
mod track;

pub use car::*;
pub use car_id::CarId;
pub use engine_config::*;
pub use error::*;
pub use event::*;
pub use lap::*;
pub use model::*;
pub use race::RaceType;
pub use sample::*;
pub use summary::*;
pub use track::*;
