//! Procedural quantized block growth rendered through a layered raster mask
//!
//! A block structure grows outward from a center origin one tick at a time,
//! is kept free of holes and islands, and is painted into a coverage mask by an
//! ordered sequence of compositing passes with timed fades.

#![forbid(unsafe_code)]

/// Growth scheduling, structural repair and the tick executor
pub mod algorithm;
/// Configuration, errors, snapshots, export and the command-line driver
pub mod io;
/// Mask operations, the coverage surface and the compositor
pub mod mask;
/// Random sources and burst sizing
pub mod math;
/// Layered grids, render grid and distance field
pub mod spatial;

pub use algorithm::executor::QuantizedEffect;
pub use io::configuration::EffectConfig;
pub use io::error::{EffectError, Result};
