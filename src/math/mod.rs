//! Mathematical utilities for stochastic growth

/// Random sources and burst sizing
pub mod probability;
