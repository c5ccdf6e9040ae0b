//! Input/output operations, configuration and error handling

/// Command-line interface and headless driver
pub mod cli;
/// Effect constants and runtime configuration
pub mod configuration;
/// Error types and result alias
pub mod error;
/// PNG export of the coverage mask
pub mod image;
/// Terminal progress display
pub mod progress;
/// Serializable snapshots and the snapshot cache
pub mod snapshot;
/// Frame capture and GIF export
pub mod visualization;
