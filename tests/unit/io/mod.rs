pub mod configuration;
pub mod progress;
