/// Tick-driven executor owning the effect state
pub mod executor;
/// Spine, wing and follower growth
pub mod growth;
/// Hole welding and island pruning
pub mod integrity;
/// Effect state, branch identifiers and active blocks
pub mod state;
/// Pluggable spine layouts
pub mod strategy;
