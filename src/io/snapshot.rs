//! Serializable effect snapshots and a tick-keyed snapshot cache
//!
//! A snapshot holds everything needed to resume an effect: the three layer
//! grids, the op log, the finished branches, the active block list and the
//! current tick. The render grid is derived and rebuilt on restore.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithm::state::{ActiveBlock, EffectState, FinishedBranches};
use crate::io::configuration::{LAYER_COUNT, MAX_SNAPSHOTS, SNAPSHOT_INTERVAL};
use crate::io::error::{EffectError, Result};
use crate::mask::ops::MaskOpLog;
use crate::spatial::grid::{LayeredLogicGrid, Tick};
use crate::spatial::render::RenderGrid;

/// Full effect state in serializable form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSnapshot {
    /// Grid columns
    pub width: usize,
    /// Grid rows
    pub height: usize,
    /// Row-major activation ticks per layer
    pub layers: Vec<Vec<Tick>>,
    /// Recorded mask operations
    pub ops: MaskOpLog,
    /// Terminated branches
    pub finished: FinishedBranches,
    /// Active cells in spawn order
    pub active_blocks: Vec<ActiveBlock>,
    /// Last tick run
    pub current_tick: Tick,
}

impl EffectSnapshot {
    /// Copy the persistent parts of `state`
    pub fn capture(state: &EffectState) -> Self {
        Self {
            width: state.grid.width(),
            height: state.grid.height(),
            layers: (0..LAYER_COUNT)
                .map(|layer| state.grid.layer_values(layer))
                .collect(),
            ops: state.ops.clone(),
            finished: state.finished.clone(),
            active_blocks: state.active_blocks.clone(),
            current_tick: state.current_tick,
        }
    }

    /// Rebuild an effect state, deriving a fresh render grid
    ///
    /// # Errors
    ///
    /// Returns an error if the layer data does not match the recorded dimensions
    /// or a recorded op fails validation
    pub fn to_state(&self) -> Result<EffectState> {
        for op in &self.ops {
            op.validate()?;
        }
        let grid = LayeredLogicGrid::from_layers(self.width, self.height, self.layers.clone())?;
        let mut render = RenderGrid::try_new(self.width, self.height)?;
        render.refresh(&grid);
        Ok(EffectState {
            grid,
            ops: self.ops.clone(),
            finished: self.finished.clone(),
            active_blocks: self.active_blocks.clone(),
            render,
            current_tick: self.current_tick,
        })
    }

    /// Encode as JSON
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::Snapshot`] if serialization fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::Snapshot`] if the text is not a valid snapshot
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Write the snapshot as JSON to `path`
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = self.to_json()?;
        std::fs::write(path, text).map_err(|source| EffectError::FileSystem {
            path: path.to_path_buf(),
            operation: "write snapshot",
            source,
        })
    }

    /// Read a JSON snapshot from `path`
    ///
    /// # Errors
    ///
    /// Returns an error if reading or decoding fails
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EffectError::FileSystem {
            path: path.to_path_buf(),
            operation: "read snapshot",
            source,
        })?;
        Self::from_json(&text)
    }
}

/// Snapshots taken at regular tick intervals for fast rewinding
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    snapshots: BTreeMap<Tick, EffectSnapshot>,
    interval: Tick,
    capacity: usize,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(SNAPSHOT_INTERVAL, MAX_SNAPSHOTS)
    }
}

impl SnapshotCache {
    /// Cache keeping every `interval`-th tick, at most `capacity` entries
    pub const fn new(interval: Tick, capacity: usize) -> Self {
        Self {
            snapshots: BTreeMap::new(),
            interval,
            capacity,
        }
    }

    /// True when `tick` falls on the caching interval
    pub const fn is_due(&self, tick: Tick) -> bool {
        self.interval > 0 && tick % self.interval == 0
    }

    /// Store a snapshot under its tick if due and not already cached
    ///
    /// Evicts the oldest entry once the cache is full. Returns whether the
    /// snapshot was stored.
    pub fn store(&mut self, snapshot: EffectSnapshot) -> bool {
        let tick = snapshot.current_tick;
        if !self.is_due(tick) || self.snapshots.contains_key(&tick) || self.capacity == 0 {
            return false;
        }
        if self.snapshots.len() >= self.capacity {
            self.snapshots.pop_first();
        }
        self.snapshots.insert(tick, snapshot);
        true
    }

    /// Latest snapshot at or before `tick`
    pub fn nearest(&self, tick: Tick) -> Option<&EffectSnapshot> {
        self.snapshots
            .range(..=tick)
            .next_back()
            .map(|(_, snapshot)| snapshot)
    }

    /// Drop every snapshot at or after `tick`
    pub fn invalidate_from(&mut self, tick: Tick) {
        self.snapshots.retain(|&cached, _| cached < tick);
    }

    /// Drop every snapshot
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Number of cached snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
