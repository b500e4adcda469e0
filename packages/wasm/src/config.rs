//! Tuning knobs for the object manager.

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};
use crate::sleep::FRAMES_BEFORE_SLEEP;

/// Below this many tracked objects, a linear scan beats the index.
pub const SMALL_SCENE_THRESHOLD: usize = 8;

/// Configuration for an [`crate::manager::ObjectManager`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexConfig {
    /// Idle frames before an object may fall asleep (default: 60).
    pub frames_before_sleep: u32,
    /// Object count below which `search` returns every object without
    /// consulting the index (default: 8).
    pub small_scene_threshold: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            frames_before_sleep: FRAMES_BEFORE_SLEEP as u32,
            small_scene_threshold: SMALL_SCENE_THRESHOLD,
        }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<()> {
        if self.frames_before_sleep == 0 {
            return Err(IndexError::InvalidConfig(
                "framesBeforeSleep must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
