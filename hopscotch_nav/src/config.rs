// Tuning parameters for navmesh construction and jump solving.
//
// `RegionParams` shapes one agent's navigation region (scan radius, hitbox
// footprint, jump window) and `JumpParams` tunes the kinematic jump solver.
// Both are plain serde structs so a host can load them from JSON alongside
// the rest of its data; `Default` gives the infantry preset (16x40 hitbox,
// 8x10 tile jump window). Gravity is not stored here: agents report their
// own gravity each tick.
//
// See also: `nav.rs` which consumes `RegionParams`, `jump.rs` which consumes
// `JumpParams`, and the `hopscotch_agent` crate's `config.rs` which nests
// both inside a per-archetype `AgentProfile`.
//
// **Critical constraint: validated before use.** `validate()` rejects
// non-positive extents. Construction code assumes validated values and never
// re-checks them per tile.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A parameter that failed validation: which field, and why.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{field}: {reason}")]
pub struct InvalidParam {
    pub field: &'static str,
    pub reason: &'static str,
}

fn require_positive(field: &'static str, value: f32) -> Result<(), InvalidParam> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(InvalidParam {
            field,
            reason: "must be positive and finite",
        })
    }
}

// ---------------------------------------------------------------------------
// Region parameters
// ---------------------------------------------------------------------------

/// Shape of the tile window scanned around an agent and of the agent itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionParams {
    /// Half-extent of the scanned window in tiles. The window covers
    /// `[-radius, radius)` on both axes around the centre tile.
    pub radius_tiles: i32,
    /// Agent hitbox width in world units. Jumps shorter than the width in
    /// tiles are never generated.
    pub hitbox_width: f32,
    /// Agent hitbox height in world units. Sets the headroom a node needs.
    pub hitbox_height: f32,
    /// Largest horizontal jump, in tiles.
    pub max_jump_horizontal: i32,
    /// Largest vertical jump (up or down), in tiles. Also caps the height of
    /// the jump profile arc.
    pub max_jump_vertical: i32,
}

impl RegionParams {
    /// Hitbox width rounded up to whole tiles.
    pub fn width_tiles(&self) -> i32 {
        crate::types::footprint_tiles(self.hitbox_width)
    }

    /// Hitbox height rounded up to whole tiles: the headroom a node needs.
    pub fn height_tiles(&self) -> i32 {
        crate::types::footprint_tiles(self.hitbox_height)
    }

    pub fn validate(&self) -> Result<(), InvalidParam> {
        if self.radius_tiles <= 0 {
            return Err(InvalidParam {
                field: "radius_tiles",
                reason: "must be at least 1",
            });
        }
        require_positive("hitbox_width", self.hitbox_width)?;
        require_positive("hitbox_height", self.hitbox_height)?;
        if self.max_jump_horizontal < 0 || self.max_jump_vertical < 0 {
            return Err(InvalidParam {
                field: "max_jump",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}

impl Default for RegionParams {
    fn default() -> Self {
        Self {
            radius_tiles: 100,
            hitbox_width: 16.0,
            hitbox_height: 40.0,
            max_jump_horizontal: 8,
            max_jump_vertical: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Jump parameters
// ---------------------------------------------------------------------------

/// Tuning for `JumpSolver`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JumpParams {
    /// Cap on horizontal launch speed, world units per tick.
    pub max_horizontal_speed: f32,
    /// Horizontal distances up to this many tiles try the vertical-first
    /// strategy (reach the required height, then drift across).
    pub vertical_first_max_tiles: f32,
    /// Extra upward speed added by the horizontal-first strategy so the arc
    /// clears lips at the landing tile.
    pub horizontal_first_bias: f32,
    /// A stalled jump is nudged by `max_horizontal_speed / stall_nudge_divisor`.
    pub stall_nudge_divisor: f32,
}

impl JumpParams {
    pub fn validate(&self) -> Result<(), InvalidParam> {
        require_positive("max_horizontal_speed", self.max_horizontal_speed)?;
        require_positive("stall_nudge_divisor", self.stall_nudge_divisor)?;
        if self.vertical_first_max_tiles < 0.0 || self.horizontal_first_bias < 0.0 {
            return Err(InvalidParam {
                field: "jump_tuning",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}

impl Default for JumpParams {
    fn default() -> Self {
        Self {
            max_horizontal_speed: 3.0,
            vertical_first_max_tiles: 3.0,
            horizontal_first_bias: 0.25,
            stall_nudge_divisor: 16.0,
        }
    }
}
