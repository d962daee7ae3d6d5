// Kinematic jump solver.
//
// Turns a jump edge into a launch velocity. Motion is ballistic under
// constant gravity pulling toward +y (screen down):
//
//     p(t) = start + v t + ½ g t² ŷ
//
// Two strategies:
// - Vertical-first: launch with enough upward speed to rise to the target
//   height plus one tick of gravity (`vy = -sqrt(2 g rise) - g`), take the
//   later root of the vertical equation as the flight time, and derive `vx`
//   from it. Good for short, tall hops.
// - Horizontal-first: cross at up to the maximum horizontal speed, derive
//   the flight time from that, and solve `vy` for the vertical displacement,
//   with a small extra upward bias. Always defined.
//
// `solve()` prefers vertical-first for jumps within
// `vertical_first_max_tiles` horizontally when it lands the agent without
// clamping `vx`, and falls back to horizontal-first otherwise.
//
// See also: `nav.rs` for the jump profile (a cheap clearance curve, not
// this trajectory), the `hopscotch_agent` crate's `driver.rs` which launches
// agents with `solve()` and nudges stalled jumps.

use crate::config::JumpParams;
use crate::types::{TILE_SIZE, WorldPos};
use thiserror::Error;

/// Why a strategy could not produce a launch velocity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum JumpError {
    #[error("target is above the reachable apex")]
    ApexTooLow,
    #[error("no positive flight time lands on the target")]
    NoPositiveRoot,
    #[error("gravity must be positive")]
    NonPositiveGravity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpStrategy {
    VerticalFirst,
    HorizontalFirst,
}

/// A launch velocity and the time it takes to reach the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JumpSolution {
    /// World units per tick. Negative `y` is upward.
    pub velocity: WorldPos,
    /// Ticks from launch to arrival.
    pub flight_time: f32,
    pub strategy: JumpStrategy,
}

impl JumpSolution {
    /// Position `t` ticks after launching from `start`.
    pub fn position_at(&self, start: WorldPos, gravity: f32, t: f32) -> WorldPos {
        WorldPos::new(
            start.x + self.velocity.x * t,
            start.y + self.velocity.y * t + 0.5 * gravity * t * t,
        )
    }

    /// `samples + 1` evenly timed points from launch to arrival.
    pub fn trajectory(&self, start: WorldPos, gravity: f32, samples: usize) -> Vec<WorldPos> {
        let samples = samples.max(1);
        (0..=samples)
            .map(|i| {
                let t = self.flight_time * (i as f32 / samples as f32);
                self.position_at(start, gravity, t)
            })
            .collect()
    }
}

/// Computes launch velocities for jump edges.
#[derive(Clone, Debug, Default)]
pub struct JumpSolver {
    params: JumpParams,
}

impl JumpSolver {
    pub fn new(params: JumpParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &JumpParams {
        &self.params
    }

    fn clamp_speed(&self, vx: f32) -> f32 {
        let max = self.params.max_horizontal_speed;
        vx.clamp(-max, max)
    }

    /// Rise first, then drift across. `vx` is clamped to the maximum
    /// horizontal speed, so a clamped solution falls short horizontally.
    pub fn vertical_first(
        &self,
        start: WorldPos,
        end: WorldPos,
        gravity: f32,
    ) -> Result<JumpSolution, JumpError> {
        if gravity <= 0.0 {
            return Err(JumpError::NonPositiveGravity);
        }

        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let rise = (start.y - end.y).max(0.0);

        let vy = -(2.0 * gravity * rise).sqrt() - gravity;

        // ½ g t² + vy t - dy = 0
        let discriminant = vy * vy + 2.0 * gravity * dy;
        if discriminant < 0.0 {
            return Err(JumpError::ApexTooLow);
        }

        let t = (-vy + discriminant.sqrt()) / gravity;
        if t <= 0.0 || !t.is_finite() {
            return Err(JumpError::NoPositiveRoot);
        }

        Ok(JumpSolution {
            velocity: WorldPos::new(self.clamp_speed(dx / t), vy),
            flight_time: t,
            strategy: JumpStrategy::VerticalFirst,
        })
    }

    /// Cross at up to the maximum horizontal speed, solving `vy` for the
    /// drop or climb. The flight time is `max(|dx| / max_speed, 1)` and
    /// `vx = dx / t`, so short hops cross below the cap instead of
    /// overshooting in a fraction of a tick.
    pub fn horizontal_first(&self, start: WorldPos, end: WorldPos, gravity: f32) -> JumpSolution {
        let dx = end.x - start.x;
        let dy = end.y - start.y;

        let t = (dx.abs() / self.params.max_horizontal_speed).max(1.0);
        let vx = dx / t;
        let vy = (dy - 0.5 * gravity * t * t) / t - self.params.horizontal_first_bias;

        JumpSolution {
            velocity: WorldPos::new(vx, vy),
            flight_time: t,
            strategy: JumpStrategy::HorizontalFirst,
        }
    }

    /// Pick a strategy for the jump from `start` to `end`. Rejects
    /// non-positive gravity.
    pub fn try_solve(
        &self,
        start: WorldPos,
        end: WorldPos,
        gravity: f32,
    ) -> Result<JumpSolution, JumpError> {
        if gravity <= 0.0 {
            return Err(JumpError::NonPositiveGravity);
        }

        let dx = end.x - start.x;
        if dx.abs() <= self.params.vertical_first_max_tiles * TILE_SIZE {
            if let Ok(solution) = self.vertical_first(start, end, gravity) {
                let unclamped = (dx / solution.flight_time).abs() <= self.params.max_horizontal_speed;
                if unclamped {
                    return Ok(solution);
                }
            }
        }

        Ok(self.horizontal_first(start, end, gravity))
    }

    /// Like `try_solve`, for gravity already known to be positive. Falls back
    /// to horizontal-first if it is not.
    pub fn solve(&self, start: WorldPos, end: WorldPos, gravity: f32) -> JumpSolution {
        self.try_solve(start, end, gravity)
            .unwrap_or_else(|_| self.horizontal_first(start, end, gravity))
    }

    /// Mid-air, a jump whose horizontal speed has dropped to exactly zero
    /// (typically after brushing a wall) gets a small push toward
    /// `direction`'s sign.
    pub fn nudge_stalled(&self, velocity: WorldPos, direction: f32) -> WorldPos {
        if velocity.x != 0.0 || direction == 0.0 {
            return velocity;
        }
        let push = self.params.max_horizontal_speed / self.params.stall_nudge_divisor;
        WorldPos::new(push * direction.signum(), velocity.y)
    }
}
