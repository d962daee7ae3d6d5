// Per-agent behaviour state machine.
//
// Each `Agent` is ticked once per simulation tick with read access to the
// world, mutable access to its `AgentBody` (hitbox and velocity, owned by the
// host's physics) and the target picked by `targeting.rs` this tick. The
// driver only writes velocity and facing; the host integrates motion and
// resolves collisions between ticks.
//
// States:
// - Idle:           friction; start seeking once a target has been known
//                   for `seek_delay_ticks`.
// - WaitingForPath: on entry, remap around the agent and plan from the
//                   tiles under its feet; retry every `repath_interval_ticks`.
// - Navigating:     steer along walk and fall edges, advancing as each edge's
//                   target is reached. Hands jump edges to Jumping.
// - Jumping:        launch once with the jump solver, nudge stalls, and
//                   once the body has left the ground, check the landing
//                   tile against the edge.
// - Attack:         friction; drop back to Idle when the target is gone and
//                   repath when line of sight is lost.
//
// Every transition resets the state timer and runs the entry hook for the
// new state, so `WaitingForPath` may resolve to `Navigating` within the same
// tick. "Path lost" (stuck, stale footing, bad landing, lost sight) clears
// the path, stops horizontal motion and re-enters WaitingForPath.
//
// `tick_all` ticks many agents in parallel with rayon; agents share nothing
// but the read-only world.
//
// See also: `hopscotch_nav::pathfinding` for `PathSearch`,
// `hopscotch_nav::jump` for the launch solver, `goal.rs` for how path
// requests pick a destination, `config.rs` for every constant used here.
//
// **Critical constraint: the tick never fails.** Anomalies are logged with
// `warn!` and recovered by losing the path; nothing here returns an error
// or panics.

use crate::config::AgentProfile;
use crate::goal::{LineOfSightGoal, NearestToPoint};
use crate::targeting::Target;
use hopscotch_nav::world::{has_line_of_sight, tiles_below};
use hopscotch_nav::{
    EdgeKind, Hitbox, JumpSolver, NavEdge, NavRegion, PathSearch, PathState, TileQuery, WorldPos,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Horizontal speeds below this snap to zero while walking.
const WALK_SPEED_EPSILON: f32 = 0.02;
/// Horizontal distance at which a walk or fall edge's target counts as reached.
const ARRIVE_X: f32 = 2.0;
/// Vertical distance at which a fall edge's target counts as reached.
const ARRIVE_Y: f32 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    Idle,
    WaitingForPath,
    Navigating,
    Jumping,
    Attack,
}

/// The physical body the host simulates for an agent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentBody {
    pub hitbox: Hitbox,
    /// World units per tick. Negative `y` is upward.
    pub velocity: WorldPos,
    /// Downward acceleration per tick, as applied by the host.
    pub gravity: f32,
    /// -1 facing left, 1 facing right.
    pub facing: i32,
}

impl AgentBody {
    pub fn new(hitbox: Hitbox, gravity: f32) -> Self {
        Self {
            hitbox,
            velocity: WorldPos::ZERO,
            gravity,
            facing: 1,
        }
    }

    fn face(&mut self, direction: f32) {
        if direction != 0.0 {
            self.facing = if direction > 0.0 { 1 } else { -1 };
        }
    }
}

/// One agent's behaviour state, path and tuning.
#[derive(Clone, Debug)]
pub struct Agent {
    profile: AgentProfile,
    state: AgentState,
    timer: u32,
    search: PathSearch<NearestToPoint>,
    solver: JumpSolver,
    last_position: Option<WorldPos>,
    stuck_ticks: u32,
    launched: bool,
    /// Set once nothing is underfoot after launch. Landings only count
    /// after that.
    airborne: bool,
    jump_direction: f32,
}

impl Agent {
    pub fn new(profile: AgentProfile) -> Self {
        let search = PathSearch::new(NavRegion::new(profile.region.clone()), NearestToPoint::default());
        let solver = JumpSolver::new(profile.jump.clone());
        Self {
            state: AgentState::Idle,
            timer: profile.spawn_idle_ticks,
            search,
            solver,
            last_position: None,
            stuck_ticks: 0,
            launched: false,
            airborne: false,
            jump_direction: 0.0,
            profile,
        }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn search(&self) -> &PathSearch<NearestToPoint> {
        &self.search
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Ticks spent in the current state (or since the last periodic check).
    pub fn timer(&self) -> u32 {
        self.timer
    }

    /// Advance one simulation tick. Returns the state after the tick.
    pub fn tick<W: TileQuery + ?Sized>(
        &mut self,
        world: &W,
        body: &mut AgentBody,
        target: Option<&Target>,
    ) -> AgentState {
        let position = body.hitbox.top_left();
        let moved = self.last_position != Some(position);
        self.last_position = Some(position);

        if let Some(target) = target {
            self.search.selector_mut().point = Some(target.center());
        }

        match self.state {
            AgentState::Idle => self.tick_idle(world, body, target),
            AgentState::WaitingForPath => self.tick_waiting(world, body, target),
            AgentState::Navigating => self.tick_navigating(world, body, target, moved),
            AgentState::Jumping => self.tick_jumping(world, body, target, moved),
            AgentState::Attack => self.tick_attack(world, body, target),
        }

        self.state
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn transition<W: TileQuery + ?Sized>(
        &mut self,
        next: AgentState,
        world: &W,
        body: &mut AgentBody,
        target: Option<&Target>,
    ) {
        debug!(from = ?self.state, to = ?next, "agent state change");
        self.state = next;
        self.timer = 0;
        match next {
            AgentState::WaitingForPath => self.enter_waiting(world, body, target),
            AgentState::Navigating => self.stuck_ticks = 0,
            AgentState::Jumping => {
                self.launched = false;
                self.airborne = false;
                self.stuck_ticks = 0;
            }
            AgentState::Idle | AgentState::Attack => {}
        }
    }

    fn enter_waiting<W: TileQuery + ?Sized>(&mut self, world: &W, body: &mut AgentBody, target: Option<&Target>) {
        if self.request_path(world, body, target) {
            self.transition(AgentState::Navigating, world, body, target);
        }
    }

    fn path_lost<W: TileQuery + ?Sized>(&mut self, world: &W, body: &mut AgentBody, target: Option<&Target>) {
        body.velocity.x = 0.0;
        self.search.clear();
        self.launched = false;
        self.airborne = false;
        self.transition(AgentState::WaitingForPath, world, body, target);
    }

    /// Step past the edge just completed. Attack once the path runs out.
    fn edge_completed<W: TileQuery + ?Sized>(&mut self, world: &W, body: &mut AgentBody, target: Option<&Target>) {
        self.search.advance();
        if self.search.is_exhausted() {
            self.transition(AgentState::Attack, world, body, target);
        }
    }

    /// Remap around the agent and plan from the first tile under its feet
    /// that yields a path. Airborne agents defer.
    fn request_path<W: TileQuery + ?Sized>(&mut self, world: &W, body: &AgentBody, target: Option<&Target>) -> bool {
        let footing = tiles_below(world, &body.hitbox);
        if footing.is_empty() {
            trace!("airborne, deferring path request");
            return false;
        }

        let center = body.hitbox.center();
        self.search.remap(world, center);

        for &origin in &footing {
            let outcome = match target {
                Some(target) => {
                    let mut goal = LineOfSightGoal::new(world, center, target.center(), body.hitbox.height);
                    self.search.start_path_with(origin, &mut goal)
                }
                None => self.search.start_path(origin),
            };
            debug!(%origin, ?outcome, "path request");
            if outcome.started() {
                return true;
            }
        }
        false
    }

    // -----------------------------------------------------------------------
    // Per-state ticks
    // -----------------------------------------------------------------------

    fn tick_idle<W: TileQuery + ?Sized>(&mut self, world: &W, body: &mut AgentBody, target: Option<&Target>) {
        body.velocity.x *= self.profile.idle_friction;
        self.timer = self.timer.saturating_add(1);
        if target.is_some() && self.timer >= self.profile.seek_delay_ticks {
            self.transition(AgentState::WaitingForPath, world, body, target);
        }
    }

    fn tick_waiting<W: TileQuery + ?Sized>(&mut self, world: &W, body: &mut AgentBody, target: Option<&Target>) {
        body.velocity.x = 0.0;
        self.timer += 1;
        if self.timer >= self.profile.repath_interval_ticks {
            self.timer = 0;
            if self.request_path(world, body, target) {
                self.transition(AgentState::Navigating, world, body, target);
            }
        }
    }

    fn tick_navigating<W: TileQuery + ?Sized>(
        &mut self,
        world: &W,
        body: &mut AgentBody,
        target: Option<&Target>,
        moved: bool,
    ) {
        match self.search.state() {
            PathState::AtGoal => return self.transition(AgentState::Attack, world, body, target),
            PathState::NoPath => return self.path_lost(world, body, target),
            PathState::HasPath => {}
        }

        if moved {
            self.stuck_ticks = 0;
        } else {
            self.stuck_ticks += 1;
            if self.stuck_ticks > self.profile.stuck_limit_ticks {
                warn!(ticks = self.stuck_ticks, "agent stuck, path lost");
                self.stuck_ticks = 0;
                return self.path_lost(world, body, target);
            }
        }

        let Some(&edge) = self.search.current_edge() else {
            return self.path_lost(world, body, target);
        };

        match edge.kind {
            EdgeKind::Walk | EdgeKind::Fall => {
                if self.steer(body, &edge) {
                    return self.edge_completed(world, body, target);
                }
            }
            EdgeKind::Jump => return self.transition(AgentState::Jumping, world, body, target),
        }

        let footing = tiles_below(world, &body.hitbox);
        if !footing.is_empty() && !footing.iter().any(|&c| self.search.region().contains(c)) {
            warn!(tiles = ?footing.as_slice(), "standing off the navmesh, path lost");
            self.path_lost(world, body, target);
        }
    }

    /// Accelerate toward a walk or fall edge's target tile. Returns whether
    /// the target has been reached.
    fn steer(&self, body: &mut AgentBody, edge: &NavEdge) -> bool {
        let goal = edge.to.coord().world_center();
        let feet = body.hitbox.bottom();
        let direction = sign(goal.x - feet.x);

        let max = self.profile.max_walk_speed;
        let mut vx = (body.velocity.x + self.profile.walk_acceleration * direction).clamp(-max, max);
        if vx.abs() < WALK_SPEED_EPSILON {
            vx = 0.0;
        }
        if edge.kind == EdgeKind::Fall && body.velocity.y != 0.0 {
            vx *= self.profile.fall_air_control;
        }
        body.velocity.x = vx;
        body.face(vx);
        trace!(kind = ?edge.kind, to = %edge.to.coord(), vx, "steering");

        let close_x = (goal.x - feet.x).abs() < ARRIVE_X;
        match edge.kind {
            EdgeKind::Fall => close_x && (goal.y - feet.y).abs() < ARRIVE_Y,
            _ => close_x,
        }
    }

    fn tick_jumping<W: TileQuery + ?Sized>(
        &mut self,
        world: &W,
        body: &mut AgentBody,
        target: Option<&Target>,
        moved: bool,
    ) {
        let Some(&edge) = self.search.current_edge() else {
            return self.path_lost(world, body, target);
        };

        if !self.launched {
            let start = body.hitbox.bottom();
            let end = edge.to.coord().world_top_center();
            let solution = self.solver.solve(start, end, body.gravity);
            debug!(%start, %end, strategy = ?solution.strategy, velocity = %solution.velocity, "jump launched");
            body.velocity = solution.velocity;
            self.jump_direction = sign(end.x - start.x);
            body.face(self.jump_direction);
            self.launched = true;
            return;
        }

        body.velocity = self.solver.nudge_stalled(body.velocity, self.jump_direction);
        body.face(body.velocity.x);

        let footing = tiles_below(world, &body.hitbox);
        if footing.is_empty() {
            self.airborne = true;
            return;
        }

        // Downward jumps leave with vy > 0 and may still be sliding off the
        // launch tile. Only a body pinned there for too long gives up.
        if !self.airborne {
            if moved {
                self.stuck_ticks = 0;
            } else {
                self.stuck_ticks += 1;
                if self.stuck_ticks > self.profile.stuck_limit_ticks {
                    warn!(ticks = self.stuck_ticks, "jump never left the ground, path lost");
                    self.stuck_ticks = 0;
                    return self.path_lost(world, body, target);
                }
            }
            return;
        }

        if body.velocity.y < 0.0 {
            return;
        }

        self.launched = false;
        self.airborne = false;
        if !footing.iter().any(|&c| self.search.region().contains(c)) {
            warn!(tiles = ?footing.as_slice(), "landed off the navmesh, path lost");
            return self.path_lost(world, body, target);
        }
        if !footing.contains(&edge.to.coord()) {
            debug!(expected = %edge.to.coord(), tiles = ?footing.as_slice(), "landed short of the jump target");
            return self.path_lost(world, body, target);
        }

        self.edge_completed(world, body, target);
        if self.state == AgentState::Jumping {
            self.transition(AgentState::Navigating, world, body, target);
        }
    }

    fn tick_attack<W: TileQuery + ?Sized>(&mut self, world: &W, body: &mut AgentBody, target: Option<&Target>) {
        body.velocity.x *= self.profile.attack_friction;

        let Some(target) = target else {
            return self.transition(AgentState::Idle, world, body, None);
        };

        let center = body.hitbox.center();
        body.face(target.center().x - center.x);

        self.timer += 1;
        if self.timer > self.profile.attack_sight_check_ticks {
            self.timer = 0;
            let eye = body.hitbox.bottom() - WorldPos::new(0.0, body.hitbox.height / 2.0);
            if !has_line_of_sight(world, target.center(), eye) {
                debug!("lost sight of target");
                self.path_lost(world, body, Some(target));
            }
        }
    }
}

/// -1, 0 or 1. Unlike `f32::signum`, zero maps to zero.
fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Tick every agent in parallel. `agents`, `bodies` and `targets` are
/// matched by index and must have equal lengths; otherwise nothing is
/// ticked and a warning is logged.
pub fn tick_all<W: TileQuery + Sync + ?Sized>(
    world: &W,
    agents: &mut [Agent],
    bodies: &mut [AgentBody],
    targets: &[Option<Target>],
) {
    if agents.len() != bodies.len() || agents.len() != targets.len() {
        warn!(
            agents = agents.len(),
            bodies = bodies.len(),
            targets = targets.len(),
            "mismatched tick_all inputs, skipping tick"
        );
        return;
    }

    agents
        .par_iter_mut()
        .zip(bodies.par_iter_mut())
        .zip(targets.par_iter())
        .for_each(|((agent, body), target)| {
            agent.tick(world, body, target.as_ref());
        });
}
