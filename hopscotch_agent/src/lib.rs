// hopscotch_agent — per-tick behaviour for agents navigating with hopscotch_nav.
//
// This crate turns the navigation core into agents that pick a target, plan
// toward a spot where they can see it, walk, fall and jump along the plan,
// and recover when the world shifts under them. It reads the world through
// `hopscotch_nav::TileQuery` and writes only the agent's own velocity, so the
// host keeps full ownership of physics.
//
// Module overview:
// - `config.rs`:    AgentProfile + ArchetypeRegistry, serde-loaded per-archetype tuning.
// - `targeting.rs`: Candidate filtering and weighted-distance ranking.
// - `goal.rs`:      LineOfSightGoal / NearestToPoint goal selection policies.
// - `driver.rs`:    Agent state machine (Idle, WaitingForPath, Navigating,
//                   Jumping, Attack) and the parallel `tick_all`.
//
// **Critical constraint: no shared mutable state.** Each agent owns its
// profile copy, navmesh and path. The world is only ever borrowed
// immutably, which is what lets `tick_all` run agents in parallel.

pub mod config;
pub mod driver;
pub mod goal;
pub mod targeting;

pub use config::{AgentProfile, ArchetypeRegistry, ConfigError};
pub use driver::{Agent, AgentBody, AgentState, tick_all};
pub use goal::{LineOfSightGoal, NearestToPoint};
pub use targeting::{Candidate, Target, TargetKind, rank_targets, select_target};
