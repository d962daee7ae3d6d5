// Target ranking.
//
// The host supplies the hostile entities near an agent as `Candidate`s; this
// module filters them by the profile's sight range and orders them by
// weighted distance: `distance / weight`, where the weight comes from
// `AgentProfile::weight_for`. A heavier weight makes a target seem closer,
// so an archetype can prefer players over reindeer without ignoring either.
//
// Faction and hostility are the host's business. Everything passed in here
// is assumed to be a legitimate target.
//
// See also: `config.rs` for the weights, `driver.rs` which consumes the
// chosen `Target` each tick.

use crate::config::AgentProfile;
use hopscotch_nav::{Hitbox, TILE_SIZE, WorldPos};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a target is, for weighting purposes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Player,
    /// Any non-player entity, by archetype name.
    Archetype(String),
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Player => write!(f, "player"),
            TargetKind::Archetype(name) => write!(f, "{name}"),
        }
    }
}

/// A potential target as seen by the host this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub kind: TargetKind,
    pub hitbox: Hitbox,
}

/// A ranked target.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub kind: TargetKind,
    /// Weighted distance. Lower is more attractive.
    pub effective_distance: f32,
    pub hitbox: Hitbox,
}

impl Target {
    pub fn center(&self) -> WorldPos {
        self.hitbox.center()
    }
}

/// In-range candidates ordered from most to least attractive. Ties keep the
/// host's order.
pub fn rank_targets(profile: &AgentProfile, agent_center: WorldPos, candidates: &[Candidate]) -> Vec<Target> {
    let sight_range = profile.max_sight_range_tiles * TILE_SIZE;

    let mut targets: Vec<Target> = candidates
        .iter()
        .filter_map(|candidate| {
            let distance = agent_center.distance(candidate.hitbox.center());
            if distance > sight_range {
                return None;
            }
            let weight = profile.weight_for(&candidate.kind);
            Some(Target {
                kind: candidate.kind.clone(),
                effective_distance: distance / weight,
                hitbox: candidate.hitbox,
            })
        })
        .collect();

    targets.sort_by(|a, b| a.effective_distance.total_cmp(&b.effective_distance));
    targets
}

/// The most attractive in-range candidate, if any.
pub fn select_target(profile: &AgentProfile, agent_center: WorldPos, candidates: &[Candidate]) -> Option<Target> {
    rank_targets(profile, agent_center, candidates).into_iter().next()
}
