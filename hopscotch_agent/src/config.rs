// Per-archetype agent configuration.
//
// Every behavioural difference between agent archetypes (infantry, scouts,
// heavies...) is data in an `AgentProfile`: the navigation region and jump
// tuning from `hopscotch_nav`, steering constants, state timings, sight
// range and target weights. Profiles are keyed by archetype name in an
// `ArchetypeRegistry`, loaded once from JSON and passed explicitly to each
// `Agent`; nothing is looked up through global state.
//
// `AgentProfile` is `#[serde(default)]`, so a data file only lists the
// fields an archetype overrides; the rest come from the infantry preset.
//
// See also: `driver.rs` which reads these values every tick, `targeting.rs`
// which uses the weights, `hopscotch_nav::config` for the nested
// `RegionParams` and `JumpParams`.
//
// **Critical constraint: validated at load.** `ArchetypeRegistry::from_json`
// validates every profile. The driver assumes positive speeds, extents and
// weights and never re-checks them.

use crate::targeting::TargetKind;
use hopscotch_nav::{InvalidParam, JumpParams, RegionParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse archetype data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown archetype `{0}`")]
    UnknownArchetype(String),
    #[error("archetype `{archetype}` has an invalid parameter: {source}")]
    Invalid {
        archetype: String,
        #[source]
        source: InvalidParam,
    },
}

/// Tuning for one agent archetype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProfile {
    /// Navigation region shape, including the agent's hitbox size.
    pub region: RegionParams,
    pub jump: JumpParams,

    /// Horizontal speed gained per tick while walking toward an edge target.
    pub walk_acceleration: f32,
    /// Horizontal speed cap while walking.
    pub max_walk_speed: f32,
    /// Horizontal velocity multiplier per tick while falling along a fall edge.
    pub fall_air_control: f32,
    /// Horizontal velocity multiplier per tick while idle.
    pub idle_friction: f32,
    /// Horizontal velocity multiplier per tick while attacking.
    pub attack_friction: f32,

    /// Ticks spent idle before seeking a visible target.
    pub seek_delay_ticks: u32,
    /// Idle timer on spawn. Counts toward `seek_delay_ticks`, so freshly
    /// spawned agents react sooner than ones that lost their target.
    pub spawn_idle_ticks: u32,
    /// Ticks between path attempts while waiting for a path.
    pub repath_interval_ticks: u32,
    /// Ticks without moving before a path is declared lost.
    pub stuck_limit_ticks: u32,
    /// Ticks between line-of-sight checks while attacking.
    pub attack_sight_check_ticks: u32,

    /// Targets farther than this many tiles are ignored.
    pub max_sight_range_tiles: f32,
    /// Weight applied to players. Higher weights make a target seem closer.
    pub player_weight: f32,
    /// Weights for other archetypes, by name. Unlisted archetypes weigh 1.
    pub preferred_target_weights: BTreeMap<String, f32>,
}

impl AgentProfile {
    /// The targeting weight for a kind of target.
    pub fn weight_for(&self, kind: &TargetKind) -> f32 {
        match kind {
            TargetKind::Player => self.player_weight,
            TargetKind::Archetype(name) => self
                .preferred_target_weights
                .get(name)
                .copied()
                .unwrap_or(1.0),
        }
    }

    pub fn validate(&self) -> Result<(), InvalidParam> {
        self.region.validate()?;
        self.jump.validate()?;

        let positive = [
            ("walk_acceleration", self.walk_acceleration),
            ("max_walk_speed", self.max_walk_speed),
            ("max_sight_range_tiles", self.max_sight_range_tiles),
            ("player_weight", self.player_weight),
        ];
        for (field, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(InvalidParam {
                    field,
                    reason: "must be positive and finite",
                });
            }
        }

        let factors = [
            ("fall_air_control", self.fall_air_control),
            ("idle_friction", self.idle_friction),
            ("attack_friction", self.attack_friction),
        ];
        for (field, value) in factors {
            if !(0.0..=1.0).contains(&value) {
                return Err(InvalidParam {
                    field,
                    reason: "must be within [0, 1]",
                });
            }
        }

        if self.repath_interval_ticks == 0 || self.attack_sight_check_ticks == 0 {
            return Err(InvalidParam {
                field: "interval_ticks",
                reason: "must be at least 1",
            });
        }

        if self
            .preferred_target_weights
            .values()
            .any(|w| !(*w > 0.0 && w.is_finite()))
        {
            return Err(InvalidParam {
                field: "preferred_target_weights",
                reason: "weights must be positive and finite",
            });
        }

        Ok(())
    }
}

impl Default for AgentProfile {
    /// The infantry preset.
    fn default() -> Self {
        Self {
            region: RegionParams::default(),
            jump: JumpParams::default(),
            walk_acceleration: 0.2,
            max_walk_speed: 3.0,
            fall_air_control: 0.75,
            idle_friction: 0.95,
            attack_friction: 0.8,
            seek_delay_ticks: 360,
            spawn_idle_ticks: 320,
            repath_interval_ticks: 60,
            stuck_limit_ticks: 300,
            attack_sight_check_ticks: 120,
            max_sight_range_tiles: 60.0,
            player_weight: 1.0,
            preferred_target_weights: BTreeMap::new(),
        }
    }
}

/// Immutable mapping from archetype name to its profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchetypeRegistry {
    archetypes: BTreeMap<String, AgentProfile>,
}

impl ArchetypeRegistry {
    /// Parse and validate a JSON object of `{ "name": { ...profile } }`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let registry: Self = serde_json::from_str(json)?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Validate every profile, reporting the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, profile) in &self.archetypes {
            profile.validate().map_err(|source| ConfigError::Invalid {
                archetype: name.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn get(&self, archetype: &str) -> Result<&AgentProfile, ConfigError> {
        self.archetypes
            .get(archetype)
            .ok_or_else(|| ConfigError::UnknownArchetype(archetype.to_string()))
    }

    /// Add or replace an archetype after validating it.
    pub fn insert(&mut self, archetype: impl Into<String>, profile: AgentProfile) -> Result<(), ConfigError> {
        let archetype = archetype.into();
        profile.validate().map_err(|source| ConfigError::Invalid {
            archetype: archetype.clone(),
            source,
        })?;
        self.archetypes.insert(archetype, profile);
        Ok(())
    }

    /// Archetype names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.archetypes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}
