// hopscotch_nav — local tile navigation with walk, fall and jump edges.
//
// This crate is the pure navigation core for side-on tile-grid agents: it
// scans a window of tiles around an agent into a navmesh, plans minimum-cost
// routes through it, and solves the launch velocity for each jump. It never
// mutates the world and has no engine dependencies, so it can be tested and
// benchmarked headless.
//
// Module overview:
// - `types.rs`:       TileCoord, NodeId (Cantor-paired), WorldPos, Hitbox.
// - `world.rs`:       TileQuery trait, dense TileGrid, line of sight, tiles below a hitbox.
// - `curve.rs`:       De Casteljau curve sampling for jump profiles.
// - `config.rs`:      RegionParams + JumpParams, serde-loadable tuning.
// - `nav.rs`:         NavRegion: node admission, walk/fall/jump edges, reachability.
// - `pathfinding.rs`: PathSearch: goal selection, Dijkstra, edge cursor.
// - `jump.rs`:        JumpSolver: vertical-first / horizontal-first launch velocities.
//
// The companion crate `hopscotch_agent` drives agents through these modules
// once per simulation tick.
//
// **Critical constraint: determinism.** Given the same world and
// parameters, remaps produce identical graphs and searches produce identical
// paths. No randomness, no system time; hash maps use the fixed-seed
// `rustc_hash` hasher and never determine iteration order of results.

pub mod config;
pub mod curve;
pub mod jump;
pub mod nav;
pub mod pathfinding;
pub mod types;
pub mod world;

pub use config::{InvalidParam, JumpParams, RegionParams};
pub use jump::{JumpError, JumpSolution, JumpSolver, JumpStrategy};
pub use nav::{DebugEdge, EdgeKind, NavEdge, NavNode, NavRegion};
pub use pathfinding::{GoalSelector, PathOutcome, PathSearch, PathState};
pub use types::{Hitbox, NodeId, TILE_SIZE, TileCoord, WorldPos};
pub use world::{Tile, TileGrid, TileQuery, TileShape};
