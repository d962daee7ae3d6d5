// Navigation region: the local navmesh around one agent.
//
// A `NavRegion` scans a square window of tiles around a centre point into
// `NavNode`s (standable tiles with enough headroom for the agent's hitbox)
// connected by directed `NavEdge`s of three kinds:
// - `Walk`: to a node one tile left or right, at most one tile up or down.
// - `Fall`: off a ledge, to the first solid tile at least two tiles below a
//   horizontal neighbour, when that tile is itself a node.
// - `Jump`: to any node in the jump window whose approximate arc (the jump
//   profile, sampled with `curve::sample`) clears the terrain.
//
// Storage is arena-style: nodes and edges live in flat `Vec`s, each node
// holding the indices of its outgoing edges. Node ids are the Cantor pairing
// of the tile coordinate (see `types.rs`), and an `FxHashMap` maps ids to
// arena slots. `remap()` clears and repopulates everything; edges are never
// patched in place.
//
// See also: `pathfinding.rs` for the search over this graph, `world.rs` for
// the tile query interface, `curve.rs` for profile sampling, `jump.rs` for
// the real ballistic solution the profile approximates.
//
// **Critical constraint: costs are ordered.** Walking is cheaper than
// falling, and falling is cheaper than jumping the same span. Path search
// relies on this to prefer walking wherever walking is possible.

use crate::config::RegionParams;
use crate::curve;
use crate::types::{NodeId, TILE_SIZE, TileCoord, WorldPos};
use crate::world::TileQuery;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;
use tracing::debug;

/// Cost of a one-tile walk.
pub const WALK_COST: f32 = 1.0;
/// Cost of dropping off a ledge, regardless of depth.
pub const FALL_COST: f32 = 2.0;
/// Jump cost per tile of Euclidean distance.
pub const JUMP_COST_MULTIPLIER: f32 = 1.25;
/// Deepest drop scanned for fall edges.
pub const MAX_DROP_TILES: i32 = 128;

/// The kind of movement an edge represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Walk,
    Fall,
    Jump,
}

/// A standable tile.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NavNode {
    pub id: NodeId,
    pub coord: TileCoord,
    /// Indices into the region's edge arena for edges leaving this node.
    pub edge_indices: SmallVec<[usize; 8]>,
}

/// A directed, typed, costed connection between two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
    pub cost: f32,
}

/// An edge in world space, ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugEdge {
    pub from: TileCoord,
    pub to: TileCoord,
    pub kind: EdgeKind,
    /// Polyline through tile centres: two points for walks and falls, the
    /// sampled profile curve for jumps.
    pub points: Vec<WorldPos>,
}

/// The navmesh for one agent's neighbourhood.
#[derive(Clone, Debug)]
pub struct NavRegion {
    params: RegionParams,
    /// Centre tile of the last remap, `None` before the first one.
    center: Option<TileCoord>,
    nodes: Vec<NavNode>,
    edges: Vec<NavEdge>,
    slots: FxHashMap<NodeId, usize>,
}

impl NavRegion {
    /// An empty region. Call `remap()` to populate it.
    pub fn new(params: RegionParams) -> Self {
        Self {
            params,
            center: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            slots: FxHashMap::default(),
        }
    }

    pub fn params(&self) -> &RegionParams {
        &self.params
    }

    /// Centre tile of the most recent remap.
    pub fn center(&self) -> Option<TileCoord> {
        self.center
    }

    // -----------------------------------------------------------------------
    // Arena
    // -----------------------------------------------------------------------

    /// Drop every node and edge.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.slots.clear();
    }

    /// Add a node at a coordinate. Returns its id; adding an existing
    /// coordinate again is a no-op returning the same id.
    pub fn add_node(&mut self, coord: TileCoord) -> NodeId {
        let id = NodeId::from_coord(coord);
        if !self.slots.contains_key(&id) {
            self.slots.insert(id, self.nodes.len());
            self.nodes.push(NavNode {
                id,
                coord,
                edge_indices: SmallVec::new(),
            });
        }
        id
    }

    /// Add a directed edge. Returns its index in the edge arena, or `None`
    /// if either endpoint is not a node of this region.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind, cost: f32) -> Option<usize> {
        let from_slot = *self.slots.get(&from)?;
        if !self.slots.contains_key(&to) {
            return None;
        }
        let idx = self.edges.len();
        self.edges.push(NavEdge {
            from,
            to,
            kind,
            cost,
        });
        self.nodes[from_slot].edge_indices.push(idx);
        Some(idx)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The node standing on a tile, if that tile is a node.
    pub fn node_at(&self, coord: TileCoord) -> Option<&NavNode> {
        self.node(NodeId::from_coord(coord))
    }

    pub fn node(&self, id: NodeId) -> Option<&NavNode> {
        self.slots.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// Coordinate of a node in this region. `None` for ids that are not
    /// current nodes, even though every id unpairs to some coordinate.
    pub fn coord_of(&self, id: NodeId) -> Option<TileCoord> {
        self.node(id).map(|n| n.coord)
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.contains_node(NodeId::from_coord(coord))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Outgoing edges of a node, in insertion order. Empty for unknown ids.
    pub fn edges_from(&self, id: NodeId) -> impl Iterator<Item = &NavEdge> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(move |n| n.edge_indices.iter().map(move |&i| &self.edges[i]))
    }

    pub fn edge(&self, idx: usize) -> Option<&NavEdge> {
        self.edges.get(idx)
    }

    /// All edges, in arena order.
    pub fn edges(&self) -> &[NavEdge] {
        &self.edges
    }

    /// All nodes, in arena (scan) order.
    pub fn nodes(&self) -> impl Iterator<Item = &NavNode> + '_ {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Breadth-first traversal over outgoing edges from the node at
    /// `origin`. Returns every reachable node once, origin first, or `None`
    /// if `origin` is not a node.
    pub fn reachable_from(&self, origin: TileCoord) -> Option<Vec<NodeId>> {
        let source = self.node_at(origin)?.id;

        let mut traversal = Vec::new();
        let mut queue = VecDeque::new();
        let mut visited = FxHashSet::default();

        visited.insert(source);
        queue.push_back(source);

        while let Some(current) = queue.pop_front() {
            traversal.push(current);
            for edge in self.edges_from(current) {
                if visited.insert(edge.to) {
                    queue.push_back(edge.to);
                }
            }
        }

        Some(traversal)
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Rebuild the region around `center`.
    ///
    /// Scans tiles `[-r, r)` on both axes around the tile containing
    /// `center`, admits nodes, then generates walk, fall and jump edges for
    /// each node in scan order. Idempotent for an unchanged world.
    pub fn remap<W: TileQuery + ?Sized>(&mut self, world: &W, center: WorldPos) {
        self.clear();

        let origin = TileCoord::from_world(center);
        let r = self.params.radius_tiles;
        self.center = Some(origin);

        for y in -r..r {
            for x in -r..r {
                let coord = origin.offset(x, y);
                if self.is_standable(world, coord) {
                    self.add_node(coord);
                }
            }
        }

        self.generate_edges(world);

        debug!(
            center = %origin,
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "remapped nav region"
        );
    }

    /// Node admission: pairable, in-world, solid (platforms included), with
    /// `height_tiles` in-world, non-solid tiles directly above.
    pub fn is_standable<W: TileQuery + ?Sized>(&self, world: &W, coord: TileCoord) -> bool {
        if !NodeId::is_pairable(coord) || !world.is_solid(coord) {
            return false;
        }
        (1..=self.params.height_tiles()).all(|k| {
            let above = coord.above(k);
            world.in_world(above) && !world.tile(above).is_solid()
        })
    }

    fn generate_edges<W: TileQuery + ?Sized>(&mut self, world: &W) {
        let coords: Vec<TileCoord> = self.nodes.iter().map(|n| n.coord).collect();

        for coord in coords {
            let id = NodeId::from_coord(coord);

            for dx in [-1, 1] {
                // Walk: same level or one step up or down.
                for dy in [-1, 0, 1] {
                    let neighbour = coord.offset(dx, dy);
                    if self.contains(neighbour) {
                        self.add_edge(id, NodeId::from_coord(neighbour), EdgeKind::Walk, WALK_COST);
                    }
                }

                // Fall: the first solid tile below the horizontal neighbour.
                for drop in 0..MAX_DROP_TILES {
                    let below = coord.offset(dx, drop);
                    if !world.in_world(below) {
                        break;
                    }
                    if world.tile(below).is_solid() {
                        if drop >= 2 && self.contains(below) {
                            self.add_edge(id, NodeId::from_coord(below), EdgeKind::Fall, FALL_COST);
                        }
                        break;
                    }
                }
            }

            for target in self.jump_destinations(world, coord) {
                let cost = coord.distance(target) * JUMP_COST_MULTIPLIER;
                self.add_edge(id, NodeId::from_coord(target), EdgeKind::Jump, cost);
            }
        }
    }

    /// Nodes in the jump window around `origin` whose arc is clear.
    fn jump_destinations<W: TileQuery + ?Sized>(&self, world: &W, origin: TileCoord) -> Vec<TileCoord> {
        let max_h = self.params.max_jump_horizontal;
        let max_v = self.params.max_jump_vertical;
        let min_dx = self.params.width_tiles();

        let mut result = Vec::new();
        for dy in -max_v..=max_v {
            for dx in -max_h..=max_h {
                if dx.abs() < min_dx {
                    continue;
                }
                let candidate = origin.offset(dx, dy);
                if self.contains(candidate) && self.is_path_clear(world, origin, candidate) {
                    result.push(candidate);
                }
            }
        }
        result
    }

    /// Whether the agent's hitbox can follow the jump profile from `origin`
    /// to `candidate` without passing through blocking tiles.
    pub fn is_path_clear<W: TileQuery + ?Sized>(
        &self,
        world: &W,
        origin: TileCoord,
        candidate: TileCoord,
    ) -> bool {
        let height = self.params.height_tiles();
        let profile = jump_profile(
            origin.world_center(),
            candidate.world_center(),
            self.params.max_jump_vertical,
        );

        profile.into_iter().all(|point| {
            let sample = TileCoord::from_world(point);
            if sample == origin || sample == candidate {
                return true;
            }
            (0..=height).all(|k| can_intersect(world, sample.above(k)))
        })
    }

    // -----------------------------------------------------------------------
    // Debug
    // -----------------------------------------------------------------------

    /// Every edge as a world-space polyline, for external rendering.
    pub fn debug_edges(&self) -> Vec<DebugEdge> {
        self.edges
            .iter()
            .filter_map(|edge| {
                let from = self.coord_of(edge.from)?;
                let to = self.coord_of(edge.to)?;
                let points = match edge.kind {
                    EdgeKind::Jump => jump_profile(
                        from.world_center(),
                        to.world_center(),
                        self.params.max_jump_vertical,
                    ),
                    EdgeKind::Walk | EdgeKind::Fall => {
                        vec![from.world_center(), to.world_center()]
                    }
                };
                Some(DebugEdge {
                    from,
                    to,
                    kind: edge.kind,
                    points,
                })
            })
            .collect()
    }
}

/// Whether an agent's body may overlap a tile: it must be in the world and
/// not a solid, non-platform tile.
pub fn can_intersect<W: TileQuery + ?Sized>(world: &W, coord: TileCoord) -> bool {
    world.in_world(coord) && !world.tile(coord).blocks_movement()
}

/// The approximate arc used to validate and draw a jump: a three-point curve
/// sampled every 8 world units.
///
/// Jumps at least two tiles up and at most two tiles across rise first: the
/// midpoint sits at `(start.x, end.y)`. Any other jump arcs over the
/// horizontal midpoint, lifted by the horizontal distance capped at
/// `max_jump_vertical` tiles.
pub fn jump_profile(start: WorldPos, end: WorldPos, max_jump_vertical: i32) -> Vec<WorldPos> {
    let segments = ((start.distance(end) / 8.0) as usize).max(1);

    let rises_steeply =
        (start.y - end.y) / TILE_SIZE >= 2.0 && (end.x - start.x).abs() / TILE_SIZE <= 2.0;

    let midpoint = if rises_steeply {
        WorldPos::new(start.x, end.y)
    } else {
        let lift = (start.x - end.x).abs().min(max_jump_vertical as f32 * TILE_SIZE);
        WorldPos::new((start.x + end.x) / 2.0, start.y - lift)
    };

    curve::sample(&[start, midpoint, end], segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Tile, TileGrid};

    fn small_params() -> RegionParams {
        RegionParams {
            radius_tiles: 16,
            hitbox_width: 16.0,
            hitbox_height: 16.0,
            max_jump_horizontal: 3,
            max_jump_vertical: 3,
        }
    }

    fn edge_set(region: &NavRegion) -> Vec<(TileCoord, TileCoord, EdgeKind, u32)> {
        let mut edges: Vec<_> = region
            .edges()
            .iter()
            .map(|e| (e.from.coord(), e.to.coord(), e.kind, e.cost.to_bits()))
            .collect();
        edges.sort_by_key(|&(a, b, k, c)| (a, b, k as u8, c));
        edges
    }

    #[test]
    fn add_edge_requires_both_endpoints() {
        let mut region = NavRegion::new(small_params());
        let a = region.add_node(TileCoord::new(0, 0));
        let stranger = NodeId::from_coord(TileCoord::new(5, 5));
        assert_eq!(region.add_edge(a, stranger, EdgeKind::Walk, 1.0), None);
        assert_eq!(region.edge_count(), 0);
    }

    #[test]
    fn add_node_is_idempotent() {
        let mut region = NavRegion::new(small_params());
        let a = region.add_node(TileCoord::new(2, 3));
        let b = region.add_node(TileCoord::new(2, 3));
        assert_eq!(a, b);
        assert_eq!(region.node_count(), 1);
        assert_eq!(region.coord_of(a), Some(TileCoord::new(2, 3)));
    }

    #[test]
    fn flat_floor_admits_top_row_only() {
        let grid = TileGrid::from_rows(&["......", "......", "######", "######"]);
        let mut region = NavRegion::new(small_params());
        region.remap(&grid, TileCoord::new(2, 1).world_center());

        assert_eq!(region.node_count(), 6);
        for x in 0..6 {
            assert!(region.contains(TileCoord::new(x, 2)));
            assert!(!region.contains(TileCoord::new(x, 3)), "buried tile admitted");
        }
    }

    #[test]
    fn headroom_blocks_admission() {
        // 16x40 hitbox needs three clear tiles above the floor.
        let grid = TileGrid::from_rows(&[".....", "..#..", ".....", ".....", "#####"]);
        let mut region = NavRegion::new(RegionParams {
            hitbox_height: 40.0,
            ..small_params()
        });
        region.remap(&grid, WorldPos::new(40.0, 40.0));

        assert!(region.contains(TileCoord::new(0, 4)));
        assert!(!region.contains(TileCoord::new(2, 4)), "ceiling at y=1 is in the headroom");
    }

    #[test]
    fn headroom_outside_world_blocks_admission() {
        let grid = TileGrid::from_rows(&["###", "..."]);
        let mut region = NavRegion::new(small_params());
        region.remap(&grid, WorldPos::new(16.0, 16.0));
        assert_eq!(region.node_count(), 0);
    }

    /// Unbounded world: solid along y = 0, open everywhere else.
    struct EndlessFloor;

    impl TileQuery for EndlessFloor {
        fn in_world(&self, _: TileCoord) -> bool {
            true
        }

        fn tile(&self, coord: TileCoord) -> Tile {
            if coord.y == 0 { Tile::SOLID } else { Tile::EMPTY }
        }
    }

    #[test]
    fn coordinates_beyond_pairing_range_are_not_standable() {
        use crate::types::MAX_COORD_MAGNITUDE;

        let region = NavRegion::new(small_params());
        assert!(region.is_standable(&EndlessFloor, TileCoord::new(5, 0)));
        assert!(region.is_standable(&EndlessFloor, TileCoord::new(MAX_COORD_MAGNITUDE - 1, 0)));
        assert!(!region.is_standable(&EndlessFloor, TileCoord::new(MAX_COORD_MAGNITUDE, 0)));
        assert!(!region.is_standable(&EndlessFloor, TileCoord::new(-MAX_COORD_MAGNITUDE, 0)));
    }

    #[test]
    fn platforms_are_standable() {
        let grid = TileGrid::from_rows(&["....", "....", "..==", "...."]);
        let mut region = NavRegion::new(small_params());
        region.remap(&grid, WorldPos::new(32.0, 32.0));
        assert!(region.contains(TileCoord::new(2, 2)));
        assert!(region.contains(TileCoord::new(3, 2)));
    }

    #[test]
    fn walk_edges_connect_steps() {
        let grid = TileGrid::from_rows(&["....", "....", "..##", "####"]);
        let mut region = NavRegion::new(small_params());
        region.remap(&grid, WorldPos::new(32.0, 32.0));

        let low = NodeId::from_coord(TileCoord::new(1, 3));
        let step = NodeId::from_coord(TileCoord::new(2, 2));
        let walk_targets: Vec<_> = region
            .edges_from(low)
            .filter(|e| e.kind == EdgeKind::Walk)
            .map(|e| e.to)
            .collect();
        assert!(walk_targets.contains(&step));
        assert!(region
            .edges_from(step)
            .any(|e| e.kind == EdgeKind::Walk && e.to == low));
    }

    #[test]
    fn fall_edge_needs_two_tile_drop() {
        let grid = TileGrid::from_rows(&[
            "......", //
            "##....", //
            "......", //
            "..####", //
        ]);
        let mut region = NavRegion::new(RegionParams {
            max_jump_horizontal: 0,
            max_jump_vertical: 0,
            ..small_params()
        });
        region.remap(&grid, WorldPos::new(32.0, 32.0));

        let ledge = NodeId::from_coord(TileCoord::new(1, 1));
        let landing = NodeId::from_coord(TileCoord::new(2, 3));
        let falls: Vec<_> = region
            .edges_from(ledge)
            .filter(|e| e.kind == EdgeKind::Fall)
            .collect();
        assert_eq!(falls.len(), 1);
        assert_eq!(falls[0].to, landing);
        assert_eq!(falls[0].cost, FALL_COST);
        // No way back up without jumping.
        assert_eq!(region.edges_from(landing).filter(|e| e.to == ledge).count(), 0);
    }

    #[test]
    fn one_tile_drop_is_a_walk_not_a_fall() {
        let grid = TileGrid::from_rows(&["....", "##..", "####"]);
        let mut region = NavRegion::new(small_params());
        region.remap(&grid, WorldPos::new(16.0, 16.0));
        let ledge = NodeId::from_coord(TileCoord::new(1, 1));
        assert!(region.edges_from(ledge).all(|e| e.kind != EdgeKind::Fall));
        assert!(region
            .edges_from(ledge)
            .any(|e| e.kind == EdgeKind::Walk && e.to == NodeId::from_coord(TileCoord::new(2, 2))));
    }

    #[test]
    fn jump_blocked_by_wall_between() {
        let open = TileGrid::from_rows(&[".......", ".......", ".......", "###.###"]);
        let mut walled = open.clone();
        walled.fill(TileCoord::new(3, 0), TileCoord::new(3, 2), Tile::SOLID);

        let params = small_params();
        let from = TileCoord::new(2, 3);
        let to = TileCoord::new(4, 3);

        let mut region = NavRegion::new(params.clone());
        region.remap(&open, WorldPos::new(48.0, 32.0));
        assert!(region.is_path_clear(&open, from, to));
        assert!(region
            .edges_from(NodeId::from(from))
            .any(|e| e.kind == EdgeKind::Jump && e.to == NodeId::from(to)));

        let mut region = NavRegion::new(params);
        region.remap(&walled, WorldPos::new(48.0, 32.0));
        assert!(!region.is_path_clear(&walled, from, to));
    }

    #[test]
    fn platforms_do_not_block_jumps() {
        let mut grid = TileGrid::from_rows(&[".......", ".......", ".......", "###.###"]);
        grid.fill(TileCoord::new(3, 1), TileCoord::new(3, 2), Tile::PLATFORM);
        let mut region = NavRegion::new(small_params());
        region.remap(&grid, WorldPos::new(48.0, 32.0));
        assert!(region.is_path_clear(&grid, TileCoord::new(2, 3), TileCoord::new(4, 3)));
    }

    #[test]
    fn jumps_skip_offsets_narrower_than_hitbox() {
        let grid = TileGrid::from_rows(&["......", "......", "......", "######"]);
        let mut region = NavRegion::new(RegionParams {
            hitbox_width: 30.0,
            ..small_params()
        });
        region.remap(&grid, WorldPos::new(32.0, 32.0));
        for edge in region.edges().iter().filter(|e| e.kind == EdgeKind::Jump) {
            let dx = (edge.to.coord().x - edge.from.coord().x).abs();
            assert!(dx >= 2, "jump of {dx} tiles for a two-tile-wide hitbox");
        }
    }

    #[test]
    fn costs_are_ordered_for_shared_spans() {
        let grid = TileGrid::from_rows(&[
            "........", //
            "........", //
            "........", //
            "........", //
            "###.....", //
            "........", //
            "...#####", //
            "########", //
        ]);
        let mut region = NavRegion::new(small_params());
        region.remap(&grid, WorldPos::new(64.0, 64.0));

        let mut compared = 0;
        for edge in region.edges() {
            for other in region.edges_from(edge.from).filter(|o| o.to == edge.to) {
                match (edge.kind, other.kind) {
                    (EdgeKind::Walk, EdgeKind::Fall) | (EdgeKind::Walk, EdgeKind::Jump) => {
                        assert!(edge.cost <= other.cost);
                        compared += 1;
                    }
                    (EdgeKind::Fall, EdgeKind::Jump) => {
                        assert!(edge.cost < other.cost);
                        compared += 1;
                    }
                    _ => {}
                }
            }
        }
        assert!(compared > 0, "no parallel edges to compare");
    }

    #[test]
    fn remap_is_idempotent() {
        let grid = TileGrid::from_rows(&[
            "..........", //
            "..........", //
            "....==....", //
            "..........", //
            "##.....###", //
            "##..##..##", //
            "##########", //
        ]);
        let mut region = NavRegion::new(small_params());
        let center = WorldPos::new(80.0, 48.0);

        region.remap(&grid, center);
        let nodes_a: Vec<_> = region.nodes().map(|n| n.id).collect();
        let edges_a = edge_set(&region);

        region.remap(&grid, center);
        let nodes_b: Vec<_> = region.nodes().map(|n| n.id).collect();
        let edges_b = edge_set(&region);

        assert_eq!(nodes_a, nodes_b);
        assert_eq!(edges_a, edges_b);
        assert!(!edges_a.is_empty());
    }

    #[test]
    fn remap_window_is_bounded_by_radius() {
        let mut grid = TileGrid::new(40, 6);
        grid.fill(TileCoord::new(0, 5), TileCoord::new(39, 5), Tile::SOLID);
        let mut region = NavRegion::new(RegionParams {
            radius_tiles: 4,
            ..small_params()
        });
        region.remap(&grid, TileCoord::new(20, 3).world_center());

        assert_eq!(region.center(), Some(TileCoord::new(20, 3)));
        // x in [16, 24), row 5 is at dy = +2 which is inside [-4, 4).
        assert_eq!(region.node_count(), 8);
        assert!(region.contains(TileCoord::new(16, 5)));
        assert!(!region.contains(TileCoord::new(24, 5)));
    }

    #[test]
    fn remap_clears_nodes_that_disappeared() {
        let mut grid = TileGrid::from_rows(&["....", "....", "####"]);
        let mut region = NavRegion::new(small_params());
        region.remap(&grid, WorldPos::new(16.0, 16.0));
        assert!(region.contains(TileCoord::new(1, 2)));

        grid.clear(TileCoord::new(1, 2));
        region.remap(&grid, WorldPos::new(16.0, 16.0));
        assert!(!region.contains(TileCoord::new(1, 2)));
        for edge in region.edges() {
            assert!(region.contains_node(edge.from) && region.contains_node(edge.to));
        }
    }

    #[test]
    fn reachable_from_unknown_tile_is_none() {
        let region = NavRegion::new(small_params());
        assert_eq!(region.reachable_from(TileCoord::new(0, 0)), None);
    }

    #[test]
    fn reachable_set_is_sound_and_includes_dead_ends() {
        let mut region = NavRegion::new(small_params());
        let a = region.add_node(TileCoord::new(0, 0));
        let b = region.add_node(TileCoord::new(1, 0));
        let c = region.add_node(TileCoord::new(2, 0));
        let island = region.add_node(TileCoord::new(9, 9));
        region.add_edge(a, b, EdgeKind::Walk, 1.0);
        region.add_edge(b, c, EdgeKind::Fall, 2.0);
        region.add_edge(island, a, EdgeKind::Walk, 1.0);

        let reachable = region.reachable_from(TileCoord::new(0, 0)).unwrap();
        assert_eq!(reachable, vec![a, b, c]);
        assert!(!reachable.contains(&island));

        // c has no outgoing edges and still counts.
        assert_eq!(region.reachable_from(TileCoord::new(2, 0)).unwrap(), vec![c]);
    }

    #[test]
    fn jump_profile_rises_first_for_tall_narrow_jumps() {
        let start = TileCoord::new(5, 10).world_center();
        let end = TileCoord::new(6, 6).world_center();
        let points = jump_profile(start, end, 10);
        assert_eq!(points.first(), Some(&start));
        assert_eq!(points.last(), Some(&end));
        // Segment count: floor(distance / 8).
        assert_eq!(points.len(), (start.distance(end) / 8.0) as usize + 1);
        // The curve is pulled toward (start.x, end.y), so it never passes
        // the straight line on the far side.
        for p in &points {
            assert!(p.x <= end.x + f32::EPSILON);
        }
    }

    #[test]
    fn jump_profile_lift_is_capped_by_max_vertical() {
        let start = WorldPos::new(0.0, 100.0);
        let end = WorldPos::new(160.0, 100.0);
        // Control midpoint lifted by min(160, 2 * 16) = 32; the curve's
        // apex is half of that.
        let points = jump_profile(start, end, 2);
        let apex = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        assert!((apex - 84.0).abs() < 0.01, "apex {apex}");
    }

    #[test]
    fn debug_edges_mirror_edge_arena() {
        let grid = TileGrid::from_rows(&["......", "......", "......", "##..##"]);
        let mut region = NavRegion::new(small_params());
        region.remap(&grid, WorldPos::new(48.0, 32.0));

        let debug = region.debug_edges();
        assert_eq!(debug.len(), region.edge_count());
        for d in &debug {
            assert_eq!(d.points.first(), Some(&d.from.world_center()));
            assert_eq!(d.points.last(), Some(&d.to.world_center()));
            if d.kind != EdgeKind::Jump {
                assert_eq!(d.points.len(), 2);
            }
        }
    }
}
