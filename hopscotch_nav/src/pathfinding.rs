// Path search over a navigation region.
//
// `PathSearch` owns an agent's active `NavRegion`, a goal-selection policy
// and the edge sequence of the current path, with a cursor for stepping
// through it. Planning a path (`start_path`) is two passes:
// 1. Breadth-first reachability from the origin node (`NavRegion::
//    reachable_from`). The reachable coordinates go to the goal selector,
//    which picks the destination.
// 2. Dijkstra from origin to goal, restricted to the reachable set, using a
//    `BinaryHeap` min-heap (reversed ordering, push sequence as tie-break)
//    with lazy deletion of stale entries.
// The node sequence is then turned back into edges by picking the cheapest
// edge between each consecutive pair.
//
// See also: `nav.rs` for the region being searched, the `hopscotch_agent`
// crate's `driver.rs` which plans and steps through paths every tick and
// `goal.rs` which provides the usual goal policies.
//
// **Critical constraint: remap invalidates.** Every held edge refers to
// nodes of the region as it was when the path was planned. Anything that
// rebuilds or replaces the region (`remap`, `swap_region`) clears the path.

use crate::nav::{NavEdge, NavRegion};
use crate::types::{NodeId, TileCoord, WorldPos};
use crate::world::TileQuery;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::debug;

/// Chooses a destination from the coordinates reachable from the origin.
pub trait GoalSelector {
    /// Returns the goal, or `None` if no reachable coordinate will do.
    fn select_goal(&mut self, reachable: &[TileCoord]) -> Option<TileCoord>;
}

impl<F> GoalSelector for F
where
    F: FnMut(&[TileCoord]) -> Option<TileCoord>,
{
    fn select_goal(&mut self, reachable: &[TileCoord]) -> Option<TileCoord> {
        self(reachable)
    }
}

/// Coarse state of the held path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathState {
    /// No path is held.
    NoPath,
    /// Edges remain to be traversed.
    HasPath,
    /// The goal has been reached, either immediately or by advancing past
    /// the last edge.
    AtGoal,
}

/// Result of `PathSearch::start_path`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathOutcome {
    /// A path of `edges` edges with total `cost` is now held.
    Started { edges: usize, cost: f32 },
    /// The selected goal is the origin node.
    AlreadyAtGoal,
    /// The origin tile is not a node of the active region.
    InvalidOrigin,
    /// The selector picked nothing, or picked an unreachable coordinate.
    NoGoal,
    /// The search found no route to the goal.
    NoRoute,
}

impl PathOutcome {
    /// True when the agent has something to follow (or is already there).
    pub fn started(&self) -> bool {
        matches!(self, PathOutcome::Started { .. } | PathOutcome::AlreadyAtGoal)
    }

    pub fn already_at_goal(&self) -> bool {
        matches!(self, PathOutcome::AlreadyAtGoal)
    }
}

/// Per-agent path planner and cursor.
#[derive(Clone, Debug)]
pub struct PathSearch<S> {
    region: NavRegion,
    selector: S,
    edges: Vec<NavEdge>,
    cursor: usize,
    at_goal: bool,
}

impl<S: GoalSelector> PathSearch<S> {
    pub fn new(region: NavRegion, selector: S) -> Self {
        Self {
            region,
            selector,
            edges: Vec::new(),
            cursor: 0,
            at_goal: false,
        }
    }

    pub fn region(&self) -> &NavRegion {
        &self.region
    }

    pub fn selector(&self) -> &S {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut S {
        &mut self.selector
    }

    /// Replace the active region, returning the old one. Clears the path.
    pub fn swap_region(&mut self, region: NavRegion) -> NavRegion {
        self.clear();
        std::mem::replace(&mut self.region, region)
    }

    /// Rebuild the active region around `center`. Clears the path.
    pub fn remap<W: TileQuery + ?Sized>(&mut self, world: &W, center: WorldPos) {
        self.clear();
        self.region.remap(world, center);
    }

    /// Plan a path from `origin` using the stored goal selector.
    pub fn start_path(&mut self, origin: TileCoord) -> PathOutcome {
        self.clear();
        let (outcome, edges) = plan(&self.region, origin, &mut self.selector);
        self.accept(outcome, edges)
    }

    /// Plan a path from `origin` with a one-off goal selector.
    pub fn start_path_with<G: GoalSelector + ?Sized>(
        &mut self,
        origin: TileCoord,
        selector: &mut G,
    ) -> PathOutcome {
        self.clear();
        let (outcome, edges) = plan(&self.region, origin, selector);
        self.accept(outcome, edges)
    }

    fn accept(&mut self, outcome: PathOutcome, edges: Vec<NavEdge>) -> PathOutcome {
        self.edges = edges;
        self.at_goal = outcome.already_at_goal();
        debug!(?outcome, "path planned");
        outcome
    }
}

impl<S> PathSearch<S> {
    /// Forget the held path.
    pub fn clear(&mut self) {
        self.edges.clear();
        self.cursor = 0;
        self.at_goal = false;
    }

    pub fn state(&self) -> PathState {
        if self.at_goal || (!self.edges.is_empty() && self.is_exhausted()) {
            PathState::AtGoal
        } else if self.edges.is_empty() {
            PathState::NoPath
        } else {
            PathState::HasPath
        }
    }

    /// The edge at the cursor, without advancing.
    pub fn current_edge(&self) -> Option<&NavEdge> {
        self.edges.get(self.cursor)
    }

    /// Return the edge at the cursor and move past it. `None` once the path
    /// is exhausted; calling again stays `None`.
    pub fn advance(&mut self) -> Option<NavEdge> {
        let edge = *self.edges.get(self.cursor)?;
        self.cursor += 1;
        Some(edge)
    }

    pub fn edges(&self) -> &[NavEdge] {
        &self.edges
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Edges not yet advanced past.
    pub fn remaining(&self) -> &[NavEdge] {
        &self.edges[self.cursor..]
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.edges.len()
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

fn plan<G: GoalSelector + ?Sized>(
    region: &NavRegion,
    origin: TileCoord,
    selector: &mut G,
) -> (PathOutcome, Vec<NavEdge>) {
    let Some(reachable) = region.reachable_from(origin) else {
        return (PathOutcome::InvalidOrigin, Vec::new());
    };
    let source = NodeId::from_coord(origin);

    let coords: Vec<TileCoord> = reachable.iter().filter_map(|&id| region.coord_of(id)).collect();
    let allowed: FxHashSet<NodeId> = reachable.into_iter().collect();

    let goal = match selector.select_goal(&coords) {
        Some(goal) if allowed.contains(&NodeId::from_coord(goal)) => NodeId::from_coord(goal),
        _ => return (PathOutcome::NoGoal, Vec::new()),
    };

    if goal == source {
        return (PathOutcome::AlreadyAtGoal, Vec::new());
    }

    let Some((nodes, cost)) = dijkstra(region, source, goal, &allowed) else {
        return (PathOutcome::NoRoute, Vec::new());
    };

    let edges: Option<Vec<NavEdge>> = nodes
        .windows(2)
        .map(|pair| cheapest_edge(region, pair[0], pair[1]))
        .collect();

    match edges {
        Some(edges) if !edges.is_empty() => (
            PathOutcome::Started {
                edges: edges.len(),
                cost,
            },
            edges,
        ),
        _ => (PathOutcome::NoRoute, Vec::new()),
    }
}

/// Cheapest edge from `from` to `to`; the first one wins ties.
fn cheapest_edge(region: &NavRegion, from: NodeId, to: NodeId) -> Option<NavEdge> {
    region
        .edges_from(from)
        .filter(|e| e.to == to)
        .fold(None, |best: Option<&NavEdge>, e| match best {
            Some(b) if b.cost <= e.cost => Some(b),
            _ => Some(e),
        })
        .copied()
}

/// Entry in the open set (min-heap via reversed ordering).
struct OpenEntry {
    node: NodeId,
    dist: f32,
    seq: u64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest distance, then earliest push, is
        // "greatest".
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Single-source shortest path from `source` to `goal`, relaxing only edges
/// whose target is in `allowed`. Returns the node sequence (source first) and
/// its total cost.
fn dijkstra(
    region: &NavRegion,
    source: NodeId,
    goal: NodeId,
    allowed: &FxHashSet<NodeId>,
) -> Option<(Vec<NodeId>, f32)> {
    let mut dist: FxHashMap<NodeId, f32> = FxHashMap::default();
    let mut prev: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    dist.insert(source, 0.0);
    open.push(OpenEntry {
        node: source,
        dist: 0.0,
        seq,
    });

    while let Some(current) = open.pop() {
        let best = dist.get(&current.node).copied().unwrap_or(f32::INFINITY);
        if current.dist > best {
            continue; // stale
        }
        if current.node == goal {
            break;
        }

        for edge in region.edges_from(current.node) {
            if !allowed.contains(&edge.to) {
                continue;
            }
            let tentative = current.dist + edge.cost;
            let known = dist.get(&edge.to).copied().unwrap_or(f32::INFINITY);
            if tentative < known {
                dist.insert(edge.to, tentative);
                prev.insert(edge.to, current.node);
                seq += 1;
                open.push(OpenEntry {
                    node: edge.to,
                    dist: tentative,
                    seq,
                });
            }
        }
    }

    let cost = *dist.get(&goal)?;

    let mut nodes = vec![goal];
    let mut current = goal;
    while current != source {
        current = *prev.get(&current)?;
        nodes.push(current);
    }
    nodes.reverse();

    Some((nodes, cost))
}
