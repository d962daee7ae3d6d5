// Goal selection policies for agents chasing a target.
//
// Both policies implement `hopscotch_nav::GoalSelector` and only ever pick
// from the reachable set the search hands them, so any goal they return is
// plannable.
//
// - `LineOfSightGoal`: the reachable node closest to the agent from which
//   the target is visible at the agent's eye height (half its hitbox height
//   above the node's surface). Falls back to `NearestToPoint` on the target.
// - `NearestToPoint`: the reachable node whose surface is nearest a point.
//   Stored in the agent's `PathSearch` so repaths after a lost path aim at
//   the last known target position.
//
// Ties go to the earliest coordinate in the reachable list, which arrives in
// breadth-first order from the origin, so selection is deterministic.
//
// See also: `driver.rs` which builds a `LineOfSightGoal` per path request,
// `hopscotch_nav::world::has_line_of_sight`.

use hopscotch_nav::world::has_line_of_sight;
use hopscotch_nav::{GoalSelector, TileCoord, TileQuery, WorldPos};

/// Picks the reachable node nearest to a point. Selects nothing while the
/// point is unset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NearestToPoint {
    pub point: Option<WorldPos>,
}

impl NearestToPoint {
    pub fn new(point: WorldPos) -> Self {
        Self { point: Some(point) }
    }
}

impl GoalSelector for NearestToPoint {
    fn select_goal(&mut self, reachable: &[TileCoord]) -> Option<TileCoord> {
        let point = self.point?;
        nearest(reachable, point)
    }
}

fn nearest(reachable: &[TileCoord], point: WorldPos) -> Option<TileCoord> {
    reachable
        .iter()
        .copied()
        .min_by(|a, b| {
            let da = a.world_top_center().distance(point);
            let db = b.world_top_center().distance(point);
            da.total_cmp(&db)
        })
}

/// Picks the reachable node nearest the agent that can see the target.
pub struct LineOfSightGoal<'w, W: ?Sized> {
    world: &'w W,
    agent_center: WorldPos,
    target_center: WorldPos,
    agent_height: f32,
}

impl<'w, W: TileQuery + ?Sized> LineOfSightGoal<'w, W> {
    pub fn new(world: &'w W, agent_center: WorldPos, target_center: WorldPos, agent_height: f32) -> Self {
        Self {
            world,
            agent_center,
            target_center,
            agent_height,
        }
    }

    /// Where the agent's eyes would be standing on `coord`.
    fn eye_at(&self, coord: TileCoord) -> WorldPos {
        coord.world_top_center() - WorldPos::new(0.0, self.agent_height / 2.0)
    }
}

impl<W: TileQuery + ?Sized> GoalSelector for LineOfSightGoal<'_, W> {
    fn select_goal(&mut self, reachable: &[TileCoord]) -> Option<TileCoord> {
        let mut best: Option<(TileCoord, f32)> = None;
        for &coord in reachable {
            let distance = coord.world_top_center().distance(self.agent_center);
            if best.is_some_and(|(_, d)| distance >= d) {
                continue;
            }
            if has_line_of_sight(self.world, self.target_center, self.eye_at(coord)) {
                best = Some((coord, distance));
            }
        }

        best.map(|(coord, _)| coord)
            .or_else(|| nearest(reachable, self.target_center))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopscotch_nav::TileGrid;

    #[test]
    fn nearest_to_point_needs_a_point() {
        let reachable = [TileCoord::new(0, 5), TileCoord::new(3, 5)];
        assert_eq!(NearestToPoint::default().select_goal(&reachable), None);
        let mut near = NearestToPoint::new(TileCoord::new(4, 2).world_center());
        assert_eq!(near.select_goal(&reachable), Some(TileCoord::new(3, 5)));
        assert_eq!(near.select_goal(&[]), None);
    }

    #[test]
    fn nearest_to_point_breaks_ties_by_list_order() {
        let reachable = [TileCoord::new(1, 5), TileCoord::new(3, 5)];
        let mut near = NearestToPoint::new(TileCoord::new(2, 5).world_top_center());
        assert_eq!(near.select_goal(&reachable), Some(TileCoord::new(1, 5)));
    }

    #[test]
    fn line_of_sight_prefers_visible_nodes_near_the_agent() {
        // A wall between x=4 and the target at the far right blocks sight
        // from the left half of the floor.
        let world = TileGrid::from_rows(&[
            "..........", //
            "....#.....", //
            "....#.....", //
            "....#.....", //
            "....#.....", //
            "##########", //
        ]);
        let reachable: Vec<TileCoord> = (0..10).filter(|&x| x != 4).map(|x| TileCoord::new(x, 5)).collect();
        let agent = TileCoord::new(1, 4).world_center();
        let target = TileCoord::new(9, 3).world_center();

        let mut goal = LineOfSightGoal::new(&world, agent, target, 40.0);
        assert_eq!(goal.select_goal(&reachable), Some(TileCoord::new(5, 5)));
    }

    #[test]
    fn line_of_sight_falls_back_to_nearest_the_target() {
        let world = TileGrid::from_rows(&[
            "....#.....", //
            "....#.....", //
            "....#.....", //
            "....#.....", //
            "....#.....", //
            "##########", //
        ]);
        let reachable: Vec<TileCoord> = (0..4).map(|x| TileCoord::new(x, 5)).collect();
        let agent = TileCoord::new(0, 4).world_center();
        let target = TileCoord::new(8, 3).world_center();

        let mut goal = LineOfSightGoal::new(&world, agent, target, 40.0);
        assert_eq!(goal.select_goal(&reachable), Some(TileCoord::new(3, 5)));
    }
}
