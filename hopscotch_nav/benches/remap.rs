// Remap and path-planning throughput on a generated terrain strip.
//
// The terrain is a deterministic staircase of ledges and pits so every edge
// kind appears. Radii are swept because remap cost grows with the window
// area times the jump window area.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hopscotch_nav::{NavRegion, PathSearch, RegionParams, Tile, TileCoord, TileGrid};
use std::hint::black_box;

fn terrain(width: u32, height: u32) -> TileGrid {
    let mut grid = TileGrid::new(width, height);
    for x in 0..width as i32 {
        // Ground level wanders between rows h-12 and h-4 in steps.
        let phase = (x / 5) % 6;
        let ground = height as i32 - 4 - [0, 2, 5, 8, 3, 1][phase as usize];
        let is_pit = x % 17 == 9 || x % 17 == 10;
        if !is_pit {
            grid.fill(
                TileCoord::new(x, ground),
                TileCoord::new(x, height as i32 - 1),
                Tile::SOLID,
            );
        }
        if x % 11 == 3 {
            grid.set(TileCoord::new(x, ground - 5), Tile::PLATFORM);
        }
    }
    grid
}

fn params(radius_tiles: i32) -> RegionParams {
    RegionParams {
        radius_tiles,
        ..RegionParams::default()
    }
}

pub fn remap(c: &mut Criterion) {
    let world = terrain(256, 64);
    let center = TileCoord::new(128, 40).world_center();
    for radius in [8, 16, 32] {
        c.bench_with_input(BenchmarkId::new("remap", radius), &radius, |b, &radius| {
            let mut region = NavRegion::new(params(radius));
            b.iter(|| {
                region.remap(&world, black_box(center));
                black_box(region.edge_count())
            })
        });
    }
}

pub fn plan(c: &mut Criterion) {
    let world = terrain(256, 64);
    let anchor = TileCoord::new(128, 40);
    let mut region = NavRegion::new(params(32));
    region.remap(&world, anchor.world_center());

    // Start from any node, aim for the reachable node farthest to the right.
    let Some(origin) = region.nodes().map(|n| n.coord).min_by_key(|c| (c.x - anchor.x).abs()) else {
        return;
    };
    let farthest = |reachable: &[TileCoord]| reachable.iter().copied().max_by_key(|c| (c.x, -c.y));

    c.bench_function("plan radius 32", |b| {
        let mut search = PathSearch::new(region.clone(), farthest);
        b.iter(|| black_box(search.start_path(black_box(origin))))
    });
}

criterion_group!(benches, remap, plan);
criterion_main!(benches);
