// Tile world interface consumed by the navigation engine.
//
// The engine never owns or mutates world state. It reads tiles through the
// `TileQuery` trait, which a host game implements over its own tile storage.
// `TileGrid` is a dense in-memory implementation, stored as a flat
// `Vec<Tile>` indexed by `x + y * width`, used by tests and benchmarks and
// buildable from ASCII art.
//
// Also provides two read-only helpers built on `TileQuery`:
// - `has_line_of_sight()`: marches a segment through the grid, treating
//   half blocks and slopes by which side of the surface the sample falls on.
//   Platforms never block sight.
// - `tiles_below()`: the standable tiles directly under a hitbox's feet,
//   used by the behaviour driver to find its origin node and to validate
//   landings.
//
// See also: `nav.rs` for node admission and jump clearance rules, which use
// `Tile::is_solid()` and `Tile::blocks_movement()` respectively.

use crate::types::{Hitbox, TILE_SIZE, TileCoord, WorldPos};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Geometric shape of a solid tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileShape {
    #[default]
    Full,
    /// Bottom half filled.
    HalfBlock,
    /// Surface descends from top-left to bottom-right; filled below it.
    SlopeDownLeft,
    /// Surface descends from top-right to bottom-left; filled below it.
    SlopeDownRight,
    /// Ceiling slope; filled above a surface running top-left to bottom-right.
    SlopeUpLeft,
    /// Ceiling slope; filled above a surface running top-right to bottom-left.
    SlopeUpRight,
}

/// The state of a single tile as seen by the navigation engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Whether any tile occupies this cell.
    pub has_tile: bool,
    /// Whether the tile can be stood on. Platforms are solid.
    pub solid: bool,
    /// Solid only from above: can be stood on and passed through.
    pub platform: bool,
    pub shape: TileShape,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        has_tile: false,
        solid: false,
        platform: false,
        shape: TileShape::Full,
    };

    pub const SOLID: Tile = Tile {
        has_tile: true,
        solid: true,
        platform: false,
        shape: TileShape::Full,
    };

    pub const PLATFORM: Tile = Tile {
        has_tile: true,
        solid: true,
        platform: true,
        shape: TileShape::Full,
    };

    /// A solid tile with a non-full shape.
    pub const fn shaped(shape: TileShape) -> Tile {
        Tile {
            has_tile: true,
            solid: true,
            platform: false,
            shape,
        }
    }

    /// A present tile that can be stood on (including platforms).
    pub fn is_solid(&self) -> bool {
        self.has_tile && self.solid
    }

    /// A present, solid tile that is not a platform: bodies cannot pass it.
    pub fn blocks_movement(&self) -> bool {
        self.has_tile && self.solid && !self.platform
    }
}

/// Read-only access to a tile world.
///
/// Only tiles within `MAX_COORD_MAGNITUDE` of the origin on both axes can be
/// navigated: node admission rejects anything farther out, since node ids
/// cannot represent it.
pub trait TileQuery {
    /// Whether the coordinate lies inside the world.
    fn in_world(&self, coord: TileCoord) -> bool;

    /// The tile at a coordinate. Out-of-world coordinates return
    /// `Tile::EMPTY`; callers check `in_world` where it matters.
    fn tile(&self, coord: TileCoord) -> Tile;

    /// Convenience: in-world and solid.
    fn is_solid(&self, coord: TileCoord) -> bool {
        self.in_world(coord) && self.tile(coord).is_solid()
    }
}

impl<T: TileQuery + ?Sized> TileQuery for &T {
    fn in_world(&self, coord: TileCoord) -> bool {
        (**self).in_world(coord)
    }

    fn tile(&self, coord: TileCoord) -> Tile {
        (**self).tile(coord)
    }
}

// ---------------------------------------------------------------------------
// Dense grid
// ---------------------------------------------------------------------------

/// Dense rectangular tile grid with its origin at (0, 0).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TileGrid {
    /// Flat storage: index = x + y * width.
    tiles: Vec<Tile>,
    pub width: u32,
    pub height: u32,
}

impl TileGrid {
    /// Create an empty grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            tiles: vec![Tile::EMPTY; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Build a grid from rows of ASCII art, top row first.
    ///
    /// `#` solid, `=` platform, `h` half block, `/` slope rising to the
    /// right (`SlopeDownRight`), `\` slope rising to the left
    /// (`SlopeDownLeft`); anything else is empty. Short rows are padded.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let tile = match ch {
                    '#' => Tile::SOLID,
                    '=' => Tile::PLATFORM,
                    'h' => Tile::shaped(TileShape::HalfBlock),
                    '/' => Tile::shaped(TileShape::SlopeDownRight),
                    '\\' => Tile::shaped(TileShape::SlopeDownLeft),
                    _ => continue,
                };
                grid.set(TileCoord::new(x as i32, y as i32), tile);
            }
        }
        grid
    }

    fn index(&self, coord: TileCoord) -> Option<usize> {
        if self.in_world(coord) {
            Some(coord.x as usize + coord.y as usize * self.width as usize)
        } else {
            None
        }
    }

    /// Write a tile. No-op out of bounds.
    pub fn set(&mut self, coord: TileCoord, tile: Tile) {
        if let Some(i) = self.index(coord) {
            self.tiles[i] = tile;
        }
    }

    /// Remove whatever tile occupies a cell.
    pub fn clear(&mut self, coord: TileCoord) {
        self.set(coord, Tile::EMPTY);
    }

    /// Fill an inclusive rectangle.
    pub fn fill(&mut self, from: TileCoord, to: TileCoord, tile: Tile) {
        for y in from.y.min(to.y)..=from.y.max(to.y) {
            for x in from.x.min(to.x)..=from.x.max(to.x) {
                self.set(TileCoord::new(x, y), tile);
            }
        }
    }
}

impl TileQuery for TileGrid {
    fn in_world(&self, coord: TileCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    fn tile(&self, coord: TileCoord) -> Tile {
        self.index(coord)
            .map(|i| self.tiles[i])
            .unwrap_or(Tile::EMPTY)
    }
}

// ---------------------------------------------------------------------------
// Queries built on TileQuery
// ---------------------------------------------------------------------------

/// Whether a straight segment between two world points is unobstructed.
///
/// Samples the segment roughly four times per tile of diagonal. A full solid
/// tile blocks; a half block blocks samples in its lower half; slopes block
/// samples on the filled side of their surface. Platforms are transparent.
/// Leaving the world blocks.
pub fn has_line_of_sight<W: TileQuery + ?Sized>(world: &W, start: WorldPos, end: WorldPos) -> bool {
    let distance_tiles = start.distance(end) / TILE_SIZE;
    let samples = (distance_tiles * std::f32::consts::SQRT_2 * 4.0).ceil().max(1.0) as u32;

    for i in 0..=samples {
        let t = i as f32 / samples as f32;
        let probe = start.lerp(end, t);
        let coord = TileCoord::from_world(probe);

        if !world.in_world(coord) {
            return false;
        }

        let tile = world.tile(coord);
        if !tile.is_solid() || tile.platform {
            continue;
        }

        if blocks_sight(tile.shape, coord, probe) {
            return false;
        }
    }

    true
}

/// Whether a probe point inside a solid tile of the given shape is inside the
/// filled part.
fn blocks_sight(shape: TileShape, coord: TileCoord, probe: WorldPos) -> bool {
    let center = coord.world_center();
    let half = TILE_SIZE / 2.0;
    // 0 at the tile's left edge, 1 at its right edge.
    let across = ((probe.x - (center.x - half)) / TILE_SIZE).clamp(0.0, 1.0);

    match shape {
        TileShape::Full => true,
        TileShape::HalfBlock => probe.y > center.y,
        TileShape::SlopeDownLeft | TileShape::SlopeUpRight => {
            // Surface runs from the top-left corner to the bottom-right one.
            let surface = (center.y - half) + across * TILE_SIZE;
            match shape {
                TileShape::SlopeDownLeft => probe.y >= surface,
                _ => probe.y <= surface,
            }
        }
        TileShape::SlopeDownRight | TileShape::SlopeUpLeft => {
            // Surface runs from the bottom-left corner to the top-right one.
            let surface = (center.y + half) - across * TILE_SIZE;
            match shape {
                TileShape::SlopeDownRight => probe.y >= surface,
                _ => probe.y <= surface,
            }
        }
    }
}

/// Standable tiles (solid or platform) in the row directly beneath a
/// hitbox's bottom edge, probed every 14 world units across its width.
///
/// Returns an empty list when the hitbox is airborne. Exact for hitboxes
/// narrower than 16 tiles.
pub fn tiles_below<W: TileQuery + ?Sized>(world: &W, hitbox: &Hitbox) -> SmallVec<[TileCoord; 4]> {
    const PROBE_STEP: f32 = 14.0;

    let mut tiles: SmallVec<[TileCoord; 4]> = SmallVec::new();
    let probe_y = hitbox.bottom().y + 1.0;
    let min_x = hitbox.bottom_left().x;
    let max_x = hitbox.bottom_right().x;

    let mut x = min_x;
    loop {
        let coord = TileCoord::from_world(WorldPos::new(x.clamp(min_x, max_x), probe_y));
        if world.is_solid(coord) && !tiles.contains(&coord) {
            tiles.push(coord);
        }
        if x >= max_x {
            break;
        }
        x = (x + PROBE_STEP).min(max_x);
    }

    tiles
}
