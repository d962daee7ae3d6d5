// Core spatial types shared across the navigation engine.
//
// Defines tile coordinates (`TileCoord`), the node identifier derived from
// them (`NodeId`), world-space positions (`WorldPos`) and axis-aligned
// hitboxes (`Hitbox`).
//
// Coordinates are screen-style: +x is right, +y is DOWN. One tile is
// `TILE_SIZE` world units. "Above" a tile means `y - 1`, and a jump to a
// higher ledge has a negative vertical displacement.
//
// See also: `world.rs` for the tile query interface, `nav.rs` which keys its
// node arena by `NodeId`.
//
// **Critical constraint: bijection.** `NodeId::from_coord` and
// `NodeId::coord` must stay exact inverses. The id is a pure function of the
// coordinate, never an allocation-order artifact, so the same tile has the
// same id across remaps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Width and height of one tile in world units.
pub const TILE_SIZE: f32 = 16.0;

/// Coordinates whose magnitude reaches this bound cannot be paired into a
/// `u64` node id without overflow.
pub const MAX_COORD_MAGNITUDE: i32 = 1 << 30;

// ---------------------------------------------------------------------------
// World space
// ---------------------------------------------------------------------------

/// A position (or vector) in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const ZERO: WorldPos = WorldPos { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Linear interpolation; `t = 0` gives exactly `self`, `t = 1` gives
    /// exactly `other`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self * (1.0 - t) + other * t
    }
}

impl Add for WorldPos {
    type Output = WorldPos;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for WorldPos {
    type Output = WorldPos;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for WorldPos {
    type Output = WorldPos;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Axis-aligned rectangle in world units. `(x, y)` is the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Hitbox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A hitbox of the given size whose bottom-centre sits at `feet`.
    pub fn standing_at(feet: WorldPos, width: f32, height: f32) -> Self {
        Self::new(feet.x - width / 2.0, feet.y - height, width, height)
    }

    pub fn center(&self) -> WorldPos {
        WorldPos::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Middle of the bottom edge: where the agent's feet are.
    pub fn bottom(&self) -> WorldPos {
        WorldPos::new(self.x + self.width / 2.0, self.y + self.height)
    }

    pub fn bottom_left(&self) -> WorldPos {
        WorldPos::new(self.x, self.y + self.height)
    }

    pub fn bottom_right(&self) -> WorldPos {
        WorldPos::new(self.x + self.width, self.y + self.height)
    }

    pub fn top_left(&self) -> WorldPos {
        WorldPos::new(self.x, self.y)
    }

    /// Move the box by a world-space offset.
    pub fn translate(&mut self, delta: WorldPos) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Width in whole tiles, rounded up.
    pub fn width_tiles(&self) -> i32 {
        footprint_tiles(self.width)
    }

    /// Height in whole tiles, rounded up.
    pub fn height_tiles(&self) -> i32 {
        footprint_tiles(self.height)
    }
}

/// Number of tiles needed to cover `extent` world units.
pub fn footprint_tiles(extent: f32) -> i32 {
    (extent / TILE_SIZE).ceil() as i32
}

// ---------------------------------------------------------------------------
// Tile space
// ---------------------------------------------------------------------------

/// Integer coordinate of a grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The tile containing a world position.
    pub fn from_world(pos: WorldPos) -> Self {
        Self::new(
            (pos.x / TILE_SIZE).floor() as i32,
            (pos.y / TILE_SIZE).floor() as i32,
        )
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The tile directly above (towards negative y).
    pub const fn above(self, tiles: i32) -> Self {
        self.offset(0, -tiles)
    }

    /// World-space centre of the tile.
    pub fn world_center(self) -> WorldPos {
        WorldPos::new(
            self.x as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            self.y as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        )
    }

    /// Middle of the tile's top face: where an agent standing on it puts its feet.
    pub fn world_top_center(self) -> WorldPos {
        WorldPos::new(
            self.x as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            self.y as f32 * TILE_SIZE,
        )
    }

    /// Euclidean distance in tiles.
    pub fn distance(self, other: Self) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for TileCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

// ---------------------------------------------------------------------------
// Node ids: Cantor pairing over zig-zag encoded coordinates
// ---------------------------------------------------------------------------

/// Identifier of a navigation node.
///
/// Computed from the node's tile coordinate with a Cantor pairing, after
/// zig-zag encoding each axis so negative coordinates pair as well:
///
/// ```text
/// zz(v) = (v << 1) ^ (v >> 31)          0, -1, 1, -2, 2 ... -> 0, 1, 2, 3, 4 ...
/// w     = zz(x) + zz(y)
/// id    = w * (w + 1) / 2 + zz(y)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Whether a coordinate lies inside the range `from_coord` can pair
    /// exactly. Coordinates outside it never become nodes.
    pub fn is_pairable(coord: TileCoord) -> bool {
        coord.x.unsigned_abs() < MAX_COORD_MAGNITUDE as u32
            && coord.y.unsigned_abs() < MAX_COORD_MAGNITUDE as u32
    }

    /// Pair a coordinate into its id. Coordinates must satisfy
    /// `is_pairable`; outside that range ids wrap and stop being unique.
    pub fn from_coord(coord: TileCoord) -> Self {
        debug_assert!(Self::is_pairable(coord), "coordinate {coord} out of pairing range");
        let a = zigzag(coord.x);
        let b = zigzag(coord.y);
        let w = a + b;
        Self(w * (w + 1) / 2 + b)
    }

    /// Unpair the id back into its coordinate.
    pub fn coord(self) -> TileCoord {
        let z = self.0 as u128;
        // Largest w with w(w+1)/2 <= z.
        let mut w = ((isqrt(8 * z + 1) - 1) / 2) as u64;
        while triangle(w + 1) <= self.0 as u128 {
            w += 1;
        }
        while triangle(w) > self.0 as u128 {
            w -= 1;
        }
        let b = self.0 - triangle(w) as u64;
        let a = w - b;
        TileCoord::new(unzigzag(a), unzigzag(b))
    }
}

impl From<TileCoord> for NodeId {
    fn from(coord: TileCoord) -> Self {
        Self::from_coord(coord)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

fn zigzag(v: i32) -> u64 {
    ((v << 1) ^ (v >> 31)) as u32 as u64
}

fn unzigzag(v: u64) -> i32 {
    let v = v as u32;
    ((v >> 1) as i32) ^ -((v & 1) as i32)
}

fn triangle(w: u64) -> u128 {
    let w = w as u128;
    w * (w + 1) / 2
}

/// Integer square root (floor).
fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = (n as f64).sqrt() as u128;
    while x * x > n {
        x -= 1;
    }
    while (x + 1) * (x + 1) <= n {
        x += 1;
    }
    x
}
