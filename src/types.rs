// Wire and domain types shared across the agent
//
// Coordinates travel on the wire as two-element arrays, tile patches as a
// nested x -> y -> code map, matching the game server's JSON protocol.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 2D coordinate on the grid, serialized as `[x, y]`
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl From<[i32; 2]> for Coord {
    fn from(v: [i32; 2]) -> Self {
        Coord { x: v[0], y: v[1] }
    }
}

impl From<Coord> for [i32; 2] {
    fn from(c: Coord) -> Self {
        [c.x, c.y]
    }
}

impl Coord {
    pub fn manhattan(&self, other: &Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// The four symbolic movement directions
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    West,
    South,
    East,
}

impl Direction {
    /// Returns all possible directions
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::West,
            Direction::South,
            Direction::East,
        ]
    }

    /// Symbolic name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "NORTH",
            Direction::West => "WEST",
            Direction::South => "SOUTH",
            Direction::East => "EAST",
        }
    }

    /// Key the server expects on the wire
    pub fn as_key(&self) -> &'static str {
        match self {
            Direction::North => "w",
            Direction::West => "a",
            Direction::South => "s",
            Direction::East => "d",
        }
    }

    pub fn parse(s: &str) -> Option<Direction> {
        match s.to_uppercase().as_str() {
            "NORTH" => Some(Direction::North),
            "WEST" => Some(Direction::West),
            "SOUTH" => Some(Direction::South),
            "EAST" => Some(Direction::East),
            _ => None,
        }
    }

    /// Calculates the next coordinate when moving in this direction.
    /// The grid origin is the top-left corner, so north decreases y.
    pub fn apply(&self, coord: &Coord) -> Coord {
        match self {
            Direction::North => Coord { x: coord.x, y: coord.y - 1 },
            Direction::West => Coord { x: coord.x - 1, y: coord.y },
            Direction::South => Coord { x: coord.x, y: coord.y + 1 },
            Direction::East => Coord { x: coord.x + 1, y: coord.y },
        }
    }
}

/// Tile codes used by the server's map matrix and sight patches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Passage,
    Stone,
    Food,
    Super,
    Snake,
}

impl Tile {
    pub fn from_code(code: u8) -> Option<Tile> {
        match code {
            0 => Some(Tile::Passage),
            1 => Some(Tile::Stone),
            2 => Some(Tile::Food),
            3 => Some(Tile::Super),
            4 => Some(Tile::Snake),
            _ => None,
        }
    }
}

/// Immutable snapshot of the snake for planning purposes.
///
/// Invariant: `body` is ordered head first and holds no duplicate
/// coordinates unless `traverse` is active transiently during a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    pub body: Vec<Coord>,
    pub traverse: bool,
}

impl GridState {
    /// Head coordinate. Callers must hold a non-empty body.
    pub fn head(&self) -> Coord {
        self.body[0]
    }
}

/// Per-tick observation decoded from the server feed
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Observation {
    pub ts: NaiveDateTime,
    pub step: u64,
    pub body: Vec<Coord>,
    /// Visible tile patches: x -> y -> tile code
    #[serde(default)]
    pub sight: HashMap<i32, HashMap<i32, u8>>,
    /// Empowered flag: the body may pass through itself and stones
    #[serde(default)]
    pub traverse: bool,
}

/// Join acknowledgment carrying the static map metadata
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MapInfo {
    /// Tile-code matrix in column-major order: `map[x][y]`
    pub map: Vec<Vec<u8>>,
    pub fps: u32,
    pub timeout: u32,
}
