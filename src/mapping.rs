// Belief map: the agent's accumulated knowledge of the grid.
//
// Built once from the join metadata and refined every tick from the sight
// patches. Cells outside the reported vision keep their prior belief; a
// wall, once known, never changes.

use log::{debug, warn};
use std::collections::HashSet;

use crate::types::{Coord, GridState, Observation, Tile};

/// What the agent currently believes a cell holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Belief {
    Unknown,
    Visited,
    Passage,
    Stone,
    Food,
    Super,
    Snake,
}

impl From<Tile> for Belief {
    fn from(tile: Tile) -> Self {
        match tile {
            Tile::Passage => Belief::Passage,
            Tile::Stone => Belief::Stone,
            Tile::Food => Belief::Food,
            Tile::Super => Belief::Super,
            Tile::Snake => Belief::Snake,
        }
    }
}

/// Persistent belief grid plus the latest snake snapshot.
/// One per agent session; no sharing across threads.
pub struct BeliefMap {
    width: i32,
    height: i32,
    cells: Vec<Belief>,
    walls: HashSet<Coord>,
    state: GridState,
    last_step: u64,
    fresh_food: bool,
    fresh_super: bool,
}

impl BeliefMap {
    /// Builds the map from the join metadata matrix (column-major,
    /// `matrix[x][y]`). Stones are known immediately; every other cell
    /// starts unknown and is revealed by observations.
    pub fn from_matrix(matrix: &[Vec<u8>]) -> Self {
        let width = matrix.len() as i32;
        let height = matrix.first().map_or(0, |col| col.len()) as i32;

        let mut cells = vec![Belief::Unknown; (width * height) as usize];
        let mut walls = HashSet::new();

        for (x, col) in matrix.iter().enumerate() {
            for (y, &code) in col.iter().enumerate() {
                if Tile::from_code(code) == Some(Tile::Stone) {
                    cells[x * height as usize + y] = Belief::Stone;
                    walls.insert(Coord {
                        x: x as i32,
                        y: y as i32,
                    });
                }
            }
        }

        BeliefMap {
            width,
            height,
            cells,
            walls,
            state: GridState {
                body: Vec::new(),
                traverse: false,
            },
            last_step: 0,
            fresh_food: false,
            fresh_super: false,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Static walls known from the join metadata
    pub fn walls(&self) -> &HashSet<Coord> {
        &self.walls
    }

    /// Latest snake snapshot, head first
    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn last_step(&self) -> u64 {
        self.last_step
    }

    /// Fuses one observation into the belief grid. Cells inside the sight
    /// patches are overwritten exactly; everything else keeps its prior
    /// belief. The agent's own body cells are marked visited.
    pub fn update(&mut self, obs: &Observation) {
        self.fresh_food = false;
        self.fresh_super = false;

        for (&x, col) in &obs.sight {
            for (&y, &code) in col {
                let pos = Coord { x, y };
                if !self.in_bounds(pos) {
                    warn!("sight patch outside the grid at ({}, {})", x, y);
                    continue;
                }
                match Tile::from_code(code) {
                    Some(tile) => self.set_belief(pos, tile),
                    None => warn!("unknown tile code {} at ({}, {})", code, x, y),
                }
            }
        }

        for &cell in &obs.body {
            if self.in_bounds(cell) {
                self.set_visited(cell);
            }
        }

        self.state = GridState {
            body: obs.body.clone(),
            traverse: obs.traverse,
        };
        self.last_step = obs.step;
    }

    fn set_belief(&mut self, pos: Coord, tile: Tile) {
        let idx = self.index(pos);
        let prev = self.cells[idx];
        let next = Belief::from(tile);

        // Walls are permanent; a contradicting patch is stale server noise
        if prev == Belief::Stone && next != Belief::Stone {
            debug!(
                "observation contradicts known wall at ({}, {}), keeping wall",
                pos.x, pos.y
            );
            return;
        }

        if next == Belief::Food && prev != Belief::Food {
            self.fresh_food = true;
        }
        if next == Belief::Super && prev != Belief::Super {
            self.fresh_super = true;
        }

        self.cells[idx] = next;
    }

    fn set_visited(&mut self, pos: Coord) {
        let idx = self.index(pos);
        if self.cells[idx] != Belief::Stone {
            self.cells[idx] = Belief::Visited;
        }
    }

    pub fn belief_at(&self, pos: Coord) -> Belief {
        if !self.in_bounds(pos) {
            return Belief::Stone;
        }
        self.cells[self.index(pos)]
    }

    /// True when at least one cell holds the given belief
    pub fn observed(&self, belief: Belief) -> bool {
        self.cells.iter().any(|&c| c == belief)
    }

    /// Closest cell holding the given belief, measured from the head
    pub fn closest_object(&self, belief: Belief) -> Option<Coord> {
        if self.state.body.is_empty() {
            return None;
        }
        let head = self.state.head();

        let mut best: Option<(i32, Coord)> = None;
        for x in 0..self.width {
            for y in 0..self.height {
                let pos = Coord { x, y };
                if self.cells[self.index(pos)] != belief {
                    continue;
                }
                let dist = head.manhattan(&pos);
                if best.map_or(true, |(d, _)| dist < d) {
                    best = Some((dist, pos));
                }
            }
        }
        best.map(|(_, pos)| pos)
    }

    /// Picks the next exploration target: the closest unknown cell on the
    /// frontier (adjacent to known, non-wall territory). Falls back to any
    /// unknown cell, then to the known open cell farthest from the head
    /// once the whole grid has been seen.
    pub fn next_exploration(&self, skip: Option<Coord>) -> Option<Coord> {
        if self.state.body.is_empty() {
            return None;
        }
        let head = self.state.head();

        let frontier = self.scan(skip, |pos| {
            self.belief_at(pos) == Belief::Unknown && self.has_known_open_neighbor(pos)
        });
        if let Some(pos) = self.closest_to(head, &frontier) {
            return Some(pos);
        }

        let unknown = self.scan(skip, |pos| self.belief_at(pos) == Belief::Unknown);
        if let Some(pos) = self.closest_to(head, &unknown) {
            return Some(pos);
        }

        let open = self.scan(skip, |pos| {
            !matches!(self.belief_at(pos), Belief::Unknown | Belief::Stone)
        });
        self.farthest_from(head, &open)
    }

    /// True when the latest update revealed nothing that should trigger a
    /// re-plan: no new food, and no new power-up unless already empowered
    pub fn nothing_new_observed(&self, empowered: bool) -> bool {
        !(self.fresh_food || (!empowered && self.fresh_super))
    }

    fn scan<F: Fn(Coord) -> bool>(&self, skip: Option<Coord>, keep: F) -> Vec<Coord> {
        let mut out = Vec::new();
        for x in 0..self.width {
            for y in 0..self.height {
                let pos = Coord { x, y };
                if Some(pos) == skip {
                    continue;
                }
                if keep(pos) {
                    out.push(pos);
                }
            }
        }
        out
    }

    fn closest_to(&self, from: Coord, candidates: &[Coord]) -> Option<Coord> {
        candidates
            .iter()
            .min_by_key(|pos| from.manhattan(pos))
            .copied()
    }

    fn farthest_from(&self, from: Coord, candidates: &[Coord]) -> Option<Coord> {
        candidates
            .iter()
            .max_by_key(|pos| from.manhattan(pos))
            .copied()
    }

    fn has_known_open_neighbor(&self, pos: Coord) -> bool {
        let neighbors = [
            Coord { x: pos.x, y: pos.y - 1 },
            Coord { x: pos.x - 1, y: pos.y },
            Coord { x: pos.x, y: pos.y + 1 },
            Coord { x: pos.x + 1, y: pos.y },
        ];
        neighbors.iter().any(|&n| {
            self.in_bounds(n) && !matches!(self.belief_at(n), Belief::Unknown | Belief::Stone)
        })
    }

    fn in_bounds(&self, pos: Coord) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    fn index(&self, pos: Coord) -> usize {
        (pos.x * self.height + pos.y) as usize
    }
}
