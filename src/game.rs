// Snake game model: legal actions, transition function, and goal test.
// Pure functions over explicit state; nothing here touches the network or
// the belief map.

use std::collections::HashSet;

use crate::types::{Coord, Direction, GridState};

/// Rules of the grid the snake moves on. Independent of who issues actions.
pub struct SnakeGame {
    width: i32,
    height: i32,
    stones: HashSet<Coord>,
}

impl SnakeGame {
    pub fn new(width: i32, height: i32, internal_walls: HashSet<Coord>) -> Self {
        SnakeGame {
            width,
            height,
            stones: internal_walls,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Legal moves for a state. A move is legal when the resulting head is
    /// in bounds and, unless traverse is active, lands neither on a stone
    /// nor on the moving body (the tail cell vacates this tick).
    ///
    /// Returns an empty vector when the snake is fully boxed in; callers
    /// must fall back to an emergency policy, this is not an error.
    pub fn actions(&self, state: &GridState) -> Vec<Direction> {
        let head = state.head();
        let moving_body = &state.body[..state.body.len().saturating_sub(1)];

        Direction::all()
            .iter()
            .filter(|&&dir| {
                let next = dir.apply(&head);

                if !self.in_bounds(next) {
                    return false;
                }

                if !state.traverse && self.stones.contains(&next) {
                    return false;
                }

                if !state.traverse && moving_body.contains(&next) {
                    return false;
                }

                true
            })
            .copied()
            .collect()
    }

    /// Deterministic transition: the head shifts one cell, the tail
    /// truncates by one unless the move grows the snake (food eaten).
    pub fn result(&self, state: &GridState, action: Direction, grows: bool) -> GridState {
        let new_head = action.apply(&state.head());

        let mut body = Vec::with_capacity(state.body.len() + 1);
        body.push(new_head);
        if grows {
            body.extend_from_slice(&state.body);
        } else {
            body.extend_from_slice(&state.body[..state.body.len() - 1]);
        }

        GridState {
            body,
            traverse: state.traverse,
        }
    }

    /// Uniform step cost
    pub fn cost(&self, _state: &GridState, _action: Direction, _next: &GridState) -> u32 {
        1
    }

    pub fn is_goal(&self, state: &GridState, target: Coord) -> bool {
        state.head() == target
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(body: Vec<Coord>, traverse: bool) -> GridState {
        GridState { body, traverse }
    }

    fn c(x: i32, y: i32) -> Coord {
        Coord { x, y }
    }

    #[test]
    fn test_actions_respect_bounds() {
        let game = SnakeGame::new(3, 3, HashSet::new());
        let s = state(vec![c(0, 0)], false);

        let actions = game.actions(&s);
        assert!(!actions.contains(&Direction::North), "north leaves the grid");
        assert!(!actions.contains(&Direction::West), "west leaves the grid");
        assert!(actions.contains(&Direction::South));
        assert!(actions.contains(&Direction::East));
    }

    #[test]
    fn test_actions_exclude_stones() {
        let mut walls = HashSet::new();
        walls.insert(c(1, 1));
        let game = SnakeGame::new(3, 3, walls);
        let s = state(vec![c(0, 1)], false);

        assert!(!game.actions(&s).contains(&Direction::East));
    }

    #[test]
    fn test_actions_exclude_own_body_but_not_tail() {
        let game = SnakeGame::new(5, 5, HashSet::new());
        // Head at (2,2), body extends east, tail at (4,2)
        let s = state(vec![c(2, 2), c(3, 2), c(4, 2)], false);

        let actions = game.actions(&s);
        assert!(!actions.contains(&Direction::East), "neck blocks east");

        // With the tail adjacent to the head, the tail cell is legal
        // because it vacates this tick
        let s = state(vec![c(2, 2), c(2, 3), c(3, 3), c(3, 2)], false);
        assert!(game.actions(&s).contains(&Direction::East));
    }

    #[test]
    fn test_traverse_permits_stones_and_body() {
        let mut walls = HashSet::new();
        walls.insert(c(1, 1));
        let game = SnakeGame::new(3, 3, walls);
        let s = state(vec![c(0, 1), c(0, 2), c(1, 2)], true);

        let actions = game.actions(&s);
        assert!(actions.contains(&Direction::East), "traverse crosses stones");
        assert!(actions.contains(&Direction::South), "traverse crosses body");
        // Bounds still apply
        assert!(!actions.contains(&Direction::West));
    }

    #[test]
    fn test_result_truncates_tail() {
        let game = SnakeGame::new(5, 5, HashSet::new());
        let s = state(vec![c(2, 2), c(3, 2), c(4, 2)], false);

        let next = game.result(&s, Direction::West, false);
        assert_eq!(next.body, vec![c(1, 2), c(2, 2), c(3, 2)]);
        assert_eq!(next.body.len(), s.body.len());
    }

    #[test]
    fn test_result_grows_on_food() {
        let game = SnakeGame::new(5, 5, HashSet::new());
        let s = state(vec![c(2, 2), c(3, 2)], false);

        let next = game.result(&s, Direction::West, true);
        assert_eq!(next.body, vec![c(1, 2), c(2, 2), c(3, 2)]);
        assert_eq!(next.body.len(), s.body.len() + 1);
    }

    #[test]
    fn test_is_goal_matches_head_only() {
        let game = SnakeGame::new(5, 5, HashSet::new());
        let s = state(vec![c(2, 2), c(3, 2)], false);

        assert!(game.is_goal(&s, c(2, 2)));
        assert!(!game.is_goal(&s, c(3, 2)), "body cells are not the goal");
    }

    #[test]
    fn test_boxed_in_yields_empty_action_set() {
        let mut walls = HashSet::new();
        walls.insert(c(1, 0));
        walls.insert(c(0, 1));
        let game = SnakeGame::new(3, 3, walls);
        let s = state(vec![c(0, 0)], false);

        assert!(game.actions(&s).is_empty());
    }
}
