// Planner: picks goals, drives re-planning vs plan reuse, and owns the
// emergency single-step heuristic used when search produces nothing.

use log::{debug, info, warn};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::Config;
use crate::game::SnakeGame;
use crate::mapping::{Belief, BeliefMap};
use crate::search::{SearchProblem, SearchTree};
use crate::types::{Coord, Direction};

/// Why a goal was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    Food,
    Super,
    Exploration,
}

/// A planning target. Immutable once bound into a search problem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub strategy: Strategy,
    pub position: Coord,
}

/// Per-agent planning state: the current action plan and goal.
/// The plan is consumed from the back and replaced wholesale on re-plan.
pub struct Planner {
    plan: Vec<Direction>,
    current_goal: Option<Goal>,
    max_ancestor_walk: usize,
}

impl Planner {
    pub fn new(config: &Config) -> Self {
        Planner {
            plan: Vec::new(),
            current_goal: None,
            max_ancestor_walk: config.search.max_ancestor_walk,
        }
    }

    pub fn current_goal(&self) -> Option<Goal> {
        self.current_goal
    }

    pub fn plan_len(&self) -> usize {
        self.plan.len()
    }

    /// One planning cycle. Reuses the queued plan when the latest
    /// observation brought nothing relevant; otherwise selects a fresh
    /// goal and searches for it under the deadline. Search failures fall
    /// back to the emergency heuristic, never past the deadline.
    pub fn decide(
        &mut self,
        game: &SnakeGame,
        map: &BeliefMap,
        empowered: bool,
        deadline: Instant,
    ) -> Direction {
        if let Some(action) = self.next_queued(map, empowered) {
            return action;
        }

        let goal = self.select_goal(map, empowered);
        info!(
            "new goal {:?} at ({}, {})",
            goal.strategy, goal.position.x, goal.position.y
        );
        self.current_goal = Some(goal);

        let problem = SearchProblem::new(game, map, map.state().clone(), goal.position);
        let mut tree = SearchTree::new(problem, self.max_ancestor_walk);

        match tree.search(deadline) {
            Ok(plan) => {
                debug!(
                    "plan of {} actions found, avg branching {:.2}",
                    plan.len(),
                    tree.avg_branching()
                );
                self.plan = plan;
                match self.plan.pop() {
                    Some(action) => action,
                    None => self.fast_action(game, map),
                }
            }
            Err(e) => {
                warn!("{}", e);
                self.plan.clear();
                self.fast_action(game, map)
            }
        }
    }

    fn next_queued(&mut self, map: &BeliefMap, empowered: bool) -> Option<Direction> {
        if self.plan.is_empty() || !map.nothing_new_observed(empowered) {
            return None;
        }
        self.plan.pop()
    }

    /// Goal priority: closest known food, else closest known power-up
    /// unless already empowered, else an exploration frontier cell. The
    /// frontier pick retries once when it lands on the agent's own head.
    pub fn select_goal(&self, map: &BeliefMap, empowered: bool) -> Goal {
        if let Some(position) = map.closest_object(Belief::Food) {
            return Goal {
                strategy: Strategy::Food,
                position,
            };
        }

        if !empowered {
            if let Some(position) = map.closest_object(Belief::Super) {
                return Goal {
                    strategy: Strategy::Super,
                    position,
                };
            }
        }

        let head = map.state().head();
        let mut position = map.next_exploration(None);
        if position == Some(head) {
            position = map.next_exploration(Some(head));
        }

        Goal {
            strategy: Strategy::Exploration,
            position: position.unwrap_or(head),
        }
    }

    /// Emergency single-step heuristic, O(1) and non-blocking: move along
    /// the axis with the larger offset toward the current goal; if that is
    /// illegal, a uniformly random legal action; if nothing is legal, a
    /// uniformly random direction (last resort, may be rejected upstream).
    pub fn fast_action(&self, game: &SnakeGame, map: &BeliefMap) -> Direction {
        let state = map.state();
        let head = state.head();
        let goal = self.current_goal.map(|g| g.position).unwrap_or(head);

        let dx = (head.x - goal.x).abs();
        let dy = (head.y - goal.y).abs();
        let towards = if dx > dy {
            if head.x > goal.x {
                Direction::West
            } else {
                Direction::East
            }
        } else if head.y > goal.y {
            Direction::North
        } else {
            Direction::South
        };

        let legal = game.actions(state);
        if legal.contains(&towards) {
            return towards;
        }

        let mut rng = rand::rng();
        if let Some(&action) = legal.choose(&mut rng) {
            return action;
        }

        warn!("no legal action available, emitting a random direction");
        let all = Direction::all();
        all[rng.random_range(0..all.len())]
    }
}
