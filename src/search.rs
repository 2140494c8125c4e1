// Best-first search over snake states, A*-style, under a wall-clock
// deadline.
//
// Nodes live in an arena owned by the search episode; parent links are
// indices into it, never shared pointers. The frontier is a binary heap
// keyed by (cost + heuristic, insertion sequence) so equal priorities
// resolve by insertion order and runs are deterministic.

use log::debug;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

use crate::errors::SearchError;
use crate::game::SnakeGame;
use crate::mapping::{Belief, BeliefMap};
use crate::types::{Coord, Direction, GridState};

/// Binds a game model, a belief snapshot, an initial state, and a goal
/// coordinate into a search-ready problem.
pub struct SearchProblem<'a> {
    game: &'a SnakeGame,
    map: &'a BeliefMap,
    initial: GridState,
    goal: Coord,
}

impl<'a> SearchProblem<'a> {
    pub fn new(game: &'a SnakeGame, map: &'a BeliefMap, initial: GridState, goal: Coord) -> Self {
        SearchProblem {
            game,
            map,
            initial,
            goal,
        }
    }

    pub fn initial_state(&self) -> &GridState {
        &self.initial
    }

    pub fn is_goal(&self, state: &GridState) -> bool {
        self.game.is_goal(state, self.goal)
    }

    /// Legal successors as (action, next state, step cost). Growth is
    /// simulated when the destination is believed to hold food.
    pub fn successors(&self, state: &GridState) -> Vec<(Direction, GridState, u32)> {
        let head = state.head();
        self.game
            .actions(state)
            .into_iter()
            .map(|action| {
                let dest = action.apply(&head);
                let grows = matches!(self.map.belief_at(dest), Belief::Food | Belief::Super);
                let next = self.game.result(state, action, grows);
                let cost = self.game.cost(state, action, &next);
                (action, next, cost)
            })
            .collect()
    }

    /// Manhattan distance from the head to the goal. Admissible on an open
    /// grid; near obstacles it only degrades the search to satisficing,
    /// which the deadline regime accepts.
    pub fn heuristic(&self, state: &GridState) -> u32 {
        state.head().manhattan(&self.goal) as u32
    }
}

/// Where a search episode currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Unstarted,
    Running,
    Solved,
    Exhausted,
    TimeLimitExceeded,
}

/// One node in the search arena
struct SearchNode {
    state: GridState,
    parent: Option<usize>,
    depth: u32,
    cost: u32,
    heuristic: u32,
    action: Option<Direction>,
}

impl SearchNode {
    fn priority(&self) -> u32 {
        self.cost + self.heuristic
    }
}

/// Canonical state signature for duplicate pruning
type Signature = (Vec<Coord>, bool);

/// Best-first search engine over one problem instance.
/// Discard it once the episode ends; nodes do not outlive it.
pub struct SearchTree<'a> {
    problem: SearchProblem<'a>,
    nodes: Vec<SearchNode>,
    frontier: BinaryHeap<Reverse<(u32, u64, usize)>>,
    best_cost: HashMap<Signature, u32>,
    seq: u64,
    status: SearchStatus,
    expansions: u64,
    generated: u64,
    max_ancestor_walk: usize,
}

impl<'a> SearchTree<'a> {
    pub fn new(problem: SearchProblem<'a>, max_ancestor_walk: usize) -> Self {
        SearchTree {
            problem,
            nodes: Vec::new(),
            frontier: BinaryHeap::new(),
            best_cost: HashMap::new(),
            seq: 0,
            status: SearchStatus::Unstarted,
            expansions: 0,
            generated: 0,
            max_ancestor_walk,
        }
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn expansions(&self) -> u64 {
        self.expansions
    }

    /// Average children produced per expansion. Diagnostic only.
    pub fn avg_branching(&self) -> f64 {
        if self.expansions == 0 {
            0.0
        } else {
            self.generated as f64 / self.expansions as f64
        }
    }

    /// Runs the search until the goal is reached, the frontier empties, or
    /// the deadline passes. On success returns the inverse plan: the next
    /// action to execute sits at the end of the vector, so consuming it is
    /// a cheap pop.
    pub fn search(&mut self, deadline: Instant) -> Result<Vec<Direction>, SearchError> {
        let started = Instant::now();
        self.status = SearchStatus::Running;

        let root_state = self.problem.initial_state().clone();
        let root_h = self.problem.heuristic(&root_state);
        self.best_cost
            .insert((root_state.body.clone(), root_state.traverse), 0);
        self.push_node(SearchNode {
            state: root_state,
            parent: None,
            depth: 0,
            cost: 0,
            heuristic: root_h,
            action: None,
        });

        while let Some(idx) = self.pop_frontier(started, deadline)? {
            // A state regenerated at a lower cost leaves its earlier heap
            // entry behind; discard stale entries lazily at pop time so no
            // state is expanded twice
            let node = &self.nodes[idx];
            if self
                .best_cost
                .get(&(node.state.body.clone(), node.state.traverse))
                .is_some_and(|&seen| seen < node.cost)
            {
                continue;
            }

            if self.problem.is_goal(&self.nodes[idx].state) {
                self.status = SearchStatus::Solved;
                debug!(
                    "solved at depth {} after {} expansions",
                    self.nodes[idx].depth, self.expansions
                );
                return Ok(self.inverse_plan(idx));
            }

            self.expansions += 1;
            let successors = self.problem.successors(&self.nodes[idx].state);

            for (action, next, step_cost) in successors {
                if self.produced_by_ancestor(idx, &next) {
                    continue;
                }

                let cost = self.nodes[idx].cost + step_cost;
                let signature = (next.body.clone(), next.traverse);
                if self
                    .best_cost
                    .get(&signature)
                    .is_some_and(|&seen| seen <= cost)
                {
                    continue;
                }
                self.best_cost.insert(signature, cost);

                let heuristic = self.problem.heuristic(&next);
                self.generated += 1;
                self.push_node(SearchNode {
                    state: next,
                    parent: Some(idx),
                    depth: self.nodes[idx].depth + 1,
                    cost,
                    heuristic,
                    action: Some(action),
                });
            }
        }

        self.status = SearchStatus::Exhausted;
        Err(SearchError::Exhausted)
    }

    /// Pops the lowest-priority node, checking the deadline first so an
    /// already-past deadline fails before any expansion.
    fn pop_frontier(
        &mut self,
        started: Instant,
        deadline: Instant,
    ) -> Result<Option<usize>, SearchError> {
        if Instant::now() >= deadline {
            self.status = SearchStatus::TimeLimitExceeded;
            return Err(SearchError::TimeLimitExceeded {
                elapsed_ms: started.elapsed().as_millis() as u64,
                budget_ms: deadline.saturating_duration_since(started).as_millis() as u64,
            });
        }
        Ok(self.frontier.pop().map(|Reverse((_, _, idx))| idx))
    }

    fn push_node(&mut self, node: SearchNode) {
        let key = (node.priority(), self.seq, self.nodes.len());
        self.seq += 1;
        self.nodes.push(node);
        self.frontier.push(Reverse(key));
    }

    /// Anti-cycle check: the new state counts as already produced when its
    /// full body sequence is contained in an ancestor's body and their
    /// traverse flags match. Walks the parent chain iteratively with a
    /// depth guard.
    fn produced_by_ancestor(&self, node: usize, state: &GridState) -> bool {
        let mut current = self.nodes[node].parent;
        let mut walked = 0;

        while let Some(idx) = current {
            if walked >= self.max_ancestor_walk {
                return false;
            }
            walked += 1;

            let ancestor = &self.nodes[idx];
            if ancestor.state.traverse == state.traverse
                && state.body.iter().all(|b| ancestor.state.body.contains(b))
            {
                return true;
            }
            current = ancestor.parent;
        }

        false
    }

    /// Reconstructs the action sequence by walking parent links from the
    /// goal node to the root. The result is goal-first, so the immediately
    /// next action is at the end of the vector.
    fn inverse_plan(&self, goal: usize) -> Vec<Direction> {
        let mut plan = Vec::with_capacity(self.nodes[goal].depth as usize);
        let mut current = goal;

        while let Some(parent) = self.nodes[current].parent {
            if let Some(action) = self.nodes[current].action {
                plan.push(action);
            }
            current = parent;
        }

        plan
    }
}
