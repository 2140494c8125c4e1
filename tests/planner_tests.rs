// Planner tests: goal priority, plan reuse, and the emergency heuristic.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use snake_agent::config::Config;
use snake_agent::game::SnakeGame;
use snake_agent::mapping::BeliefMap;
use snake_agent::planner::{Planner, Strategy};
use snake_agent::types::{Coord, Observation};

fn c(x: i32, y: i32) -> Coord {
    Coord { x, y }
}

fn obs(step: u64, body: Vec<Coord>, sight: Vec<(i32, i32, u8)>, traverse: bool) -> Observation {
    let mut patches: HashMap<i32, HashMap<i32, u8>> = HashMap::new();
    for (x, y, code) in sight {
        patches.entry(x).or_default().insert(y, code);
    }
    Observation {
        ts: chrono::Utc::now().naive_utc(),
        step,
        body,
        sight: patches,
        traverse,
    }
}

fn open_map(width: usize, height: usize) -> BeliefMap {
    BeliefMap::from_matrix(&vec![vec![0u8; height]; width])
}

fn planner() -> Planner {
    Planner::new(&Config::default_hardcoded())
}

fn deadline() -> Instant {
    Instant::now() + Duration::from_secs(2)
}

#[test]
fn test_food_beats_super_and_exploration() {
    let mut map = open_map(6, 6);
    // Both a food and a closer super are known; food still wins
    map.update(&obs(
        1,
        vec![c(0, 0)],
        vec![(4, 4, 2), (1, 0, 3)],
        false,
    ));

    let goal = planner().select_goal(&map, false);
    assert_eq!(goal.strategy, Strategy::Food);
    assert_eq!(goal.position, c(4, 4));
}

#[test]
fn test_super_chosen_when_no_food_and_not_empowered() {
    let mut map = open_map(6, 6);
    map.update(&obs(1, vec![c(0, 0)], vec![(3, 3, 3)], false));

    let goal = planner().select_goal(&map, false);
    assert_eq!(goal.strategy, Strategy::Super);
    assert_eq!(goal.position, c(3, 3));
}

#[test]
fn test_empowered_agent_skips_supers() {
    let mut map = open_map(6, 6);
    map.update(&obs(1, vec![c(0, 0)], vec![(3, 3, 3)], true));

    let goal = planner().select_goal(&map, true);
    assert_eq!(goal.strategy, Strategy::Exploration);
    assert_ne!(goal.position, c(0, 0), "exploration avoids the head");
}

#[test]
fn test_decide_follows_the_plan_when_nothing_new() {
    let game = SnakeGame::new(6, 6, Default::default());
    let mut map = open_map(6, 6);
    let mut planner = planner();

    // Food four steps east; first cycle plans toward it
    map.update(&obs(1, vec![c(0, 0)], vec![(4, 0, 2)], false));
    let first = planner.decide(&game, &map, false, deadline());
    assert!(game.actions(map.state()).contains(&first));
    let remaining = planner.plan_len();
    assert_eq!(remaining, 3, "a 4-step plan minus the popped action");

    // Same food re-reported: no news, the plan is reused, not rebuilt
    map.update(&obs(2, vec![c(1, 0)], vec![(4, 0, 2)], false));
    let second = planner.decide(&game, &map, false, deadline());
    assert!(game.actions(map.state()).contains(&second));
    assert_eq!(planner.plan_len(), remaining - 1);
}

#[test]
fn test_fresh_food_triggers_a_replan() {
    let game = SnakeGame::new(8, 8, Default::default());
    let mut map = open_map(8, 8);
    let mut planner = planner();

    map.update(&obs(1, vec![c(0, 0)], vec![(6, 0, 2)], false));
    planner.decide(&game, &map, false, deadline());
    let before = planner.plan_len();
    assert!(before > 0);

    // A closer food appears: the stale plan must be replaced wholesale
    map.update(&obs(2, vec![c(1, 0)], vec![(1, 1, 2)], false));
    planner.decide(&game, &map, false, deadline());
    assert_eq!(
        planner.current_goal().map(|g| g.position),
        Some(c(1, 1)),
        "goal must move to the fresh food"
    );
    assert!(planner.plan_len() < before);
}

#[test]
fn test_unreachable_goal_falls_back_to_a_legal_action() {
    // Food sealed in a corner by stones
    let mut matrix = vec![vec![0u8; 6]; 6];
    matrix[5][4] = 1;
    matrix[4][5] = 1;
    let mut map = BeliefMap::from_matrix(&matrix);
    let walls = map.walls().clone();
    let game = SnakeGame::new(6, 6, walls);
    let mut planner = planner();

    map.update(&obs(1, vec![c(0, 0)], vec![(5, 5, 2)], false));
    let action = planner.decide(&game, &map, false, deadline());

    assert!(
        game.actions(map.state()).contains(&action),
        "emergency fallback must still be legal"
    );
}

#[test]
fn test_fast_action_prefers_the_larger_axis() {
    let game = SnakeGame::new(10, 10, Default::default());
    let mut map = open_map(10, 10);
    let mut planner = planner();

    // Goal far east, slightly south: the x offset dominates
    map.update(&obs(1, vec![c(0, 0)], vec![(8, 1, 2)], false));
    planner.decide(&game, &map, false, deadline());

    let action = planner.fast_action(&game, &map);
    assert_eq!(action.as_str(), "EAST");
}

#[test]
fn test_fast_action_stays_legal_when_moves_exist() {
    // Head in a corner with one stone: only two legal moves remain
    let mut matrix = vec![vec![0u8; 5]; 5];
    matrix[0][1] = 1;
    let mut map = BeliefMap::from_matrix(&matrix);
    let walls = map.walls().clone();
    let game = SnakeGame::new(5, 5, walls);
    let planner = planner();

    map.update(&obs(1, vec![c(0, 0)], vec![], false));
    let legal = game.actions(map.state());
    assert!(!legal.is_empty());

    for _ in 0..50 {
        let action = planner.fast_action(&game, &map);
        assert!(legal.contains(&action));
    }
}

#[test]
fn test_fast_action_emits_something_even_when_boxed_in() {
    // Fully sealed corner: no legal action exists at all
    let mut matrix = vec![vec![0u8; 5]; 5];
    matrix[0][1] = 1;
    matrix[1][0] = 1;
    let mut map = BeliefMap::from_matrix(&matrix);
    let walls = map.walls().clone();
    let game = SnakeGame::new(5, 5, walls);
    let planner = planner();

    map.update(&obs(1, vec![c(0, 0)], vec![], false));
    assert!(game.actions(map.state()).is_empty());

    // Last resort: any direction, possibly illegal, but always something
    let action = planner.fast_action(&game, &map);
    assert!(["NORTH", "WEST", "SOUTH", "EAST"].contains(&action.as_str()));
}
