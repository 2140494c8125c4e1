// End-to-end episode tests driving the agent session over a scripted
// transport: join handshake, per-tick key emission, and graceful endings.

use std::collections::HashMap;

use snake_agent::agent::Agent;
use snake_agent::config::Config;
use snake_agent::errors::AgentError;
use snake_agent::transport::{ScriptedTransport, ServerMessage};
use snake_agent::types::{Coord, MapInfo, Observation};

fn c(x: i32, y: i32) -> Coord {
    Coord { x, y }
}

fn map_info(width: usize, height: usize) -> MapInfo {
    MapInfo {
        map: vec![vec![0u8; height]; width],
        fps: 10,
        timeout: 3000,
    }
}

fn observation(step: u64, body: Vec<Coord>, sight: Vec<(i32, i32, u8)>) -> ServerMessage {
    let mut patches: HashMap<i32, HashMap<i32, u8>> = HashMap::new();
    for (x, y, code) in sight {
        patches.entry(x).or_default().insert(y, code);
    }
    ServerMessage::Observation(Observation {
        ts: chrono::Utc::now().naive_utc(),
        step,
        body,
        sight: patches,
        traverse: false,
    })
}

#[tokio::test]
async fn test_episode_emits_one_key_per_tick() {
    let transport = ScriptedTransport::new(vec![
        ServerMessage::MapInfo(map_info(8, 8)),
        observation(1, vec![c(4, 4)], vec![(6, 4, 2)]),
        observation(2, vec![c(5, 4)], vec![(6, 4, 2)]),
        observation(3, vec![c(6, 4), c(5, 4)], vec![(6, 4, 4)]),
        ServerMessage::GameOver,
    ]);
    let sent = transport.sent();

    let mut agent = Agent::connect(transport, "tester", Config::default_hardcoded())
        .await
        .expect("handshake succeeds");
    agent.play().await.expect("episode runs to game over");

    let sent = sent.lock().unwrap();
    assert_eq!(sent[0], "join:tester");

    let keys = &sent[1..];
    assert_eq!(keys.len(), 3, "exactly one key per observation");
    for key in keys {
        assert!(
            ["w", "a", "s", "d"].contains(&key.as_str()),
            "unexpected wire key {:?}",
            key
        );
    }
}

#[tokio::test]
async fn test_clean_close_ends_the_episode_without_error() {
    let transport = ScriptedTransport::new(vec![
        ServerMessage::MapInfo(map_info(6, 6)),
        observation(1, vec![c(2, 2)], vec![]),
        // Script runs dry: the transport reports a clean close
    ]);
    let sent = transport.sent();

    let mut agent = Agent::connect(transport, "tester", Config::default_hardcoded())
        .await
        .expect("handshake succeeds");
    agent
        .play()
        .await
        .expect("clean close is not an error");

    assert_eq!(sent.lock().unwrap().len(), 2, "join plus one key");
}

#[tokio::test]
async fn test_handshake_without_map_info_fails() {
    let transport = ScriptedTransport::new(vec![]);

    let result = Agent::connect(transport, "tester", Config::default_hardcoded()).await;
    assert!(matches!(result, Err(AgentError::HandshakeClosed)));
}

#[tokio::test]
async fn test_stale_plan_action_is_replaced_with_a_legal_one() {
    // The first tick plans east toward the food. The second observation
    // reports a body that blocks the queued east move, so the agent must
    // emit a substitute key that is legal for the updated state, never
    // the stale planned one
    let transport = ScriptedTransport::new(vec![
        ServerMessage::MapInfo(map_info(8, 8)),
        observation(1, vec![c(2, 2)], vec![(6, 2, 2)]),
        observation(2, vec![c(3, 2), c(4, 2), c(4, 1)], vec![(6, 2, 2)]),
        ServerMessage::GameOver,
    ]);
    let sent = transport.sent();

    let mut agent = Agent::connect(transport, "tester", Config::default_hardcoded())
        .await
        .expect("handshake succeeds");
    agent.play().await.expect("episode runs to game over");

    let sent = sent.lock().unwrap();
    assert_eq!(sent[1], "d", "the first planned step heads for the food");
    assert_ne!(sent[2], "d", "the queued east move is blocked by the body");
    assert!(
        ["w", "a", "s"].contains(&sent[2].as_str()),
        "the substitute must be legal, got {:?}",
        sent[2]
    );
}

#[tokio::test]
async fn test_agent_eats_the_adjacent_food() {
    // Food directly east of the head: the first planned key must be "d"
    let transport = ScriptedTransport::new(vec![
        ServerMessage::MapInfo(map_info(6, 6)),
        observation(1, vec![c(2, 2)], vec![(3, 2, 2)]),
        ServerMessage::GameOver,
    ]);
    let sent = transport.sent();

    let mut agent = Agent::connect(transport, "tester", Config::default_hardcoded())
        .await
        .expect("handshake succeeds");
    agent.play().await.expect("episode runs to game over");

    let sent = sent.lock().unwrap();
    assert_eq!(sent[1], "d");
}
