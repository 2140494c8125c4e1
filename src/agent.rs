// Agent session: one connection, one belief map, one planner.
//
// Single logical thread of control: the loop blocks on the next
// observation, runs one bounded planning step, and emits one action. The
// search deadline is enforced inside the engine, so nothing here needs
// cancellation or locking.

use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::debug_logger::{DebugLogger, DecisionRecord};
use crate::errors::AgentError;
use crate::game::SnakeGame;
use crate::mapping::BeliefMap;
use crate::planner::Planner;
use crate::transport::{ServerMessage, Transport};
use crate::types::{Direction, Observation};

/// Per-agent session object. Multiple agents in one process each own an
/// independent instance; nothing is shared.
pub struct Agent<T: Transport> {
    name: String,
    transport: T,
    mapping: BeliefMap,
    game: SnakeGame,
    planner: Planner,
    tick_budget: Duration,
    empowered: bool,
    debug_log: DebugLogger,
}

impl<T: Transport> Agent<T> {
    /// Joins the game and builds the session from the map metadata the
    /// server acknowledges with.
    pub async fn connect(mut transport: T, name: &str, config: Config) -> Result<Self, AgentError> {
        transport.send_join(name).await?;
        debug!("[{}] waiting for game information", name);

        let info = match transport.recv().await? {
            ServerMessage::MapInfo(info) => info,
            _ => return Err(AgentError::HandshakeClosed),
        };

        let mapping = BeliefMap::from_matrix(&info.map);
        let game = SnakeGame::new(mapping.width(), mapping.height(), mapping.walls().clone());
        let planner = Planner::new(&config);
        let tick_budget = Duration::from_millis(config.timing.tick_budget_ms(info.fps));

        let debug_log = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
        debug_log.log_header(name, &info);

        info!(
            "[{}] joined: {}x{} grid, {} fps, timeout {}, planning budget {}ms",
            name,
            mapping.width(),
            mapping.height(),
            info.fps,
            info.timeout,
            tick_budget.as_millis()
        );

        Ok(Agent {
            name: name.to_string(),
            transport,
            mapping,
            game,
            planner,
            tick_budget,
            empowered: false,
            debug_log,
        })
    }

    /// Main loop: observe, think, act, once per tick, until the server
    /// reports game over or closes the connection.
    pub async fn play(&mut self) -> Result<(), AgentError> {
        loop {
            let obs = match self.transport.recv().await? {
                ServerMessage::Observation(obs) => obs,
                ServerMessage::GameOver => {
                    warn!("[{}] game over", self.name);
                    break;
                }
                ServerMessage::Closed => {
                    warn!("[{}] server has cleanly disconnected us", self.name);
                    break;
                }
                ServerMessage::MapInfo(_) => {
                    warn!("[{}] unexpected map info mid-game, ignoring", self.name);
                    continue;
                }
            };

            let arrived = Instant::now();
            debug!("[{}] received state, step {}", self.name, obs.step);

            self.observe(&obs);
            let action = self.think(arrived + self.tick_budget);
            self.act(&obs, action, arrived).await?;

            debug!(
                "[{}] step {} handled in {}ms",
                self.name,
                obs.step,
                arrived.elapsed().as_millis()
            );
        }
        Ok(())
    }

    fn observe(&mut self, obs: &Observation) {
        self.empowered = obs.traverse;
        self.mapping.update(obs);
    }

    fn think(&mut self, deadline: Instant) -> Direction {
        self.planner
            .decide(&self.game, &self.mapping, self.empowered, deadline)
    }

    /// Validates the chosen action against the current belief state and
    /// emits it. A stale plan can propose a move the model no longer
    /// allows; that is replaced, loudly, never silently sent.
    async fn act(
        &mut self,
        obs: &Observation,
        action: Direction,
        arrived: Instant,
    ) -> Result<(), AgentError> {
        let legal = self.game.actions(self.mapping.state());

        let action = if legal.contains(&action) || legal.is_empty() {
            action
        } else {
            error!(
                "[{}] action {} not possible (legal: {:?}), substituting fast action",
                self.name,
                action.as_str(),
                legal.iter().map(|d| d.as_str()).collect::<Vec<_>>()
            );
            self.planner.fast_action(&self.game, &self.mapping)
        };

        if let Some(goal) = self.planner.current_goal() {
            self.debug_log.log_decision(DecisionRecord {
                step: obs.step,
                observation: obs.clone(),
                goal,
                action,
                plan_len: self.planner.plan_len(),
                elapsed_ms: arrived.elapsed().as_millis() as u64,
                timestamp: chrono::Utc::now().to_rfc3339(),
            });
        }

        self.transport.send_key(action.as_key()).await
    }
}
