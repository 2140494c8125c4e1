// Replay module for analyzing recorded episodes
//
// Re-runs the observations of a decision log through a fresh belief map
// and planner, then compares the recomputed actions against the recorded
// ones. Mismatches usually point at timing pressure during the live game.

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::debug_logger::{DecisionRecord, HeaderRecord, LogRecord};
use crate::game::SnakeGame;
use crate::mapping::BeliefMap;
use crate::planner::{Planner, Strategy};
use crate::types::Direction;

/// Result of replaying a single tick
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub step: u64,
    pub original_action: Direction,
    pub replayed_action: Direction,
    pub matches: bool,
    pub original_strategy: Strategy,
    pub replayed_strategy: Option<Strategy>,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_steps: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for decision logs
pub struct ReplayEngine {
    config: Config,
    budget: Duration,
    verbose: bool,
}

impl ReplayEngine {
    pub fn new(config: Config, budget_ms: u64, verbose: bool) -> Self {
        ReplayEngine {
            config,
            budget: Duration::from_millis(budget_ms),
            verbose,
        }
    }

    /// Loads the episode header and all decision records from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(
        &self,
        log_path: P,
    ) -> Result<(HeaderRecord, Vec<DecisionRecord>), String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut header = None;
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let record: LogRecord = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            match record {
                LogRecord::Header(h) => header = Some(h),
                LogRecord::Decision(d) => records.push(d),
            }
        }

        let header = header.ok_or("Log file has no episode header")?;
        info!("Loaded {} decision records", records.len());
        Ok((header, records))
    }

    /// Replays every recorded tick in order through a fresh session.
    /// Records must be replayed in sequence: the belief map accumulates.
    pub fn replay_all(
        &self,
        header: &HeaderRecord,
        records: &[DecisionRecord],
    ) -> Vec<ReplayResult> {
        let mut mapping = BeliefMap::from_matrix(&header.map.map);
        let game = SnakeGame::new(mapping.width(), mapping.height(), mapping.walls().clone());
        let mut planner = Planner::new(&self.config);

        let mut results = Vec::with_capacity(records.len());

        for record in records {
            mapping.update(&record.observation);

            let started = Instant::now();
            let replayed_action = planner.decide(
                &game,
                &mapping,
                record.observation.traverse,
                started + self.budget,
            );
            let computation_time = started.elapsed().as_millis();

            let matches = replayed_action == record.action;
            let result = ReplayResult {
                step: record.step,
                original_action: record.action,
                replayed_action,
                matches,
                original_strategy: record.goal.strategy,
                replayed_strategy: planner.current_goal().map(|g| g.strategy),
                computation_time_ms: computation_time,
            };

            if self.verbose {
                if matches {
                    info!(
                        "Step {}: MATCH - {} ({}ms)",
                        record.step,
                        replayed_action.as_str(),
                        computation_time
                    );
                } else {
                    warn!(
                        "Step {}: MISMATCH - original: {}, replayed: {} ({}ms)",
                        record.step,
                        record.action.as_str(),
                        replayed_action.as_str(),
                        computation_time
                    );
                }
            }

            results.push(result);
        }

        results
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_steps = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_steps - matches;
        let match_rate = if total_steps > 0 {
            (matches as f64 / total_steps as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_steps,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Steps:    {}", stats.total_steps);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_ms as f64)
                .sum::<f64>()
                / results.len() as f64;
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Step {}: {} → {} (strategy: {:?} → {:?}, time: {}ms)",
                    result.step,
                    result.original_action.as_str(),
                    result.replayed_action.as_str(),
                    result.original_strategy,
                    result.replayed_strategy,
                    result.computation_time_ms
                );
            }
            println!();
        }
    }
}
