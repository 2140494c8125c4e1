// Configuration module for reading Agent.toml
// Tunable parameters for timing, search pruning, and debug logging

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub search: SearchConfig,
    pub debug: DebugConfig,
}

/// Timing constants for the per-tick planning deadline
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    /// Subtracted from the tick period to leave room for emission
    pub safety_margin_ms: u64,
    /// Floor for the planning budget, whatever the tick rate says
    pub min_budget_ms: u64,
}

impl TimingConfig {
    /// Planning budget for one tick: the tick period minus the safety
    /// margin, never below the configured floor
    pub fn tick_budget_ms(&self, fps: u32) -> u64 {
        let period_ms = 1000 / (fps as u64 + 1);
        period_ms
            .saturating_sub(self.safety_margin_ms)
            .max(self.min_budget_ms)
    }
}

/// Search pruning constants
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Cap on the iterative parent-chain walk of the ancestor cycle check
    pub max_ancestor_walk: usize,
}

/// Debug decision-log configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Agent.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Agent.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Agent.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                safety_margin_ms: 15,
                min_budget_ms: 10,
            },
            search: SearchConfig {
                max_ancestor_walk: 128,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "snake_agent_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load Agent.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}
