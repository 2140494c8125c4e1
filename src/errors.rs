// Error taxonomy for the agent
//
// Search failures are recoverable values: the planner answers them with the
// emergency heuristic instead of letting them cross the session loop.

use thiserror::Error;

/// Outcomes of a search episode that produced no usable plan
#[derive(Debug, Error)]
pub enum SearchError {
    /// The wall-clock deadline was reached mid-expansion
    #[error("search time limit exceeded: {elapsed_ms}ms elapsed of a {budget_ms}ms budget")]
    TimeLimitExceeded { elapsed_ms: u64, budget_ms: u64 },

    /// The frontier emptied without reaching the goal
    #[error("search frontier exhausted without reaching the goal")]
    Exhausted,
}

/// Session-level failures. A clean server close is not one of these; the
/// transport reports it as a regular message and the loop ends gracefully.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("transport i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed server message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("server closed the connection before the join acknowledgment")]
    HandshakeClosed,
}
