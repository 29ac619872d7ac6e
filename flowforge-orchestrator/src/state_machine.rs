//! ABOUTME: The Orchestrator's execution-status state machine (§4.6)
//! ABOUTME: Modeled as a pure `(State, Event) -> State` transition, in the teacher's lifecycle-state-machine style

use serde::{Deserialize, Serialize};

/// Pipeline run states (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Initial,
    Parsing,
    Reasoning,
    Validating,
    Generating,
    Complete,
    Escalated,
    Failed,
}

impl ExecutionStatus {
    /// Whether a run in this state has already terminated (§3.6: `State` is
    /// discarded once a run reaches `complete`, `escalated`, or `failed`).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Escalated | Self::Failed)
    }
}

/// Events fed into the transition function by the controller driver.
#[derive(Debug, Clone)]
pub enum Event {
    StartParsing,
    ParsingDone,
    StartReasoning,
    ReasoningSucceeded,
    ReasoningFailed { retryable: bool },
    StartValidating,
    ValidationSucceeded,
    ValidationFailed { retryable: bool },
    RetryBudgetExhausted,
    LowConfidence,
    StartGenerating,
    GenerationSucceeded,
    GenerationFailed,
    Cancelled,
    TimedOut,
}

/// One entry in the controller's transition-history log, persisted alongside
/// `State` for checkpointing and post-mortem review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: ExecutionStatus,
    pub to: ExecutionStatus,
    pub event: String,
}

/// Pure state transition. The controller is a thin driver that calls this
/// with whatever event just occurred; it holds no branching logic of its own
/// (§9 "LLM retry loop" design note).
#[must_use]
pub fn transition(state: ExecutionStatus, event: &Event) -> ExecutionStatus {
    use ExecutionStatus::{Complete, Escalated, Failed, Generating, Initial, Parsing, Reasoning, Validating};
    match (state, event) {
        (Initial, Event::StartParsing) => Parsing,
        (Parsing, Event::ParsingDone) => Parsing,
        (Parsing, Event::StartReasoning) => Reasoning,
        (Reasoning, Event::ReasoningSucceeded) => Validating,
        (Reasoning, Event::ReasoningFailed { retryable: true }) => Reasoning,
        (Reasoning, Event::ReasoningFailed { retryable: false }) => Failed,
        (Validating, Event::StartValidating) => Validating,
        (Validating, Event::ValidationSucceeded) => Generating,
        (Validating, Event::ValidationFailed { retryable: true }) => Reasoning,
        (Validating, Event::ValidationFailed { retryable: false }) => Failed,
        (Reasoning, Event::RetryBudgetExhausted) => Escalated,
        (Validating, Event::RetryBudgetExhausted) => Escalated,
        (Validating, Event::LowConfidence) => Escalated,
        (Generating, Event::GenerationSucceeded) => Complete,
        (Generating, Event::GenerationFailed) => Failed,
        (_, Event::Cancelled) => Failed,
        (_, Event::TimedOut) => Failed,
        (current, _) => current,
    }
}
