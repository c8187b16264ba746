use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::{
    error::{FlowError, Result},
    message::OutboundMessage,
    session::{ClaimRecord, ConversationSession, Step},
    step::{NextAction, StepHandler},
    steps::prompts,
};

/// Condition under which a declared transition is taken. Descriptive: the
/// handler decides, the graph only checks the move was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Always,
    KnownProblem,
    Resolved,
    RemediationExhausted,
    MinChars(usize),
    MinFields(usize),
    Contains(&'static str),
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Always => write!(f, "always"),
            Guard::KnownProblem => write!(f, "input is a catalog key"),
            Guard::Resolved => write!(f, "answer is resolved"),
            Guard::RemediationExhausted => write!(f, "not resolved after the last remediation step"),
            Guard::MinChars(n) => write!(f, "at least {n} characters"),
            Guard::MinFields(n) => write!(f, "at least {n} comma-separated fields"),
            Guard::Contains(phrase) => write!(f, "contains \"{phrase}\""),
        }
    }
}

/// Declared edge between steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Step,
    pub to: Step,
    pub guard: Guard,
}

/// Conversation state machine: one handler per step plus the declared
/// transitions between steps.
pub struct Graph {
    pub id: String,
    handlers: HashMap<Step, Arc<dyn StepHandler>>,
    transitions: Vec<Transition>,
}

impl Graph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            handlers: HashMap::new(),
            transitions: Vec::new(),
        }
    }

    /// Register the handler for `handler.step()`, replacing any previous one
    pub fn add_step(&mut self, handler: Arc<dyn StepHandler>) -> &mut Self {
        self.handlers.insert(handler.step(), handler);
        self
    }

    /// Declare a transition between steps
    pub fn add_transition(&mut self, from: Step, to: Step, guard: Guard) -> &mut Self {
        self.transitions.push(Transition { from, to, guard });
        self
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transitions_from(&self, step: Step) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().filter(move |t| t.from == step)
    }

    /// Guard of the declared transition `from -> to`, if any.
    pub fn guard_for(&self, from: Step, to: Step) -> Option<Guard> {
        self.transitions_from(from)
            .find(|t| t.to == to)
            .map(|t| t.guard)
    }

    /// Staying on the same step is always allowed.
    pub fn is_allowed(&self, from: Step, to: Step) -> bool {
        from == to || self.transitions_from(from).any(|t| t.to == to)
    }

    /// Get the handler for a step
    pub fn get_handler(&self, step: Step) -> Option<Arc<dyn StepHandler>> {
        self.handlers.get(&step).cloned()
    }

    /// Check that every step has a handler and an exit, and that every step
    /// is reachable from [`Step::Start`].
    pub fn validate(&self) -> Result<()> {
        for step in Step::ALL {
            if !self.handlers.contains_key(&step) {
                return Err(FlowError::InvalidGraph(format!("no handler for step {step}")));
            }
            if self.transitions_from(step).next().is_none() {
                return Err(FlowError::InvalidGraph(format!(
                    "step {step} has no outgoing transition"
                )));
            }
        }

        let mut reached = BTreeSet::from([Step::Start]);
        let mut queue = VecDeque::from([Step::Start]);
        while let Some(step) = queue.pop_front() {
            for transition in self.transitions_from(step) {
                if reached.insert(transition.to) {
                    queue.push_back(transition.to);
                }
            }
        }
        if let Some(unreachable) = Step::ALL.iter().find(|s| !reached.contains(*s)) {
            return Err(FlowError::InvalidGraph(format!(
                "step {unreachable} is unreachable from start"
            )));
        }

        Ok(())
    }

    /// Run the handler for the session's current step and apply its
    /// outcome. The session is only modified when the whole turn succeeds.
    pub fn execute(&self, session: &mut ConversationSession, input: &str) -> Result<ExecutionResult> {
        let from = session.step;
        let handler = self
            .get_handler(from)
            .ok_or(FlowError::StepNotFound(from))?;

        debug!(user_id = %session.user_id, step = %from, "running step");

        let mut draft = session.clone();
        let result = handler.handle(&mut draft, input.trim())?;

        let status = match result.next_action {
            NextAction::WaitForInput => ExecutionStatus::WaitingForInput,
            NextAction::GoTo(to) => {
                if !self.is_allowed(from, to) {
                    return Err(FlowError::IllegalTransition { from, to });
                }
                draft.step = to;
                ExecutionStatus::WaitingForInput
            }
            NextAction::End => {
                if !self.is_allowed(from, Step::Start) {
                    return Err(FlowError::IllegalTransition {
                        from,
                        to: Step::Start,
                    });
                }
                draft.reset();
                ExecutionStatus::Completed
            }
        };

        if draft.step != from {
            let guard = self
                .guard_for(from, draft.step)
                .map(|g| g.to_string())
                .unwrap_or_default();
            info!(
                user_id = %session.user_id,
                from = %from,
                to = %draft.step,
                guard = %guard,
                "Step transition"
            );
        }
        *session = draft;

        Ok(ExecutionResult {
            message: result.message,
            status,
            submission: result.submission,
        })
    }

    /// Like [`Graph::execute`], but a failed turn becomes a generic restart
    /// prompt. The session step is left as it was; it is not reset.
    pub fn execute_or_restart(&self, session: &mut ConversationSession, input: &str) -> ExecutionResult {
        match self.execute(session, input) {
            Ok(result) => result,
            Err(e) => {
                error!(
                    user_id = %session.user_id,
                    step = %session.step,
                    error = %e,
                    "Failed to handle message"
                );
                ExecutionResult {
                    message: prompts::please_restart(),
                    status: ExecutionStatus::Error(e.to_string()),
                    submission: None,
                }
            }
        }
    }
}

/// Builder for creating graphs
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            graph: Graph::new(id),
        }
    }

    pub fn add_step(mut self, handler: Arc<dyn StepHandler>) -> Self {
        self.graph.add_step(handler);
        self
    }

    pub fn add_transition(mut self, from: Step, to: Step, guard: Guard) -> Self {
        self.graph.add_transition(from, to, guard);
        self
    }

    /// Validate and return the graph
    pub fn build(self) -> Result<Graph> {
        self.graph.validate()?;
        Ok(self.graph)
    }
}

/// Outcome of one conversation turn
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub message: OutboundMessage,
    pub status: ExecutionStatus,
    pub submission: Option<ClaimRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Waiting for the user's next message
    WaitingForInput,
    /// Conversation finished and the session was reset
    Completed,
    /// The turn failed; the user was asked to restart
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::ProblemCatalog, workflow::build_support_workflow};

    #[test]
    fn declared_guards_are_found_and_described() {
        let graph = build_support_workflow(Arc::new(ProblemCatalog::default())).unwrap();

        let guard = graph.guard_for(Step::Location, Step::CustomerInfo).unwrap();
        assert_eq!(guard, Guard::MinChars(10));
        assert_eq!(guard.to_string(), "at least 10 characters");
        assert_eq!(
            graph
                .guard_for(Step::Evidence, Step::Account)
                .unwrap()
                .to_string(),
            "contains \"เรียบร้อย\""
        );
        assert!(graph.guard_for(Step::Start, Step::Account).is_none());
    }

    #[test]
    fn handlers_are_registered_for_every_step() {
        let graph = build_support_workflow(Arc::new(ProblemCatalog::default())).unwrap();
        for step in Step::ALL {
            assert_eq!(graph.get_handler(step).unwrap().step(), step);
        }
    }
}
