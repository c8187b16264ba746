use crate::{
    error::Result,
    message::OutboundMessage,
    session::{ClaimRecord, ConversationSession, Step},
};

/// Result of running one step handler
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Message to send back to the user
    pub message: OutboundMessage,
    /// Where the conversation goes next
    pub next_action: NextAction,
    /// Completed claim to hand to the record sink
    pub submission: Option<ClaimRecord>,
}

impl StepResult {
    pub fn new(message: OutboundMessage, next_action: NextAction) -> Self {
        Self {
            message,
            next_action,
            submission: None,
        }
    }

    /// Invalid input: answer with a correction prompt and stay put.
    pub fn reprompt(message: OutboundMessage) -> Self {
        Self::new(message, NextAction::WaitForInput)
    }

    pub fn with_submission(mut self, record: ClaimRecord) -> Self {
        self.submission = Some(record);
        self
    }
}

/// Defines what should happen to the session after a handler returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// Stay on the current step and wait for the next message
    WaitForInput,
    /// Move to a specific step
    GoTo(Step),
    /// Conversation finished: reset the session to `{Start, empty claim}`
    End,
}

/// Core trait that every conversation step implements
pub trait StepHandler: Send + Sync {
    /// The step this handler serves
    fn step(&self) -> Step;

    /// Interpret `input` against the session. Invalid input is answered
    /// with [`StepResult::reprompt`]; `Err` is reserved for broken session
    /// invariants.
    fn handle(&self, session: &mut ConversationSession, input: &str) -> Result<StepResult>;
}
