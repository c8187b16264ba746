use crate::error::Result;
use crate::session::{ConversationSession, Step};
use crate::step::{NextAction, StepHandler, StepResult};

use super::prompts;
use super::validation::mentions_evidence;

/// Waits for the user to confirm the photos/video were sent.
pub struct EvidenceStep;

impl StepHandler for EvidenceStep {
    fn step(&self) -> Step {
        Step::Evidence
    }

    fn handle(&self, _session: &mut ConversationSession, input: &str) -> Result<StepResult> {
        if !mentions_evidence(input) {
            return Ok(StepResult::reprompt(prompts::evidence_reminder()));
        }
        Ok(StepResult::new(
            prompts::ask_account(),
            NextAction::GoTo(Step::Account),
        ))
    }
}
