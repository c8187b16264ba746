use tracing::info;

use crate::error::{FlowError, Result};
use crate::session::{ConversationSession, Step};
use crate::step::{NextAction, StepHandler, StepResult};

use super::prompts;
use super::validation::{Answer, classify_answer};

/// Walks the remediation script one instruction per "not resolved" answer.
pub struct TroubleshootingStep;

impl StepHandler for TroubleshootingStep {
    fn step(&self) -> Step {
        Step::Troubleshooting
    }

    fn handle(&self, session: &mut ConversationSession, input: &str) -> Result<StepResult> {
        let index = session.claim.remediation_index.ok_or_else(|| {
            FlowError::SessionError("troubleshooting without a remediation cursor".to_string())
        })?;

        match classify_answer(input) {
            Answer::Resolved => {
                info!(user_id = %session.user_id, step_index = index, "Problem resolved by remediation");
                Ok(StepResult::new(prompts::resolved(), NextAction::End))
            }
            Answer::NotResolved => {
                let next = index + 1;
                match session.claim.remediation_steps.get(next) {
                    Some(instruction) => {
                        let message = prompts::next_remediation(next, instruction);
                        session.claim.remediation_index = Some(next);
                        Ok(StepResult::new(message, NextAction::WaitForInput))
                    }
                    None => {
                        info!(
                            user_id = %session.user_id,
                            "Remediation script exhausted, collecting refund claim"
                        );
                        session.claim.remediation_index = None;
                        Ok(StepResult::new(
                            prompts::remediation_exhausted(),
                            NextAction::GoTo(Step::MachineNumber),
                        ))
                    }
                }
            }
            Answer::Unrecognized => Ok(StepResult::reprompt(prompts::answer_only())),
        }
    }
}
