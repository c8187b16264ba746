use crate::error::Result;
use crate::session::{ConversationSession, Step};
use crate::step::{NextAction, StepHandler, StepResult};

use super::prompts;
use super::validation::{MACHINE_NUMBER_MIN_CHARS, has_min_chars};

pub struct MachineNumberStep;

impl StepHandler for MachineNumberStep {
    fn step(&self) -> Step {
        Step::MachineNumber
    }

    fn handle(&self, session: &mut ConversationSession, input: &str) -> Result<StepResult> {
        let machine_number = input.trim().to_uppercase();
        if !has_min_chars(&machine_number, MACHINE_NUMBER_MIN_CHARS) {
            return Ok(StepResult::reprompt(prompts::invalid_machine_number()));
        }

        let message = prompts::ask_location(&machine_number);
        session.claim.machine_number = Some(machine_number);
        Ok(StepResult::new(message, NextAction::GoTo(Step::Location)))
    }
}
