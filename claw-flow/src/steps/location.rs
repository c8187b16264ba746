use crate::error::Result;
use crate::session::{ConversationSession, Step};
use crate::step::{NextAction, StepHandler, StepResult};

use super::prompts;
use super::validation::{LOCATION_MIN_CHARS, has_min_chars};

pub struct LocationStep;

impl StepHandler for LocationStep {
    fn step(&self) -> Step {
        Step::Location
    }

    fn handle(&self, session: &mut ConversationSession, input: &str) -> Result<StepResult> {
        let location = input.trim();
        if !has_min_chars(location, LOCATION_MIN_CHARS) {
            return Ok(StepResult::reprompt(prompts::invalid_location()));
        }

        session.claim.location = Some(location.to_string());
        Ok(StepResult::new(
            prompts::ask_customer_info(location),
            NextAction::GoTo(Step::CustomerInfo),
        ))
    }
}
