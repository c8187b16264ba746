use crate::error::Result;
use crate::session::{ConversationSession, Step};
use crate::step::{NextAction, StepHandler, StepResult};

use super::prompts;
use super::validation::{CLAIM_FIELD_COUNT, split_fields};

/// Expects `name, phone, amount`.
pub struct CustomerInfoStep;

impl StepHandler for CustomerInfoStep {
    fn step(&self) -> Step {
        Step::CustomerInfo
    }

    fn handle(&self, session: &mut ConversationSession, input: &str) -> Result<StepResult> {
        let Some([name, phone, amount]) = split_fields::<CLAIM_FIELD_COUNT>(input.trim()) else {
            return Ok(StepResult::reprompt(prompts::invalid_customer_info()));
        };

        let claim = &mut session.claim;
        claim.customer_name = Some(name.to_string());
        claim.customer_phone = Some(phone.to_string());
        claim.lost_amount = Some(amount.to_string());

        Ok(StepResult::new(
            prompts::ask_evidence(claim),
            NextAction::GoTo(Step::Evidence),
        ))
    }
}
