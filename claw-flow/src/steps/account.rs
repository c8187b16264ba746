use chrono::Utc;
use tracing::info;

use crate::error::Result;
use crate::session::{ConversationSession, Step};
use crate::step::{NextAction, StepHandler, StepResult};

use super::prompts;
use super::validation::{CLAIM_FIELD_COUNT, split_fields};

/// Final step: expects `bank, account number, account name`, completes the
/// claim and hands it off for submission.
pub struct AccountStep;

impl StepHandler for AccountStep {
    fn step(&self) -> Step {
        Step::Account
    }

    fn handle(&self, session: &mut ConversationSession, input: &str) -> Result<StepResult> {
        let Some([bank, number, name]) = split_fields::<CLAIM_FIELD_COUNT>(input.trim()) else {
            return Ok(StepResult::reprompt(prompts::invalid_account()));
        };

        let claim = &mut session.claim;
        claim.bank_name = Some(bank.to_string());
        claim.account_number = Some(number.to_string());
        claim.account_name = Some(name.to_string());
        claim.submitted_at = Some(Utc::now());

        let record = claim.to_record(&session.user_id)?;

        info!(
            user_id = %record.user_id,
            submitted_at = %record.submitted_at,
            problem = %record.problem_name,
            machine_number = %record.machine_number,
            location = %record.location,
            customer_name = %record.customer_name,
            customer_phone = %record.customer_phone,
            lost_amount = %record.lost_amount,
            bank_name = %record.bank_name,
            account_number = %record.account_number,
            account_name = %record.account_name,
            "Refund claim completed"
        );

        Ok(StepResult::new(prompts::claim_received(), NextAction::End).with_submission(record))
    }
}
