use std::sync::Arc;

use tracing::info;

use crate::catalog::ProblemCatalog;
use crate::error::Result;
use crate::session::{ConversationSession, Step};
use crate::step::{NextAction, StepHandler, StepResult};

use super::prompts;

/// Matches the input against the catalog keys and starts the remediation script.
pub struct ProblemSelectionStep {
    catalog: Arc<ProblemCatalog>,
}

impl ProblemSelectionStep {
    pub fn new(catalog: Arc<ProblemCatalog>) -> Self {
        Self { catalog }
    }
}

impl StepHandler for ProblemSelectionStep {
    fn step(&self) -> Step {
        Step::ProblemSelection
    }

    fn handle(&self, session: &mut ConversationSession, input: &str) -> Result<StepResult> {
        let Some(problem) = self.catalog.lookup(input.trim()) else {
            return Ok(StepResult::reprompt(prompts::invalid_selection(
                &self.catalog,
            )));
        };

        info!(
            user_id = %session.user_id,
            problem_id = %problem.id,
            remediation_steps = problem.remediation_steps.len(),
            "Problem selected"
        );

        let claim = &mut session.claim;
        claim.problem_id = Some(problem.id.clone());
        claim.problem_name = Some(problem.display_name.clone());
        claim.remediation_steps = problem.remediation_steps.clone();
        claim.remediation_index = Some(0);

        Ok(StepResult::new(
            prompts::first_remediation(problem),
            NextAction::GoTo(Step::Troubleshooting),
        ))
    }
}
