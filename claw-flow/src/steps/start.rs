use std::sync::Arc;

use tracing::info;

use crate::catalog::ProblemCatalog;
use crate::error::Result;
use crate::session::{Claim, ConversationSession, Step};
use crate::step::{NextAction, StepHandler, StepResult};

use super::prompts;

/// Greets the user with the problem menu. Accepts any input.
pub struct StartStep {
    catalog: Arc<ProblemCatalog>,
}

impl StartStep {
    pub fn new(catalog: Arc<ProblemCatalog>) -> Self {
        Self { catalog }
    }
}

impl StepHandler for StartStep {
    fn step(&self) -> Step {
        Step::Start
    }

    fn handle(&self, session: &mut ConversationSession, _input: &str) -> Result<StepResult> {
        info!(user_id = %session.user_id, "Starting new support conversation");
        session.claim = Claim::default();
        Ok(StepResult::new(
            prompts::welcome_menu(&self.catalog),
            NextAction::GoTo(Step::ProblemSelection),
        ))
    }
}
