use std::sync::Arc;

use crate::{
    catalog::ProblemCatalog,
    error::Result,
    graph::{Graph, GraphBuilder, Guard},
    runner::FlowRunner,
    session::Step,
    sink::RecordSink,
    steps::{
        AccountStep, CustomerInfoStep, EvidenceStep, LocationStep, MachineNumberStep,
        ProblemSelectionStep, StartStep, TroubleshootingStep,
        validation::{CLAIM_FIELD_COUNT, EVIDENCE_KEYWORD, LOCATION_MIN_CHARS, MACHINE_NUMBER_MIN_CHARS},
    },
    storage::SessionStorage,
};

/// The support conversation: troubleshooting, then refund claim collection.
pub fn build_support_workflow(catalog: Arc<ProblemCatalog>) -> Result<Graph> {
    GraphBuilder::new("claw_machine_support")
        .add_step(Arc::new(StartStep::new(catalog.clone())))
        .add_step(Arc::new(ProblemSelectionStep::new(catalog)))
        .add_step(Arc::new(TroubleshootingStep))
        .add_step(Arc::new(MachineNumberStep))
        .add_step(Arc::new(LocationStep))
        .add_step(Arc::new(CustomerInfoStep))
        .add_step(Arc::new(EvidenceStep))
        .add_step(Arc::new(AccountStep))
        .add_transition(Step::Start, Step::ProblemSelection, Guard::Always)
        .add_transition(Step::ProblemSelection, Step::Troubleshooting, Guard::KnownProblem)
        .add_transition(Step::Troubleshooting, Step::Start, Guard::Resolved)
        .add_transition(
            Step::Troubleshooting,
            Step::MachineNumber,
            Guard::RemediationExhausted,
        )
        .add_transition(
            Step::MachineNumber,
            Step::Location,
            Guard::MinChars(MACHINE_NUMBER_MIN_CHARS),
        )
        .add_transition(
            Step::Location,
            Step::CustomerInfo,
            Guard::MinChars(LOCATION_MIN_CHARS),
        )
        .add_transition(
            Step::CustomerInfo,
            Step::Evidence,
            Guard::MinFields(CLAIM_FIELD_COUNT),
        )
        .add_transition(Step::Evidence, Step::Account, Guard::Contains(EVIDENCE_KEYWORD))
        .add_transition(Step::Account, Step::Start, Guard::MinFields(CLAIM_FIELD_COUNT))
        .build()
}

pub fn create_flow_runner(
    catalog: Arc<ProblemCatalog>,
    session_storage: Arc<dyn SessionStorage>,
    sink: Arc<dyn RecordSink>,
) -> Result<FlowRunner> {
    let graph = Arc::new(build_support_workflow(catalog)?);
    Ok(FlowRunner::new(graph, session_storage, sink))
}
