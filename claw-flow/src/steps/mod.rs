// Conversation step handlers, one per Step
pub mod account;
pub mod customer_info;
pub mod evidence;
pub mod location;
pub mod machine_number;
pub mod problem_selection;
pub mod start;
pub mod troubleshooting;

// Shared modules
pub mod prompts;
pub mod validation;

pub use account::AccountStep;
pub use customer_info::CustomerInfoStep;
pub use evidence::EvidenceStep;
pub use location::LocationStep;
pub use machine_number::MachineNumberStep;
pub use problem_selection::ProblemSelectionStep;
pub use start::StartStep;
pub use troubleshooting::TroubleshootingStep;
