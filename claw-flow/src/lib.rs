pub mod catalog;
pub mod error;
pub mod graph;
pub mod message;
pub mod runner;
pub mod session;
pub mod sink;
pub mod step;
pub mod steps;
pub mod storage;
pub mod workflow;

// Re-export commonly used types
pub use catalog::{ProblemCatalog, ProblemDefinition};
pub use error::{FlowError, Result, SinkError};
pub use graph::{ExecutionResult, ExecutionStatus, Graph, GraphBuilder, Guard, Transition};
pub use message::{OutboundMessage, QuickReply};
pub use runner::FlowRunner;
pub use session::{Claim, ClaimRecord, ConversationSession, Step};
pub use sink::{LogSink, RecordSink};
pub use step::{NextAction, StepHandler, StepResult};
pub use storage::{InMemorySessionStorage, SessionGuard, SessionStorage};
pub use workflow::{build_support_workflow, create_flow_runner};
