// Renewal workflow
//
// Stop the scanner, clear the vendor configuration, optionally configure a
// proxy, re-register, update plugins, optionally rebuild the plugin database,
// and start the scanner again.

pub mod orchestrator;
pub mod types;

pub use orchestrator::UpdateOrchestrator;
pub use types::{Stage, WorkflowOutcome, WorkflowReport};
