//! Language-model driven orchestration: the business audit interview and
//! chat command interpretation.

pub mod audit;
pub mod backend;
pub mod command;
pub mod error;
mod prompt;

pub use audit::{AuditOrchestrator, TurnInput, TurnOutcome};
pub use backend::{Content, GeminiBackend, GeminiConfig, Generation, GenerationRequest, LanguageModel};
pub use command::{CommandContext, CommandInterpreter, CommandKind, EmployeeRef, ParsedCommand};
pub use error::{AuditError, LlmError};
pub use prompt::{INTERVIEW_SECTIONS, OPENING_QUESTION};
