//! The agent loop: a bounded finite-state cycle between model reasoning and
//! tool dispatch, producing exactly one non-empty reply per user turn.

pub mod dispatch;
pub mod orchestrator;
pub mod prompt;
pub mod registry;
pub mod state;
pub mod tools;

pub use dispatch::{ToolDispatcher, ToolResult};
pub use orchestrator::{Orchestrator, TurnOptions, TurnRunner};
pub use prompt::PromptBuilder;
pub use registry::{Tool, ToolRegistry};
pub use state::ConversationState;
