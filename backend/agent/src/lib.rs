//! insightbot agent runtime
//!
//! Prompt composition, the ReAct reasoning loop, tool dispatch, and the
//! per-session controller that ties authentication, datasets and the loop
//! together.

pub mod agent_loop;
pub mod assistant_identity;
pub mod controller;
pub mod factory;
pub mod prompt_cache;
pub mod react_parser;
pub mod scratchpad;
pub mod session_state;
pub mod system_prompt;
pub mod tool_dispatcher;

pub use agent_loop::{LoopLimits, ModelSettings, Outcome, Reasoner, ReasoningLoop, StepRecord};
pub use assistant_identity::AssistantIdentity;
pub use controller::{Answer, EntryParams, SessionController};
pub use factory::{AgentFactory, ReasonerFactory};
pub use prompt_cache::PromptCache;
pub use react_parser::{AgentAction, AgentDecision, ParseError};
pub use scratchpad::Scratchpad;
pub use session_state::{InsightsEntry, Session};
pub use system_prompt::{PromptComposer, PromptTemplate, PromptVars};
pub use tool_dispatcher::ToolDispatcher;
