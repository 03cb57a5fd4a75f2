//! The ReAct reasoning loop.
//!
//! Think, act, observe, repeat: each iteration renders the prompt with the
//! scratchpad so far, asks the model for one turn, and either dispatches the
//! requested tool or returns the final answer. Iteration and wall-clock
//! budgets are checked before every model call; the deadline also bounds
//! each in-flight call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use insightbot_config::AgentConfig;
use insightbot_config::LlmConfig;
use insightbot_core::{ChatMessage, EventSink, InsightError, LlmProvider, LlmRequest, ReasoningEvent};
use serde::{Deserialize, Serialize};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, instrument, warn};

use crate::react_parser::{self, AgentDecision};
use crate::scratchpad::Scratchpad;
use crate::system_prompt::{format_history, PromptTemplate, PromptVars};
use crate::tool_dispatcher::ToolDispatcher;

/// Generation halts here so the model cannot invent its own observations.
pub const STOP_SEQUENCE: &str = "\nObservation";

/// Stand-in deadline when the configured budget does not fit on the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Clone)]
pub struct LoopLimits {
    pub max_iterations: usize,
    pub max_execution: Duration,
    pub handle_parsing_errors: bool,
    pub parsing_error_note: String,
}

impl From<&AgentConfig> for LoopLimits {
    fn from(config: &AgentConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            max_execution: Duration::from_secs(config.max_execution_secs),
            handle_parsing_errors: config.handle_parsing_errors,
            parsing_error_note: config.parsing_error_note.clone(),
        }
    }
}

impl Default for LoopLimits {
    fn default() -> Self {
        Self::from(&AgentConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&LlmConfig> for ModelSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// One tool round-trip, as reported to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepRecord {
    pub tool: String,
    pub input: String,
    pub observation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub output: String,
    pub iterations: usize,
    pub steps: Vec<StepRecord>,
}

/// Anything that can answer a goal against prior conversation.
#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn run(
        &self,
        goal: &str,
        history: &[ChatMessage],
        events: Option<&EventSink>,
    ) -> Result<Outcome, InsightError>;
}

pub struct ReasoningLoop {
    llm: Arc<dyn LlmProvider>,
    dispatcher: ToolDispatcher,
    prompt: Arc<PromptTemplate>,
    model: ModelSettings,
    limits: LoopLimits,
}

impl ReasoningLoop {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        dispatcher: ToolDispatcher,
        prompt: Arc<PromptTemplate>,
        model: ModelSettings,
        limits: LoopLimits,
    ) -> Self {
        Self {
            llm,
            dispatcher,
            prompt,
            model,
            limits,
        }
    }

    fn request(&self, prompt: String) -> LlmRequest {
        LlmRequest {
            model: self.model.model.clone(),
            system_prompt: String::new(),
            user_prompt: prompt,
            max_tokens: self.model.max_tokens,
            temperature: self.model.temperature,
            stop: vec![STOP_SEQUENCE.to_string()],
        }
    }

    fn deadline(&self, started: Instant) -> Instant {
        started
            .checked_add(self.limits.max_execution)
            .unwrap_or_else(|| started + FAR_FUTURE)
    }

    fn exhausted(&self, iterations: usize, started: Instant) -> InsightError {
        let elapsed = started.elapsed();
        warn!(iterations, ?elapsed, "reasoning budget exhausted");
        InsightError::ReasoningExhausted { iterations, elapsed }
    }
}

#[async_trait]
impl Reasoner for ReasoningLoop {
    #[instrument(skip_all, fields(goal_chars = goal.len(), history = history.len()))]
    async fn run(
        &self,
        goal: &str,
        history: &[ChatMessage],
        events: Option<&EventSink>,
    ) -> Result<Outcome, InsightError> {
        let started = Instant::now();
        let deadline = self.deadline(started);

        let tools = self.dispatcher.registry().describe();
        let tool_names = self.dispatcher.registry().names().join(", ");
        let chat_history = format_history(history);

        let mut scratchpad = Scratchpad::new();
        let mut steps = Vec::new();
        let mut iterations = 0usize;

        loop {
            if iterations >= self.limits.max_iterations || Instant::now() >= deadline {
                return Err(self.exhausted(iterations, started));
            }
            iterations += 1;

            let agent_scratchpad = scratchpad.render();
            let prompt = self.prompt.render(&PromptVars {
                tools: &tools,
                tool_names: &tool_names,
                chat_history: &chat_history,
                input: goal,
                agent_scratchpad: &agent_scratchpad,
            });
            debug!(iteration = iterations, prompt_chars = prompt.len(), "thinking");

            let response = match timeout_at(deadline, self.llm.complete(&self.request(prompt))).await {
                Err(_) => return Err(self.exhausted(iterations, started)),
                Ok(Err(e)) => {
                    return Err(InsightError::Llm {
                        provider: self.llm.name().to_string(),
                        message: format!("{e:#}"),
                    })
                }
                Ok(Ok(response)) => response,
            };

            match react_parser::parse(&response.content) {
                Ok(AgentDecision::Finish { output, log }) => {
                    if let Some(thought) = react_parser::thought_text(&log) {
                        ReasoningEvent::thought(thought).emit(events);
                    }
                    ReasoningEvent::final_answer(output.clone()).emit(events);
                    info!(iterations, tool_calls = steps.len(), "reasoning finished");
                    return Ok(Outcome {
                        output,
                        iterations,
                        steps,
                    });
                }
                Ok(AgentDecision::Action(action)) => {
                    if let Some(thought) = action.thought() {
                        ReasoningEvent::thought(thought).emit(events);
                    }
                    ReasoningEvent::action(&action.tool, &action.input).emit(events);

                    let observation =
                        match timeout_at(deadline, self.dispatcher.observe(&action.tool, &action.input)).await {
                            Err(_) => return Err(self.exhausted(iterations, started)),
                            Ok(observation) => observation,
                        };
                    ReasoningEvent::observation(observation.clone()).emit(events);

                    scratchpad.record(&action, observation.clone());
                    steps.push(StepRecord {
                        tool: action.tool,
                        input: action.input,
                        observation,
                    });
                }
                Err(err) => {
                    if !self.limits.handle_parsing_errors {
                        return Err(InsightError::ParseMalformed(err.to_string()));
                    }
                    warn!(error = %err, "unparseable model turn");
                    let note = self.limits.parsing_error_note.clone();
                    ReasoningEvent::observation(note.clone()).emit(events);
                    scratchpad.record_raw(err.raw(), note);
                }
            }
        }
    }
}
