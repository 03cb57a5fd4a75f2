//! `insightbot ask`: one question from the terminal, with the reasoning
//! trace on stderr.

use anyhow::{bail, Result};
use insightbot_agent::{EntryParams, Session};
use insightbot_config::AppConfig;
use insightbot_core::{EventKind, ReasoningEvent};
use insightbot_logging::EventLogger;
use tokio::sync::mpsc;

use crate::runtime::Runtime;
use crate::terminal_output::{note_info, note_warn, trace_line};

pub async fn run(config: AppConfig, dataset: Option<String>, question: String) -> Result<()> {
    if question.trim().is_empty() {
        bail!("question is empty");
    }
    let runtime = Runtime::start(config).await?;
    let controller = &runtime.controller;

    let mut session = Session::new();
    let (sink, mut rx) = mpsc::unbounded_channel::<ReasoningEvent>();
    let session_id = session.id.clone();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            EventLogger::log_event(&session_id, &event);
            print_event(&event);
        }
    });

    // A locally minted token stands in for the host application's link.
    let token = runtime.validator.mint(chrono::Utc::now().timestamp());
    let params = EntryParams::new(token.token, token.timestamp);

    let key = dataset.unwrap_or_else(|| controller.default_dataset().to_string());
    controller.datasets().lookup(&key)?;
    // Skip the insights run; only the question is answered.
    session.set_active_dataset(&key);
    controller.authenticate(&mut session, &params)?;
    note_info(&format!("dataset: {key}"));

    let answer = controller.ask(&mut session, &question, Some(&sink)).await?;
    drop(sink);
    let _ = printer.await;

    if answer.outcome.is_none() {
        note_warn("the assistant could not answer; see the log for details");
    }
    println!("{}", answer.text);
    Ok(())
}

fn print_event(event: &ReasoningEvent) {
    let field = |name: &str| {
        event
            .payload
            .get(name)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };
    match event.kind {
        EventKind::Thought => trace_line("thought:", &field("text")),
        EventKind::Action => trace_line("action:", &format!("{} <- {}", field("tool"), field("input"))),
        EventKind::Observation => trace_line("observation:", &field("text")),
        EventKind::Final => {}
    }
}
