//! One-shot conversation from the terminal.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Run one orchestration cycle and print the reply with its session id.
pub async fn ask(state: &AppState, message: &str, session: Option<&str>, json: bool) -> Result<()> {
    let outcome = state.orchestrator.process(session, message).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style("Tagarela:").magenta().bold(), outcome.reply_text);
    println!();
    println!(
        "  {} {}",
        style("session").dim(),
        style(outcome.session_id).cyan()
    );
    println!(
        "  {}",
        style(format!("{} earlier messages used as context", outcome.history_used.len())).dim()
    );

    Ok(())
}
