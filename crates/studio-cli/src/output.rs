//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use studio_core::OperationState;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a progress note to stderr.
pub fn note(msg: &str) {
    eprintln!("{}", msg.dimmed());
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Colored label for an operation state.
pub fn state_label<T>(state: &OperationState<T>) -> String {
    match state {
        OperationState::Pending(_) => state.label().yellow().to_string(),
        OperationState::Succeeded(_) => state.label().green().to_string(),
        OperationState::Failed(_) => state.label().red().to_string(),
    }
}
