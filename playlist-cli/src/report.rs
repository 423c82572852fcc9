//! Human-readable run report

use core_metadata::EntryDecision;
use core_service::{RunOutcome, RunStatus};

/// Progress line for one entry, numbered from one.
pub fn decision_line(decision: &EntryDecision) -> String {
    format!("[{}] {}", decision.position + 1, decision)
}

/// Final status line.
pub fn summary_line(file: &str, outcome: &RunOutcome) -> String {
    let verb = match outcome.status {
        RunStatus::Updated => "updated",
        RunStatus::DryRun if outcome.changes.has_changes() => "would update",
        RunStatus::DryRun | RunStatus::NoChanges => return format!("{}: no changes", file),
    };

    let mut line = format!(
        "{}: {} ({} of {} entries rewritten, {} matched",
        file, verb, outcome.changes.rewritten, outcome.entries, outcome.matched
    );
    if outcome.changes.reordered {
        line.push_str(", reordered");
    }
    line.push(')');
    line
}
