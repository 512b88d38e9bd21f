// src/cli/progress.rs — Terminal progress renderer for batch runs

use crate::core::types::BatchEvent;

/// Render one event as a progress line.
pub fn format_event(event: &BatchEvent) -> String {
    match event {
        BatchEvent::RoundStart {
            round,
            max_rounds,
            pending,
        } => format!("[round {}/{}] analyzing {} text(s)", round, max_rounds, pending),
        BatchEvent::ItemDone {
            round,
            completed,
            total,
            succeeded,
        } => format!(
            "[round {}] {}/{} {}",
            round,
            completed,
            total,
            if *succeeded { "ok" } else { "failed" },
        ),
        BatchEvent::RoundEnd {
            round,
            succeeded,
            failed,
        } => format!("[round {}] done: {} ok, {} to retry", round, succeeded, failed),
        BatchEvent::Backoff {
            next_round,
            pending,
            delay_secs,
        } => format!(
            "[retry] {} text(s) pending, round {} in {:.1}s",
            pending, next_round, delay_secs,
        ),
        BatchEvent::Finished {
            succeeded,
            failed,
            rounds,
        } => format!(
            "[done] {} succeeded, {} failed after {} round(s)",
            succeeded, failed, rounds,
        ),
    }
}

/// Build a progress callback that writes formatted lines to stderr.
///
/// Returns a closure suitable for `BatchOrchestrator::with_progress()`.
pub fn terminal_progress() -> impl Fn(BatchEvent) + Send + Sync + 'static {
    move |event| eprintln!("{}", format_event(&event))
}
