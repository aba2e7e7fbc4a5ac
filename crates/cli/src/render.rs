//! Terminal rendering of progress and summaries.

use std::io::Write;
use tokio::sync::watch;

use prism_core::{ConversionOutcome, RunProgress, RunSummary};

const BAR_WIDTH: usize = 30;

/// One progress line, e.g. `[#######-----------------------]  25% Done: 1 of 4`.
pub fn progress_line(progress: &RunProgress) -> String {
    let filled = ((progress.fraction() * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!(
        "[{}{}] {:>3.0}% {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress.percent(),
        progress.status
    )
}

/// Redraws the progress line on stderr until the run's reporter goes away.
pub async fn follow(mut rx: watch::Receiver<RunProgress>) {
    let mut stderr = std::io::stderr();
    loop {
        let line = progress_line(&rx.borrow_and_update());
        let _ = write!(stderr, "\r{}\x1b[K", line);
        let _ = stderr.flush();
        if rx.changed().await.is_err() {
            break;
        }
    }
    let _ = writeln!(stderr);
}

/// Human-readable summary lines.
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "{} converted, {} failed, {} skipped in {:.1}s",
        summary.converted,
        summary.failed,
        summary.skipped,
        summary.duration_ms() as f64 / 1000.0
    )];
    for report in &summary.items {
        match &report.outcome {
            ConversionOutcome::Converted { destination } => lines.push(format!(
                "  ok      {} -> {}",
                report.source.display(),
                destination.display()
            )),
            ConversionOutcome::Failed { reason, .. } => {
                lines.push(format!("  FAILED  {}: {}", report.source.display(), reason))
            }
            ConversionOutcome::Skipped { reason } => {
                lines.push(format!("  skipped {} ({})", report.source.display(), reason))
            }
        }
    }
    lines
}
