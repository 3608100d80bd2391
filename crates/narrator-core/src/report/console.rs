use crate::engine::pipeline::{Outcome, PipelineReport};

pub fn print_summary(report: &PipelineReport) {
    for item in &report.items {
        match &item.outcome {
            Outcome::Failed { error } => {
                eprintln!("FAIL [{}]: {} ({})", item.fingerprint, preview(&item.text), error);
            }
            Outcome::Planned => {
                eprintln!("PLAN [{}]: {} -> {}", item.fingerprint, preview(&item.text), item.path.display());
            }
            _ => {}
        }
    }

    eprintln!(
        "Results: generated={} placeholder={} skipped={} silence={} planned={} failed={}",
        report.generated,
        report.placeholders,
        report.skipped,
        report.silence,
        report.planned,
        report.failed
    );
}

fn preview(text: &str) -> String {
    const MAX: usize = 48;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{head}...")
    }
}
