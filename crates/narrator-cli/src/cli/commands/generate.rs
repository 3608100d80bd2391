use super::{build_client, ensure_parent_dir, exit_codes};
use crate::cli::args::GenerateArgs;
use anyhow::Context;
use narrator_core::cache::AudioCache;
use narrator_core::config::load_script;
use narrator_core::engine::{Pipeline, PipelineOptions, Source};
use narrator_core::errors::SpeechError;
use std::sync::Arc;
use std::time::Duration;

pub async fn run(args: GenerateArgs) -> anyhow::Result<i32> {
    let script = match load_script(&args.script) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    // Dry runs never reach the network, so they do not need a key.
    let source = if args.placeholder || args.dry_run {
        Source::Placeholder
    } else {
        match build_client(&args.speech) {
            Ok(c) => Source::Live(Arc::new(c)),
            Err(SpeechError::MissingApiKey) => {
                eprintln!(
                    "config error: {} (or pass --placeholder)",
                    SpeechError::MissingApiKey
                );
                return Ok(exit_codes::CONFIG_ERROR);
            }
            Err(e) => return Err(e.into()),
        }
    };

    let pipeline = Pipeline {
        cache: AudioCache::new(&args.out),
        source,
        voice: script.voice.clone(),
        options: PipelineOptions {
            delay: Duration::from_millis(args.delay_ms),
            force: args.force,
            dry_run: args.dry_run,
        },
    };

    eprintln!(
        "generating {} dialog lines into {}",
        script.dialogs.len(),
        args.out.display()
    );
    let report = pipeline.run(script.texts()).await;
    narrator_core::report::console::print_summary(&report);

    if let Some(path) = &args.report {
        ensure_parent_dir(path)?;
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        eprintln!("wrote file: {}", path.display());
    }

    Ok(if report.has_failures() {
        exit_codes::ITEMS_FAILED
    } else {
        exit_codes::OK
    })
}
