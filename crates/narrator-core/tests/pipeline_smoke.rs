use narrator_core::cache::AudioCache;
use narrator_core::engine::{Outcome, Pipeline, PipelineOptions, Source};
use narrator_core::model::VoiceProfile;
use narrator_core::providers::speech::FakeSynthesizer;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn pipeline(dir: &std::path::Path, source: Source) -> Pipeline {
    Pipeline {
        cache: AudioCache::new(dir),
        source,
        voice: VoiceProfile::default(),
        options: PipelineOptions {
            delay: Duration::from_millis(0),
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn test_second_run_makes_no_calls() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let fake = FakeSynthesizer::new();
    let p = pipeline(dir.path(), Source::Live(Arc::new(fake.clone())));
    let texts = ["Hello, World!", "Hmm."];

    let first = p.run(texts).await;
    assert_eq!(first.generated, 2);
    assert_eq!(fake.calls().len(), 2);

    let second = p.run(texts).await;
    assert_eq!(second.generated, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(fake.calls().len(), 2, "no new calls on the second run");

    let stored = std::fs::read(dir.path().join("dialog_2253126.mp3"))?;
    assert_eq!(stored, FakeSynthesizer::payload_for("Hmm."));
    Ok(())
}

#[tokio::test]
async fn test_duplicates_collapse_to_one_artifact() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let fake = FakeSynthesizer::new();
    let p = pipeline(dir.path(), Source::Live(Arc::new(fake.clone())));

    let report = p.run(["Hmm.", "Hello, World!", "Hmm.", "Hmm."]).await;

    assert_eq!(report.items.len(), 2);
    assert_eq!(report.items[0].text, "Hmm.");
    assert_eq!(fake.calls(), vec!["Hmm.", "Hello, World!"]);

    let files: Vec<_> = std::fs::read_dir(dir.path())?.collect::<Result<_, _>>()?;
    assert_eq!(files.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_silence_marker_never_calls_collaborator() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let fake = FakeSynthesizer::new();
    let p = pipeline(dir.path(), Source::Live(Arc::new(fake.clone())));

    let report = p.run(["...", "...", "Hmm."]).await;

    assert_eq!(report.silence, 1);
    assert_eq!(fake.calls(), vec!["Hmm."]);
    assert!(dir.path().join("silent.mp3").is_file());
    assert!(!dir.path().join("dialog_45678.mp3").exists());
    Ok(())
}

#[tokio::test]
async fn test_item_failure_does_not_abort_batch() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let fake = FakeSynthesizer::failing_on(["bad line"]);
    let p = pipeline(dir.path(), Source::Live(Arc::new(fake.clone())));

    let report = p.run(["first", "bad line", "last"]).await;

    assert_eq!(report.generated, 2);
    assert_eq!(report.failed, 1);
    assert!(report.has_failures());
    assert!(matches!(
        &report.items[1].outcome,
        Outcome::Failed { error } if error.contains("500")
    ));
    assert_eq!(fake.calls().len(), 3);

    // Failed item is retried on the next run; the rest are skipped.
    let again = p.run(["first", "bad line", "last"]).await;
    assert_eq!((again.skipped, again.failed), (2, 1));
    Ok(())
}

#[tokio::test]
async fn test_placeholder_mode_writes_files_offline() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let p = pipeline(dir.path(), Source::Placeholder);

    let report = p.run(["Hmm.", "..."]).await;

    assert_eq!(report.placeholders, 1);
    assert_eq!(report.silence, 1);
    assert!(AudioCache::new(dir.path()).lookup("Hmm.").is_some());
    Ok(())
}

#[tokio::test]
async fn test_force_and_dry_run() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let fake = FakeSynthesizer::new();
    let mut p = pipeline(dir.path(), Source::Live(Arc::new(fake.clone())));
    p.run(["Hmm."]).await;

    p.options.dry_run = true;
    let planned = p.run(["Hmm.", "new line"]).await;
    assert_eq!((planned.skipped, planned.planned), (1, 1));
    assert!(!dir.path().join(narrator_core::cache::file_name("new line")).exists());

    p.options.dry_run = false;
    p.options.force = true;
    let forced = p.run(["Hmm."]).await;
    assert_eq!(forced.generated, 1);
    assert_eq!(fake.calls().len(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_delay_only_between_calls() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let fake = FakeSynthesizer::new();
    let mut p = pipeline(dir.path(), Source::Live(Arc::new(fake)));
    p.options.delay = Duration::from_secs(1);

    let start = tokio::time::Instant::now();
    p.run(["one", "...", "two", "three"]).await;

    // Three calls, two gaps; the silence marker adds none.
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    Ok(())
}
