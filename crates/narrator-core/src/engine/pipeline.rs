use crate::cache::store::silent_frame;
use crate::cache::{is_silence_marker, AudioCache};
use crate::fingerprint::fingerprint;
use crate::model::{SynthesisRequest, VoiceProfile};
use crate::providers::speech::SpeechSynthesizer;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Where audio for a missing entry comes from.
#[derive(Clone)]
pub enum Source {
    /// Call the speech collaborator.
    Live(Arc<dyn SpeechSynthesizer>),
    /// Write placeholder audio; no network access.
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Pause between consecutive collaborator calls.
    pub delay: Duration,
    pub force: bool,
    pub dry_run: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            force: false,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Outcome {
    Generated,
    Placeholder,
    Skipped,
    Silence,
    Planned,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub text: String,
    pub fingerprint: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub items: Vec<ItemReport>,
    pub generated: usize,
    pub placeholders: usize,
    pub skipped: usize,
    pub silence: usize,
    pub planned: usize,
    pub failed: usize,
}

impl PipelineReport {
    fn push(&mut self, item: ItemReport) {
        match &item.outcome {
            Outcome::Generated => self.generated += 1,
            Outcome::Placeholder => self.placeholders += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Silence => self.silence += 1,
            Outcome::Planned => self.planned += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
        self.items.push(item);
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Distinct texts in first-seen order.
pub fn unique_texts<'a, I>(texts: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    texts.into_iter().filter(|t| seen.insert(*t)).collect()
}

pub struct Pipeline {
    pub cache: AudioCache,
    pub source: Source,
    pub voice: VoiceProfile,
    pub options: PipelineOptions,
}

impl Pipeline {
    /// Populates the cache for every distinct text. Best effort: a failing
    /// item is recorded and the batch moves on.
    pub async fn run<'a, I>(&self, texts: I) -> PipelineReport
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unique = unique_texts(texts);
        let total = unique.len();
        let mut report = PipelineReport::default();
        let mut called_before = false;

        tracing::info!(event = "pipeline_start", unique = total, dir = %self.cache.dir().display());

        for (i, text) in unique.into_iter().enumerate() {
            let path = self.cache.path_for(text);
            let fp = fingerprint(text);

            let outcome = if is_silence_marker(text) {
                self.silence(text)
            } else if self.cache.contains(text) && !self.options.force {
                Outcome::Skipped
            } else if self.options.dry_run {
                Outcome::Planned
            } else {
                match &self.source {
                    Source::Placeholder => self.placeholder(text),
                    Source::Live(client) => {
                        if called_before {
                            sleep(self.options.delay).await;
                        }
                        called_before = true;
                        self.generate(client.as_ref(), text).await
                    }
                }
            };

            match &outcome {
                Outcome::Failed { error } => tracing::warn!(
                    event = "item_failed",
                    index = i + 1,
                    total,
                    fingerprint = %fp,
                    error = %error
                ),
                other => tracing::info!(
                    event = "item_done",
                    index = i + 1,
                    total,
                    fingerprint = %fp,
                    outcome = ?other
                ),
            }

            report.push(ItemReport {
                text: text.to_string(),
                fingerprint: fp,
                path,
                outcome,
            });
        }

        tracing::info!(
            event = "pipeline_done",
            generated = report.generated,
            placeholders = report.placeholders,
            skipped = report.skipped,
            silence = report.silence,
            failed = report.failed
        );
        report
    }

    fn silence(&self, _text: &str) -> Outcome {
        if self.options.dry_run {
            return Outcome::Silence;
        }
        match self.cache.ensure_silence() {
            Ok(_) => Outcome::Silence,
            Err(e) => Outcome::Failed {
                error: e.to_string(),
            },
        }
    }

    fn placeholder(&self, text: &str) -> Outcome {
        match self.cache.store(text, &silent_frame()) {
            Ok(_) => Outcome::Placeholder,
            Err(e) => Outcome::Failed {
                error: e.to_string(),
            },
        }
    }

    async fn generate(&self, client: &dyn SpeechSynthesizer, text: &str) -> Outcome {
        let req = SynthesisRequest::new(text, &self.voice);
        let audio = match client.synthesize(&req).await {
            Ok(a) => a,
            Err(e) => {
                return Outcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        match self.cache.store(text, &audio.bytes) {
            Ok(_) => Outcome::Generated,
            Err(e) => Outcome::Failed {
                error: e.to_string(),
            },
        }
    }
}
