//! Alert sources.
//!
//! The Kafka/Fink stream transport is an external collaborator; the seam is
//! [`AlertSource`]. The in-repo implementation reads decoded alert JSON
//! files from a spool directory, which is also what `run-once` replays.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde_json::Value;

/// One decoded alert per poll, or `None` on timeout (not an error).
pub trait AlertSource {
    fn poll(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = anyhow::Result<Option<(String, Value)>>> + Send;
}

/// Reads `*.json` alert files from a directory, oldest name first.
///
/// In watching mode an empty scan sleeps out the poll timeout and rescans,
/// mirroring a blocking consumer poll. In one-shot mode an empty scan ends
/// the stream.
pub struct DirSource {
    dir: PathBuf,
    fallback_topic: String,
    seen: HashSet<PathBuf>,
    watch: bool,
}

impl DirSource {
    /// Daemon-mode source: keeps polling for newly arriving files.
    pub fn watching(dir: impl Into<PathBuf>, fallback_topic: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            fallback_topic: fallback_topic.into(),
            seen: HashSet::new(),
            watch: true,
        }
    }

    /// Replay-mode source: yields each existing file once, then `None`.
    pub fn one_shot(dir: impl Into<PathBuf>, fallback_topic: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            fallback_topic: fallback_topic.into(),
            seen: HashSet::new(),
            watch: false,
        }
    }

    /// Next unseen alert file, by sorted path. Unreadable or unparseable
    /// files are logged, marked seen, and skipped.
    fn scan(&mut self) -> anyhow::Result<Option<(String, Value)>> {
        let mut candidates: Vec<PathBuf> = std::fs::read_dir(&self.dir)
            .with_context(|| format!("reading spool directory {}", self.dir.display()))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .filter(|p| !self.seen.contains(p))
            .collect();
        candidates.sort();

        for path in candidates {
            self.seen.insert(path.clone());
            match read_alert(&path, &self.fallback_topic) {
                Ok(parsed) => return Ok(Some(parsed)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable alert file");
                }
            }
        }
        Ok(None)
    }
}

fn read_alert(path: &Path, fallback_topic: &str) -> anyhow::Result<(String, Value)> {
    let text = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)?;
    let topic = value
        .get("topic")
        .and_then(Value::as_str)
        .unwrap_or(fallback_topic)
        .to_string();
    Ok((topic, value))
}

impl AlertSource for DirSource {
    async fn poll(&mut self, timeout: Duration) -> anyhow::Result<Option<(String, Value)>> {
        if let Some(alert) = self.scan()? {
            return Ok(Some(alert));
        }
        if !self.watch {
            return Ok(None);
        }
        tokio::time::sleep(timeout).await;
        self.scan()
    }
}
