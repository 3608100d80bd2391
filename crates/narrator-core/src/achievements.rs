//! Achievement flags unlocked while a visitor explores the dialog.
//!
//! Flags live in an injected [`AchievementStore`] under the
//! `portfolio.achievements.` key namespace. [`MemoryStore`] backs tests;
//! [`JsonFileStore`] persists to a single JSON object on disk.

use crate::errors::StoreError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

pub const KEY_NAMESPACE: &str = "portfolio.achievements.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Achievement {
    MetNarrator,
    FinishedDialog,
    ViewedProjects,
    OpenedResume,
    FoundSecret,
}

impl Achievement {
    pub const ALL: [Achievement; 5] = [
        Achievement::MetNarrator,
        Achievement::FinishedDialog,
        Achievement::ViewedProjects,
        Achievement::OpenedResume,
        Achievement::FoundSecret,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::MetNarrator => "met_narrator",
            Self::FinishedDialog => "finished_dialog",
            Self::ViewedProjects => "viewed_projects",
            Self::OpenedResume => "opened_resume",
            Self::FoundSecret => "found_secret",
        }
    }

    /// Fully namespaced storage key, e.g. `portfolio.achievements.met_narrator`.
    pub fn key(self) -> String {
        format!("{}{}", KEY_NAMESPACE, self.name())
    }

    fn from_key(key: &str) -> Option<Self> {
        key.strip_prefix(KEY_NAMESPACE)
            .and_then(|n| n.parse().ok())
    }
}

impl FromStr for Achievement {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().replace('-', "_").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.name() == norm)
            .ok_or_else(|| StoreError::UnknownAchievement(s.to_string()))
    }
}

impl std::fmt::Display for Achievement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub trait AchievementStore: Send + Sync {
    fn is_unlocked(&self, a: Achievement) -> Result<bool, StoreError>;

    /// Returns `true` when the flag was newly set. Unlocking again keeps the
    /// original timestamp.
    fn unlock(&self, a: Achievement) -> Result<bool, StoreError>;

    fn unlocked(&self) -> Result<Vec<(Achievement, DateTime<Utc>)>, StoreError>;

    fn reset(&self) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct MemoryStore {
    flags: Mutex<BTreeMap<Achievement, DateTime<Utc>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut BTreeMap<Achievement, DateTime<Utc>>) -> T) -> T {
        let mut guard = match self.flags.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl AchievementStore for MemoryStore {
    fn is_unlocked(&self, a: Achievement) -> Result<bool, StoreError> {
        Ok(self.with(|m| m.contains_key(&a)))
    }

    fn unlock(&self, a: Achievement) -> Result<bool, StoreError> {
        Ok(self.with(|m| {
            if m.contains_key(&a) {
                false
            } else {
                m.insert(a, Utc::now());
                true
            }
        }))
    }

    fn unlocked(&self) -> Result<Vec<(Achievement, DateTime<Utc>)>, StoreError> {
        Ok(self.with(|m| m.iter().map(|(a, t)| (*a, *t)).collect()))
    }

    fn reset(&self) -> Result<(), StoreError> {
        self.with(|m| m.clear());
        Ok(())
    }
}

/// JSON object of `namespaced key -> RFC 3339 unlock time`.
///
/// Keys outside the known set are kept as-is on rewrite.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

type RawFlags = BTreeMap<String, serde_json::Value>;

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<RawFlags, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) if s.trim().is_empty() => Ok(RawFlags::new()),
            Ok(s) => Ok(serde_json::from_str(&s)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RawFlags::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, flags: &RawFlags) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, serde_json::to_vec_pretty(flags)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        match self.lock.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn parse_time(v: &serde_json::Value) -> Option<DateTime<Utc>> {
    v.as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

impl AchievementStore for JsonFileStore {
    fn is_unlocked(&self, a: Achievement) -> Result<bool, StoreError> {
        let _g = self.guard();
        Ok(self.load()?.contains_key(&a.key()))
    }

    fn unlock(&self, a: Achievement) -> Result<bool, StoreError> {
        let _g = self.guard();
        let mut flags = self.load()?;
        if flags.contains_key(&a.key()) {
            return Ok(false);
        }
        flags.insert(a.key(), serde_json::Value::String(Utc::now().to_rfc3339()));
        self.save(&flags)?;
        tracing::debug!(achievement = %a, path = %self.path.display(), "achievement unlocked");
        Ok(true)
    }

    fn unlocked(&self) -> Result<Vec<(Achievement, DateTime<Utc>)>, StoreError> {
        let _g = self.guard();
        let flags = self.load()?;
        let mut out: Vec<_> = flags
            .iter()
            .filter_map(|(k, v)| Some((Achievement::from_key(k)?, parse_time(v)?)))
            .collect();
        out.sort_by_key(|(a, _)| *a);
        Ok(out)
    }

    fn reset(&self) -> Result<(), StoreError> {
        let _g = self.guard();
        let mut flags = self.load()?;
        flags.retain(|k, _| Achievement::from_key(k).is_none());
        self.save(&flags)
    }
}
