use super::key::{artifact_name, SILENT_FILE_NAME};
use crate::errors::CacheError;
use std::path::{Path, PathBuf};

/// One silent MPEG-1 Layer III frame (128 kbps, 44.1 kHz, ~26 ms).
///
/// Zeroed side info decodes as silence. Used for `silent.mp3` and for
/// placeholder audio.
pub fn silent_frame() -> Vec<u8> {
    const FRAME_LEN: usize = 417;
    let mut frame = vec![0u8; FRAME_LEN];
    frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
    frame
}

/// Flat directory of `dialog_<fingerprint>.mp3` files plus `silent.mp3`.
///
/// Presence is filename existence only; there is no index.
#[derive(Debug, Clone)]
pub struct AudioCache {
    dir: PathBuf,
}

impl AudioCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, text: &str) -> PathBuf {
        self.dir.join(artifact_name(text))
    }

    pub fn contains(&self, text: &str) -> bool {
        self.path_for(text).is_file()
    }

    /// Path of the stored audio for `text`, if it was generated.
    pub fn lookup(&self, text: &str) -> Option<PathBuf> {
        let p = self.path_for(text);
        p.is_file().then_some(p)
    }

    /// Stores `bytes` as the audio for `text` and returns the final path.
    ///
    /// Writes go to a `.part` sibling first and are renamed into place, so a
    /// valid cache name never points at a truncated file.
    pub fn store(&self, text: &str, bytes: &[u8]) -> Result<PathBuf, CacheError> {
        let target = self.path_for(text);
        self.write_atomic(&target, bytes)?;
        Ok(target)
    }

    /// Writes the built-in silent frame to `silent.mp3` unless it already exists.
    pub fn ensure_silence(&self) -> Result<PathBuf, CacheError> {
        let target = self.dir.join(SILENT_FILE_NAME);
        if !target.is_file() {
            self.write_atomic(&target, &silent_frame())?;
            tracing::debug!(path = %target.display(), "wrote silence artifact");
        }
        Ok(target)
    }

    fn write_atomic(&self, target: &Path, bytes: &[u8]) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;

        let mut tmp = target.as_os_str().to_owned();
        tmp.push(".part");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, bytes).map_err(|e| io_err(&tmp, e))?;
        std::fs::rename(&tmp, target).map_err(|e| io_err(target, e))?;
        Ok(())
    }
}

fn io_err(path: &Path, source: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.display().to_string(),
        source,
    }
}
