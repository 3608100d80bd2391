use crate::fingerprint::fingerprint;

/// Dialog text that maps to the shared silence artifact instead of being synthesized.
pub const SILENCE_MARKER: &str = "...";

pub const SILENT_FILE_NAME: &str = "silent.mp3";

const FILE_PREFIX: &str = "dialog_";
const FILE_EXT: &str = "mp3";

pub fn is_silence_marker(text: &str) -> bool {
    text == SILENCE_MARKER
}

/// Cache file name for `text`: `dialog_<fingerprint>.mp3`.
pub fn file_name(text: &str) -> String {
    format!("{}{}.{}", FILE_PREFIX, fingerprint(text), FILE_EXT)
}

/// File name the audio for `text` is stored under, silence marker included.
pub fn artifact_name(text: &str) -> String {
    if is_silence_marker(text) {
        SILENT_FILE_NAME.to_string()
    } else {
        file_name(text)
    }
}
