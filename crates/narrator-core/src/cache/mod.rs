pub mod key;
pub mod store;

pub use key::{file_name, is_silence_marker, SILENCE_MARKER, SILENT_FILE_NAME};
pub use store::AudioCache;
