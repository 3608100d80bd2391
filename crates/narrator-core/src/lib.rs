pub mod achievements;
pub mod cache;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fingerprint;
pub mod model;
pub mod providers;
pub mod report;

pub use fingerprint::{fingerprint, Fingerprint};
