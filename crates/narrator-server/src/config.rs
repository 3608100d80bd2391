use std::env;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind: String,
    pub timeout_ms: u64,
    pub max_body_bytes: usize,
    pub max_header_bytes: usize,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
            timeout_ms: 35_000,
            max_body_bytes: 64 * 1024,
            max_header_bytes: 16 * 1024,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = env::var("NARRATOR_BIND") {
            if !v.trim().is_empty() {
                cfg.bind = v;
            }
        }
        if let Ok(v) = env::var("NARRATOR_TIMEOUT_MS") {
            if let Ok(n) = v.parse() {
                cfg.timeout_ms = n;
            }
        }
        if let Ok(v) = env::var("NARRATOR_MAX_BODY_BYTES") {
            if let Ok(n) = v.parse() {
                cfg.max_body_bytes = n;
            }
        }
        if let Ok(v) = env::var("NARRATOR_LOG") {
            cfg.log_level = v;
        }
        cfg
    }
}
