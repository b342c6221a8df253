use std::env;

/// HTTP listener configuration.
///
/// - `BIND_ADDR`: socket address the demo service listens on (default: `0.0.0.0:3000`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let bind_addr = env::var("BIND_ADDR")
            .map(|s| s.trim().to_string())
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "0.0.0.0:3000".to_string());

        Self { bind_addr }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}
