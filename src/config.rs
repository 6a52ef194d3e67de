use std::str::FromStr;

use tracing::warn;

pub const DEFAULT_PORT: u16 = 8082;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_MAX_GAMES: usize = 1000;

/// Server settings: `HOST`, `PORT` and `CHESS_MAX_GAMES`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub host: String,
    /// Games held in memory at once; creation beyond this is refused.
    pub max_games: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Unset or unparsable values fall back
    /// to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        AppConfig {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            max_games: Some(parse_or(&lookup, "CHESS_MAX_GAMES", DEFAULT_MAX_GAMES))
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_MAX_GAMES),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "ignoring unparsable setting");
            default
        }),
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
