/// Service configuration parsed from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Maximum number of games the store will hold.
    pub max_games: usize,
    /// Whether a `Check` notification is broadcast after a checking move.
    pub announce_check: bool,
}

const DEFAULT_MAX_GAMES: usize = 1024;

impl ServiceConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing or unparseable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        ServiceConfig {
            max_games: lookup("CHESS_MAX_GAMES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_games),
            announce_check: lookup("CHESS_ANNOUNCE_CHECK")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.announce_check),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            max_games: DEFAULT_MAX_GAMES,
            announce_check: true,
        }
    }
}
