use std::path::PathBuf;

use crate::constants::TERMINAL_DELAY_MS;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_RESOURCE_DIR: &str = "resources";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub resource_dir: PathBuf,
    pub static_dir: Option<PathBuf>,
    pub terminal_delay_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            resource_dir: PathBuf::from(DEFAULT_RESOURCE_DIR),
            static_dir: None,
            terminal_delay_ms: TERMINAL_DELAY_MS,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: parse_port(lookup("PORT").as_deref()).unwrap_or(defaults.port),
            resource_dir: lookup("RESOURCE_DIR")
                .filter(|raw| !raw.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.resource_dir),
            static_dir: resolve_static_dir(lookup("STATIC_DIR")),
            terminal_delay_ms: parse_delay_ms(lookup("TERMINAL_DELAY_MS").as_deref())
                .unwrap_or(defaults.terminal_delay_ms),
        }
    }
}

pub fn parse_port(raw: Option<&str>) -> Option<u16> {
    raw.and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|port| *port != 0)
}

pub fn parse_delay_ms(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .map(|delay| delay.min(60_000))
}

fn resolve_static_dir(raw: Option<String>) -> Option<PathBuf> {
    if let Some(raw) = raw {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    let candidates = [PathBuf::from("public"), PathBuf::from("dist")];
    candidates
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}
