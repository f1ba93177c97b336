use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{errors::Error, mapping::GroupMapping, Result};

const DEFAULT_SESSION_FILE: &str = "./session.txt";
const DEFAULT_CONNECTION_RETRIES: u32 = 5;
const DEFAULT_EVENT_BUFFER: usize = 256;

/// Typed configuration for the relay.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_id: i32,
    pub api_hash: String,
    pub group_map: Arc<GroupMapping>,
    pub session_file: PathBuf,
    pub connection_retries: u32,
    pub event_buffer: usize,
}

impl Config {
    /// Read the process environment, seeded from `./.env` if present.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"))?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_id = lookup("TELEGRAM_API_ID")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("TELEGRAM_API_ID environment variable is required".to_string())
            })?;
        let api_id = api_id.trim().parse::<i32>().map_err(|_| {
            Error::Config(format!("TELEGRAM_API_ID must be an integer, got `{api_id}`"))
        })?;

        let api_hash = lookup("TELEGRAM_API_HASH")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("TELEGRAM_API_HASH environment variable is required".to_string())
            })?;

        let group_map = lookup("GROUP_MAP").unwrap_or_default();
        let group_map = Arc::new(GroupMapping::parse(&group_map)?);

        let session_file = PathBuf::from(
            lookup("SESSION_FILE")
                .and_then(non_empty)
                .unwrap_or_else(|| DEFAULT_SESSION_FILE.to_string()),
        );

        let connection_retries =
            parse_or("CONNECTION_RETRIES", &lookup, DEFAULT_CONNECTION_RETRIES)?;
        let event_buffer = parse_or("EVENT_BUFFER", &lookup, DEFAULT_EVENT_BUFFER)?.max(1);

        Ok(Self {
            api_id,
            api_hash: api_hash.trim().to_string(),
            group_map,
            session_file,
            connection_retries,
            event_buffer,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T> {
    match lookup(key).and_then(non_empty) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| Error::Config(format!("{key} has an invalid value `{raw}`"))),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Variables already set in the environment win over the file.
fn load_dotenv_if_present(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::Config(format!("failed to read {}: {e}", path.display()))),
    }
}
