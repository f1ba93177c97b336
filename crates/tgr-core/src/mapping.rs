use std::collections::HashMap;

use crate::{domain::CanonicalChatKey, errors::Error, Result};

/// Marker Telegram prepends to supergroup/channel ids in "bot API" form.
const SUPERGROUP_PREFIX: &str = "-100";

/// Strip the chat-id encoding prefix.
///
/// `-100123` (supergroup form) and `-123` (plain negative form) both map to
/// `123`. A bare id is already canonical. Numeric ids are re-rendered so
/// `-1000123` lands on the same key as channel `123`.
pub fn canonicalize(raw: &str) -> CanonicalChatKey {
    let raw = raw.trim();
    let bare = raw
        .strip_prefix(SUPERGROUP_PREFIX)
        .or_else(|| raw.strip_prefix('-'))
        .unwrap_or(raw);
    match bare.parse::<i64>() {
        Ok(id) => CanonicalChatKey::from_channel_id(id),
        Err(_) => CanonicalChatKey(bare.to_string()),
    }
}

/// Source chat to target chat associations, built once at startup.
#[derive(Clone, Debug, Default)]
pub struct GroupMapping {
    routes: HashMap<CanonicalChatKey, String>,
}

impl GroupMapping {
    /// Parse `source:target[,source:target]*`.
    ///
    /// Blank tokens (e.g. a trailing comma) are skipped. A token without a `:`
    /// or with an empty side is a config error; we'd rather refuse to start
    /// than silently drop a route. A repeated source keeps the last target.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut routes = HashMap::new();

        for token in spec.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            let Some((source, target)) = token.split_once(':') else {
                return Err(Error::Config(format!(
                    "GROUP_MAP entry `{token}` is missing the `:` separator"
                )));
            };

            let (source, target) = (source.trim(), target.trim());
            if source.is_empty() || target.is_empty() {
                return Err(Error::Config(format!(
                    "GROUP_MAP entry `{token}` needs both a source and a target"
                )));
            }

            routes.insert(canonicalize(source), target.to_string());
        }

        if routes.is_empty() {
            return Err(Error::Config(
                "GROUP_MAP must contain at least one source:target pair".to_string(),
            ));
        }

        Ok(Self { routes })
    }

    pub fn lookup(&self, key: &CanonicalChatKey) -> Option<&str> {
        self.routes.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalChatKey, &str)> {
        self.routes.iter().map(|(k, v)| (k, v.as_str()))
    }
}
