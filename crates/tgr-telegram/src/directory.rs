use std::collections::HashMap;

use grammers_client::types::{Chat, User};
use grammers_session::{PackedChat, PackedType};
use tokio::sync::RwLock;

use tgr_core::domain::{AccountId, ChatRef, Profile};

/// Sender profiles kept before the cache is reset.
pub const MAX_PROFILES: usize = 10_000;

/// Telegram numbers users, basic groups and channels independently, so the
/// same id can name one of each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeerKind {
    User,
    Group,
    Channel,
}

impl PeerKind {
    pub fn of(ty: PackedType) -> Self {
        match ty {
            PackedType::User | PackedType::Bot => PeerKind::User,
            PackedType::Chat => PeerKind::Group,
            PackedType::Megagroup | PackedType::Broadcast | PackedType::Gigagroup => {
                PeerKind::Channel
            }
        }
    }

    /// Ids written as `-123` or `123` may still name a channel, since source
    /// chats accept that form; an exact kind match always wins.
    fn search_order(self) -> &'static [PeerKind] {
        match self {
            PeerKind::Channel => &[PeerKind::Channel],
            PeerKind::Group => &[PeerKind::Group, PeerKind::Channel],
            PeerKind::User => &[PeerKind::User, PeerKind::Channel],
        }
    }
}

/// Addressing data for every peer the client has seen.
///
/// `chats` holds the chats messages arrive in plus the dialog list, so it is
/// bounded by what the account has joined. `profiles` is filled from message
/// senders, who can be anyone in a large group; it is cleared once it holds
/// `profile_limit` entries and refills from later updates.
pub struct PeerDirectory {
    chats: RwLock<HashMap<(PeerKind, i64), PackedChat>>,
    profiles: RwLock<HashMap<i64, Profile>>,
    profile_limit: usize,
}

impl Default for PeerDirectory {
    fn default() -> Self {
        Self::with_profile_limit(MAX_PROFILES)
    }
}

impl PeerDirectory {
    pub fn with_profile_limit(profile_limit: usize) -> Self {
        Self {
            chats: RwLock::new(HashMap::new()),
            profiles: RwLock::new(HashMap::new()),
            profile_limit: profile_limit.max(1),
        }
    }

    /// Remember a chat we may post into. Private chats also yield a profile.
    pub async fn record(&self, chat: &Chat) {
        self.insert_packed(chat.pack()).await;
        if let Chat::User(user) = chat {
            self.record_sender(user).await;
        }
    }

    /// Remember who sent a message; only the name is kept.
    pub async fn record_sender(&self, user: &User) {
        let profile = profile_from_names(user.first_name(), user.last_name());
        self.insert_profile(AccountId(user.id()), profile).await;
    }

    pub async fn insert_packed(&self, packed: PackedChat) {
        self.chats
            .write()
            .await
            .insert((PeerKind::of(packed.ty), packed.id), packed);
    }

    pub async fn insert_profile(&self, account: AccountId, profile: Profile) {
        let mut profiles = self.profiles.write().await;
        if profiles.len() >= self.profile_limit && !profiles.contains_key(&account.0) {
            profiles.clear();
        }
        profiles.insert(account.0, profile);
    }

    /// Find a target, trying its own kind first and then the fallbacks.
    pub async fn lookup(&self, kind: PeerKind, id: i64) -> Option<PackedChat> {
        let chats = self.chats.read().await;
        kind.search_order()
            .iter()
            .find_map(|k| chats.get(&(*k, id)).cloned())
    }

    pub async fn profile(&self, account: AccountId) -> Option<Profile> {
        self.profiles.read().await.get(&account.0).cloned()
    }

    pub async fn profile_count(&self) -> usize {
        self.profiles.read().await.len()
    }
}

/// Telegram reports a deleted account as an empty first name.
pub fn profile_from_names(first: &str, last: Option<&str>) -> Profile {
    Profile {
        first_name: Some(first).filter(|s| !s.is_empty()).map(str::to_string),
        last_name: last.filter(|s| !s.is_empty()).map(str::to_string),
    }
}

/// Supergroups, gigagroups and broadcast channels all live in the channel id
/// space; everything else is never routed.
pub fn chat_ref(packed: &PackedChat) -> ChatRef {
    match PeerKind::of(packed.ty) {
        PeerKind::Channel => ChatRef::Channel(packed.id),
        _ => ChatRef::Other,
    }
}

/// A configured target: a numeric chat id with its kind, or a public username.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetAddr {
    Peer(PeerKind, i64),
    Username(String),
}

/// `-100<id>` is a channel, `-<id>` a basic group, a bare id a user.
pub fn parse_target(raw: &str) -> TargetAddr {
    let raw = raw.trim();
    let numeric = |s: &str| s.parse::<i64>().ok().filter(|id| *id >= 0);

    if let Some(id) = raw.strip_prefix("-100").and_then(numeric) {
        return TargetAddr::Peer(PeerKind::Channel, id);
    }
    if let Some(id) = raw.strip_prefix('-').and_then(numeric) {
        return TargetAddr::Peer(PeerKind::Group, id);
    }
    match numeric(raw) {
        Some(id) => TargetAddr::Peer(PeerKind::User, id),
        None => TargetAddr::Username(raw.trim_start_matches('@').to_string()),
    }
}
