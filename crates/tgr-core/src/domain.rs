/// Telegram user/account id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AccountId(pub i64);

/// Chat identifier with its encoding prefix removed (`-100123` and `-123` both
/// become `123`). This is the key `GroupMapping` is indexed by.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalChatKey(pub String);

impl CanonicalChatKey {
    /// Channel ids arrive from the transport already bare.
    pub fn from_channel_id(id: i64) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalChatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serialized authenticated session. Opaque to the core.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionBlob(pub String);

impl SessionBlob {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Never print credentials.
impl std::fmt::Debug for SessionBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionBlob(<{} bytes>)", self.0.len())
    }
}

/// Where a message was posted.
///
/// Supergroups, gigagroups and broadcast channels are `Channel`; private
/// chats and basic groups are `Other` and never routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRef {
    Channel(i64),
    Other,
}

/// Who posted a message, when the transport knows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SenderRef {
    Present(AccountId),
    Absent,
}

/// One inbound message as delivered by the transport.
#[derive(Clone, Debug)]
pub struct IncomingMessageEvent {
    /// Transport message id, only used for log correlation.
    pub message_id: Option<i32>,
    pub chat: ChatRef,
    pub sender: SenderRef,
    pub text: Option<String>,
}

/// Account profile as returned by the transport's directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Display name prepended to forwarded messages. Missing parts are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SenderDisplayName {
    pub first_name: String,
    pub last_name: String,
}

impl From<Profile> for SenderDisplayName {
    fn from(p: Profile) -> Self {
        Self {
            first_name: p.first_name.unwrap_or_default(),
            last_name: p.last_name.unwrap_or_default(),
        }
    }
}
