//! Telegram adapter (grammers, MTProto user account).
//!
//! This crate implements the `tgr-core` ports over a logged-in Telegram user
//! session: connecting/resuming, the interactive login steps, name lookups,
//! sending, and the update stream.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use grammers_client::{
    types::{LoginToken, PasswordToken},
    Client, Config as ClientConfig, InitParams, SignInError,
};
use grammers_session::{PackedChat, Session};
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub mod directory;
pub mod updates;

use directory::{parse_target, PeerDirectory, TargetAddr};

use tgr_core::{
    config::Config,
    domain::{AccountId, Profile, SessionBlob},
    errors::Error,
    ports::{AuthPort, Connector, MessengerPort, SignIn},
    Result,
};

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Opens MTProto connections with the configured application credentials.
#[derive(Clone)]
pub struct MtprotoConnector {
    api_id: i32,
    api_hash: String,
    connection_retries: u32,
}

impl MtprotoConnector {
    pub fn new(cfg: &Config) -> Self {
        Self {
            api_id: cfg.api_id,
            api_hash: cfg.api_hash.clone(),
            connection_retries: cfg.connection_retries,
        }
    }

    /// Connect, retrying transient network failures.
    ///
    /// grammers consumes the `Session`, so every attempt decodes a fresh one.
    async fn open(&self, session: Option<&SessionBlob>) -> Result<Client> {
        let mut attempts = 0u32;
        loop {
            let session = match session {
                Some(blob) => decode_session(blob)?,
                None => Session::new(),
            };

            let res = Client::connect(ClientConfig {
                session,
                api_id: self.api_id,
                api_hash: self.api_hash.clone(),
                params: InitParams::default(),
            })
            .await;

            match res {
                Ok(client) => return Ok(client),
                Err(e) if attempts < self.connection_retries => {
                    attempts += 1;
                    warn!(
                        attempt = attempts,
                        max = self.connection_retries,
                        "connect failed, retrying: {e}"
                    );
                    sleep(RECONNECT_DELAY).await;
                }
                Err(e) => return Err(Error::External(format!("telegram connect failed: {e}"))),
            }
        }
    }
}

#[async_trait]
impl Connector for MtprotoConnector {
    type Client = MtprotoClient;

    async fn connect(&self, session: Option<&SessionBlob>) -> Result<MtprotoClient> {
        let client = self.open(session).await?;

        if session.is_some() {
            let authorized = client
                .is_authorized()
                .await
                .map_err(|e| Error::Auth(format!("could not verify stored session: {e}")))?;
            if !authorized {
                return Err(Error::Auth(
                    "stored session is no longer authorized; remove the session file to log in again"
                        .to_string(),
                ));
            }
        }

        Ok(MtprotoClient::new(client))
    }
}

/// A connected grammers client plus the peers it has seen.
#[derive(Clone)]
pub struct MtprotoClient {
    client: Client,
    directory: Arc<PeerDirectory>,
}

impl MtprotoClient {
    fn new(client: Client) -> Self {
        Self {
            client,
            directory: Arc::new(PeerDirectory::default()),
        }
    }

    /// Walk the dialog list and record every chat in it.
    ///
    /// Targets are addressed by id, and MTProto only lets us post into chats
    /// whose access hash we know; dialogs are where those come from.
    pub async fn refresh_dialogs(&self) -> Result<usize> {
        let mut dialogs = self.client.iter_dialogs();
        let mut seen = 0usize;
        while let Some(dialog) = dialogs
            .next()
            .await
            .map_err(|e| Error::External(format!("failed to list dialogs: {e}")))?
        {
            self.directory.record(dialog.chat()).await;
            seen += 1;
        }
        let profiles = self.directory.profile_count().await;
        debug!(
            dialogs = seen,
            profiles = profiles,
            "peer directory refreshed"
        );
        Ok(seen)
    }

    async fn target_chat(&self, target: &str) -> Result<PackedChat> {
        match parse_target(target) {
            TargetAddr::Peer(kind, id) => {
                if let Some(chat) = self.directory.lookup(kind, id).await {
                    return Ok(chat);
                }
                self.refresh_dialogs().await?;
                self.directory.lookup(kind, id).await.ok_or_else(|| {
                    Error::Forward(format!(
                        "target chat {target} is not among this account's dialogs"
                    ))
                })
            }
            TargetAddr::Username(name) => {
                let chat = self
                    .client
                    .resolve_username(&name)
                    .await
                    .map_err(|e| Error::Forward(format!("could not resolve @{name}: {e}")))?
                    .ok_or_else(|| Error::Forward(format!("no chat named @{name}")))?;
                self.directory.record(&chat).await;
                Ok(chat.pack())
            }
        }
    }
}

#[async_trait]
impl AuthPort for MtprotoClient {
    type LoginToken = LoginToken;
    type PasswordToken = PasswordToken;

    async fn request_login_code(&self, phone: &str) -> Result<LoginToken> {
        self.client
            .request_login_code(phone)
            .await
            .map_err(|e| Error::Auth(format!("could not request login code: {e}")))
    }

    async fn sign_in(&self, token: &LoginToken, code: &str) -> Result<SignIn<PasswordToken>> {
        match self.client.sign_in(token, code).await {
            Ok(_) => Ok(SignIn::Complete),
            Err(SignInError::PasswordRequired(password_token)) => {
                Ok(SignIn::PasswordRequired(password_token))
            }
            Err(e) => Err(Error::Auth(format!("sign in failed: {e}"))),
        }
    }

    async fn check_password(&self, token: PasswordToken, password: &str) -> Result<()> {
        self.client
            .check_password(token, password)
            .await
            .map(|_| ())
            .map_err(|e| Error::Auth(format!("two-factor password rejected: {e}")))
    }

    fn export_session(&self) -> SessionBlob {
        encode_session(self.client.session())
    }
}

#[async_trait]
impl MessengerPort for MtprotoClient {
    async fn resolve_entity(&self, account: AccountId) -> Result<Profile> {
        self.directory
            .profile(account)
            .await
            .ok_or_else(|| Error::Resolution(format!("user {} has not been seen", account.0)))
    }

    async fn send_message(&self, target: &str, text: &str) -> Result<()> {
        let chat = self.target_chat(target).await?;
        self.client
            .send_message(chat, text)
            .await
            .map_err(|e| Error::Forward(format!("send to {target} failed: {e}")))?;
        Ok(())
    }
}

/// Log how many peers are addressable right after startup.
pub async fn warm_up(client: &MtprotoClient) {
    match client.refresh_dialogs().await {
        Ok(n) => info!(dialogs = n, "loaded dialogs"),
        Err(e) => warn!("could not preload dialogs: {e}"),
    }
}

fn encode_session(session: &Session) -> SessionBlob {
    SessionBlob(STANDARD.encode(session.save()))
}

fn decode_session(blob: &SessionBlob) -> Result<Session> {
    let bytes = STANDARD
        .decode(blob.as_str().trim())
        .map_err(|e| Error::Auth(format!("stored session is not valid base64: {e}")))?;
    Session::load(&bytes).map_err(|e| Error::Auth(format!("stored session is corrupt: {e:?}")))
}
