use async_trait::async_trait;

use crate::{
    domain::{AccountId, Profile, SessionBlob},
    Result,
};

/// Opens a connection to the messaging transport.
///
/// `session = Some(..)` resumes a persisted session; the adapter must reject it
/// with `Error::Auth` if the transport no longer accepts it. `None` yields an
/// unauthenticated client ready for the login challenge.
#[async_trait]
pub trait Connector: Send + Sync {
    type Client: AuthPort + MessengerPort + 'static;

    async fn connect(&self, session: Option<&SessionBlob>) -> Result<Self::Client>;
}

/// Outcome of submitting the one-time code.
#[derive(Debug)]
pub enum SignIn<P> {
    Complete,
    /// The account has two-factor auth enabled.
    PasswordRequired(P),
}

/// Interactive login steps exposed by a connected, not yet authorized client.
#[async_trait]
pub trait AuthPort: Send + Sync {
    type LoginToken: Send + Sync;
    type PasswordToken: Send;

    async fn request_login_code(&self, phone: &str) -> Result<Self::LoginToken>;

    async fn sign_in(
        &self,
        token: &Self::LoginToken,
        code: &str,
    ) -> Result<SignIn<Self::PasswordToken>>;

    async fn check_password(&self, token: Self::PasswordToken, password: &str) -> Result<()>;

    /// Serialize the current (authorized) session.
    fn export_session(&self) -> SessionBlob;
}

/// Runtime calls the router makes against the transport.
#[async_trait]
pub trait MessengerPort: Send + Sync {
    async fn resolve_entity(&self, account: AccountId) -> Result<Profile>;

    /// `target` is the identifier exactly as configured in `GROUP_MAP`.
    async fn send_message(&self, target: &str, text: &str) -> Result<()>;
}

/// Human operator answering the login challenge.
#[async_trait]
pub trait HumanInput: Send + Sync {
    async fn ask_phone(&self) -> Result<String>;
    async fn ask_password(&self) -> Result<String>;
    async fn ask_code(&self) -> Result<String>;
}
