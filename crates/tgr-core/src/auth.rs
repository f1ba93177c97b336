use tracing::info;

use crate::{
    ports::{AuthPort, Connector, HumanInput, SignIn},
    session_store::SessionStore,
    Result,
};

/// How the session was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    /// Reconnected with the persisted session; nobody was prompted.
    Resumed,
    /// Interactive login completed and the new session was persisted.
    Fresh,
}

/// A connected, authorized client ready to be handed to the router.
pub struct Established<C> {
    pub client: C,
    pub mode: AuthMode,
}

/// Resume a stored session or drive the interactive login.
///
/// Every failure here is fatal to startup; nothing is retried.
pub struct AuthFlow<'a, C> {
    connector: &'a C,
    store: &'a dyn SessionStore,
    input: &'a dyn HumanInput,
}

impl<'a, C: Connector> AuthFlow<'a, C> {
    pub fn new(connector: &'a C, store: &'a dyn SessionStore, input: &'a dyn HumanInput) -> Self {
        Self {
            connector,
            store,
            input,
        }
    }

    pub async fn establish(&self) -> Result<Established<C::Client>> {
        if self.store.exists().await {
            info!("using saved session");
            let session = self.store.load().await?;
            let client = self.connector.connect(Some(&session)).await?;
            return Ok(Established {
                client,
                mode: AuthMode::Resumed,
            });
        }

        info!("no saved session, starting interactive login");
        let client = self.connector.connect(None).await?;
        self.login(&client).await?;

        self.store.save(&client.export_session()).await?;
        info!("session saved");

        Ok(Established {
            client,
            mode: AuthMode::Fresh,
        })
    }

    async fn login(&self, client: &C::Client) -> Result<()> {
        let phone = self.input.ask_phone().await?;
        let token = client.request_login_code(phone.trim()).await?;

        let code = self.input.ask_code().await?;
        match client.sign_in(&token, code.trim()).await? {
            SignIn::Complete => Ok(()),
            SignIn::PasswordRequired(password_token) => {
                // Passwords may legitimately contain surrounding spaces.
                let password = self.input.ask_password().await?;
                client.check_password(password_token, &password).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, Profile, SessionBlob};
    use crate::errors::Error;
    use crate::ports::MessengerPort;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Calls {
        connects: Mutex<Vec<Option<String>>>,
        codes_requested: Mutex<Vec<String>>,
        sign_ins: Mutex<Vec<String>>,
        passwords: Mutex<Vec<String>>,
    }

    struct FakeConnector {
        calls: Arc<Calls>,
        needs_password: bool,
        reject_stored: bool,
        wrong_code: bool,
    }

    impl FakeConnector {
        fn new() -> Self {
            Self {
                calls: Arc::new(Calls::default()),
                needs_password: false,
                reject_stored: false,
                wrong_code: false,
            }
        }
    }

    struct FakeClient {
        calls: Arc<Calls>,
        needs_password: bool,
        wrong_code: bool,
    }

    #[async_trait]
    impl Connector for FakeConnector {
        type Client = FakeClient;

        async fn connect(&self, session: Option<&SessionBlob>) -> Result<FakeClient> {
            self.calls
                .connects
                .lock()
                .unwrap()
                .push(session.map(|s| s.as_str().to_string()));
            if session.is_some() && self.reject_stored {
                return Err(Error::Auth("stored session was rejected".to_string()));
            }
            Ok(FakeClient {
                calls: self.calls.clone(),
                needs_password: self.needs_password,
                wrong_code: self.wrong_code,
            })
        }
    }

    #[async_trait]
    impl AuthPort for FakeClient {
        type LoginToken = String;
        type PasswordToken = u8;

        async fn request_login_code(&self, phone: &str) -> Result<String> {
            self.calls
                .codes_requested
                .lock()
                .unwrap()
                .push(phone.to_string());
            Ok(format!("token-for-{phone}"))
        }

        async fn sign_in(&self, token: &String, code: &str) -> Result<SignIn<u8>> {
            self.calls
                .sign_ins
                .lock()
                .unwrap()
                .push(format!("{token}/{code}"));
            if self.wrong_code {
                return Err(Error::Auth("PHONE_CODE_INVALID".to_string()));
            }
            if self.needs_password {
                Ok(SignIn::PasswordRequired(7))
            } else {
                Ok(SignIn::Complete)
            }
        }

        async fn check_password(&self, token: u8, password: &str) -> Result<()> {
            assert_eq!(token, 7);
            self.calls
                .passwords
                .lock()
                .unwrap()
                .push(password.to_string());
            Ok(())
        }

        fn export_session(&self) -> SessionBlob {
            SessionBlob("fresh-session".to_string())
        }
    }

    #[async_trait]
    impl MessengerPort for FakeClient {
        async fn resolve_entity(&self, _account: AccountId) -> Result<Profile> {
            Ok(Profile::default())
        }

        async fn send_message(&self, _target: &str, _text: &str) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        blob: Mutex<Option<SessionBlob>>,
        saves: AtomicUsize,
    }

    impl MemoryStore {
        fn with(blob: &str) -> Self {
            Self {
                blob: Mutex::new(Some(SessionBlob(blob.to_string()))),
                saves: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SessionStore for MemoryStore {
        async fn exists(&self) -> bool {
            self.blob.lock().unwrap().is_some()
        }

        async fn load(&self) -> Result<SessionBlob> {
            self.blob.lock().unwrap().clone().ok_or_else(|| Error::Storage {
                path: "memory".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }

        async fn save(&self, session: &SessionBlob) -> Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            *self.blob.lock().unwrap() = Some(session.clone());
            Ok(())
        }
    }

    /// Scripted operator; counts every prompt.
    #[derive(Default)]
    struct ScriptedInput {
        prompts: AtomicUsize,
    }

    impl ScriptedInput {
        fn prompt_count(&self) -> usize {
            self.prompts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HumanInput for ScriptedInput {
        async fn ask_phone(&self) -> Result<String> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            Ok(" +5511999990000\n".to_string())
        }

        async fn ask_password(&self) -> Result<String> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            Ok("hunter2".to_string())
        }

        async fn ask_code(&self) -> Result<String> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            Ok("12345 ".to_string())
        }
    }

    #[tokio::test]
    async fn existing_session_never_prompts() {
        let connector = FakeConnector::new();
        let store = MemoryStore::with("stored-session");
        let input = ScriptedInput::default();

        let est = AuthFlow::new(&connector, &store, &input)
            .establish()
            .await
            .unwrap();

        assert_eq!(est.mode, AuthMode::Resumed);
        assert_eq!(input.prompt_count(), 0);
        assert_eq!(
            *connector.calls.connects.lock().unwrap(),
            vec![Some("stored-session".to_string())]
        );
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_stored_session_is_fatal_and_does_not_prompt() {
        let mut connector = FakeConnector::new();
        connector.reject_stored = true;
        let store = MemoryStore::with("expired");
        let input = ScriptedInput::default();

        let res = AuthFlow::new(&connector, &store, &input).establish().await;

        assert!(matches!(res, Err(Error::Auth(_))));
        assert_eq!(input.prompt_count(), 0);
    }

    #[tokio::test]
    async fn fresh_login_without_password_persists_session() {
        let connector = FakeConnector::new();
        let store = MemoryStore::default();
        let input = ScriptedInput::default();

        let est = AuthFlow::new(&connector, &store, &input)
            .establish()
            .await
            .unwrap();

        assert_eq!(est.mode, AuthMode::Fresh);
        assert_eq!(input.prompt_count(), 2);
        assert_eq!(
            *connector.calls.codes_requested.lock().unwrap(),
            vec!["+5511999990000".to_string()]
        );
        assert_eq!(
            *connector.calls.sign_ins.lock().unwrap(),
            vec!["token-for-+5511999990000/12345".to_string()]
        );
        assert!(connector.calls.passwords.lock().unwrap().is_empty());
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
        assert_eq!(store.load().await.unwrap().as_str(), "fresh-session");
    }

    #[tokio::test]
    async fn fresh_login_asks_password_when_required() {
        let mut connector = FakeConnector::new();
        connector.needs_password = true;
        let store = MemoryStore::default();
        let input = ScriptedInput::default();

        AuthFlow::new(&connector, &store, &input)
            .establish()
            .await
            .unwrap();

        assert_eq!(input.prompt_count(), 3);
        assert_eq!(
            *connector.calls.passwords.lock().unwrap(),
            vec!["hunter2".to_string()]
        );
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_sign_in_does_not_persist_anything() {
        let mut connector = FakeConnector::new();
        connector.wrong_code = true;
        let store = MemoryStore::default();
        let input = ScriptedInput::default();

        let res = AuthFlow::new(&connector, &store, &input).establish().await;

        assert!(matches!(res, Err(Error::Auth(_))));
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
        assert!(!store.exists().await);
    }
}
