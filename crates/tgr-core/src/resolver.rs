use std::sync::Arc;

use tracing::warn;

use crate::{
    domain::{SenderDisplayName, SenderRef},
    ports::MessengerPort,
};

/// Looks up the display name of a message's sender.
///
/// Never fails: an unknown or unreachable sender becomes an empty name. Every
/// call hits the transport; there is no cache here.
#[derive(Clone)]
pub struct SenderResolver {
    messenger: Arc<dyn MessengerPort>,
}

impl SenderResolver {
    pub fn new(messenger: Arc<dyn MessengerPort>) -> Self {
        Self { messenger }
    }

    pub async fn resolve(&self, sender: &SenderRef) -> SenderDisplayName {
        let SenderRef::Present(account) = *sender else {
            return SenderDisplayName::default();
        };

        match self.messenger.resolve_entity(account).await {
            Ok(profile) => profile.into(),
            Err(e) => {
                warn!(account = account.0, "could not resolve sender: {e}");
                SenderDisplayName::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, Profile};
    use crate::errors::Error;
    use crate::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Directory {
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl MessengerPort for Directory {
        async fn resolve_entity(&self, account: AccountId) -> Result<Profile> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            match account.0 {
                1 => Ok(Profile {
                    first_name: Some("Ana".to_string()),
                    last_name: None,
                }),
                2 => Ok(Profile {
                    first_name: Some("João".to_string()),
                    last_name: Some("Silva".to_string()),
                }),
                _ => Err(Error::Resolution("USER_ID_INVALID".to_string())),
            }
        }

        async fn send_message(&self, _target: &str, _text: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn absent_sender_short_circuits() {
        let dir = Arc::new(Directory::default());
        let resolver = SenderResolver::new(dir.clone());

        for _ in 0..2 {
            assert_eq!(
                resolver.resolve(&SenderRef::Absent).await,
                SenderDisplayName::default()
            );
        }
        assert_eq!(dir.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_fields_become_empty() {
        let dir = Arc::new(Directory::default());
        let resolver = SenderResolver::new(dir.clone());

        let name = resolver
            .resolve(&SenderRef::Present(AccountId(1)))
            .await;
        assert_eq!(name.first_name, "Ana");
        assert_eq!(name.last_name, "");

        let name = resolver
            .resolve(&SenderRef::Present(AccountId(2)))
            .await;
        assert_eq!(name.first_name, "João");
        assert_eq!(name.last_name, "Silva");
        assert_eq!(dir.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn lookup_failure_falls_back_to_empty_name() {
        let dir = Arc::new(Directory::default());
        let resolver = SenderResolver::new(dir.clone());

        let name = resolver
            .resolve(&SenderRef::Present(AccountId(404)))
            .await;
        assert_eq!(name, SenderDisplayName::default());
        assert_eq!(dir.lookups.load(Ordering::SeqCst), 1);
    }
}
