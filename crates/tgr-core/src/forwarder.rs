use std::sync::Arc;

use tracing::{debug, error};

use crate::{errors::Error, ports::MessengerPort};

/// Best-effort delivery into a target chat.
///
/// Failures are logged and swallowed so one bad target never stalls the
/// router. No retry.
#[derive(Clone)]
pub struct MessageForwarder {
    messenger: Arc<dyn MessengerPort>,
}

impl MessageForwarder {
    pub fn new(messenger: Arc<dyn MessengerPort>) -> Self {
        Self { messenger }
    }

    pub async fn send(&self, target: &str, text: &str) {
        match self.messenger.send_message(target, text).await {
            Ok(()) => debug!(target_chat = target, "forwarded message"),
            Err(e) => {
                let err = match e {
                    Error::Forward(_) => e,
                    other => Error::Forward(other.to_string()),
                };
                error!(target_chat = target, "{err}");
            }
        }
    }
}
