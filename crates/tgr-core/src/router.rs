use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::{
    domain::{CanonicalChatKey, ChatRef, IncomingMessageEvent, SenderDisplayName},
    errors::Error,
    forwarder::MessageForwarder,
    mapping::GroupMapping,
    resolver::SenderResolver,
    Result,
};

/// What happened to one event.
#[derive(Debug)]
pub enum RouteOutcome {
    /// Not routable: not a channel, no id, or no text.
    Dropped(Error),
    /// Valid channel message with no route configured.
    Unmapped(CanonicalChatKey),
    /// Handed to the forwarder (delivery itself is best-effort).
    Forwarded { target: String },
}

/// `"{first} {last}:\n{text}"`. The space is kept even when a name part is
/// empty, so "Ana" with no last name reads `"Ana :\n..."`.
pub fn compose_forward_text(name: &SenderDisplayName, text: &str) -> String {
    format!("{} {}:\n{}", name.first_name, name.last_name, text)
}

/// Turns inbound events into forwards.
pub struct EventRouter {
    mapping: Arc<GroupMapping>,
    resolver: SenderResolver,
    forwarder: MessageForwarder,
}

impl EventRouter {
    pub fn new(
        mapping: Arc<GroupMapping>,
        resolver: SenderResolver,
        forwarder: MessageForwarder,
    ) -> Self {
        Self {
            mapping,
            resolver,
            forwarder,
        }
    }

    /// Consume events until the channel closes.
    ///
    /// Each event gets its own task, so a slow lookup or send never holds up
    /// the next event and forwards may complete out of arrival order.
    pub async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<IncomingMessageEvent>) {
        info!(routes = self.mapping.len(), "router started");
        while let Some(event) = rx.recv().await {
            let router = Arc::clone(&self);
            tokio::spawn(async move {
                router.handle(event).await;
            });
        }
        info!("event stream closed, router stopping");
    }

    pub async fn handle(&self, event: IncomingMessageEvent) -> RouteOutcome {
        let (channel_id, text) = match routable(&event) {
            Ok(parts) => parts,
            Err(e) => {
                debug!(message_id = ?event.message_id, "dropping event: {e}");
                return RouteOutcome::Dropped(e);
            }
        };

        let key = CanonicalChatKey::from_channel_id(channel_id);
        let Some(target) = self.mapping.lookup(&key) else {
            trace!(chat = %key, "no route for chat");
            return RouteOutcome::Unmapped(key);
        };

        let name = self.resolver.resolve(&event.sender).await;
        let body = compose_forward_text(&name, text);

        debug!(
            message_id = ?event.message_id,
            source = %key,
            target_chat = target,
            "forwarding message"
        );
        self.forwarder.send(target, &body).await;

        RouteOutcome::Forwarded {
            target: target.to_string(),
        }
    }
}

fn routable(event: &IncomingMessageEvent) -> Result<(i64, &str)> {
    let ChatRef::Channel(channel_id) = event.chat else {
        return Err(Error::MalformedEvent("not a channel message".to_string()));
    };
    if channel_id == 0 {
        return Err(Error::MalformedEvent("channel id is zero".to_string()));
    }
    match event.text.as_deref() {
        Some(text) if !text.is_empty() => Ok((channel_id, text)),
        _ => Err(Error::MalformedEvent("message has no text".to_string())),
    }
}
