use anyhow::Context;
use grammers_client::{
    types::{Chat, Message},
    Update,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use tgr_core::domain::{AccountId, IncomingMessageEvent, SenderRef};

use crate::{directory::chat_ref, MtprotoClient};

impl MtprotoClient {
    /// Feed every new message into the router's channel.
    ///
    /// Outgoing messages are included: anything the logged-in account posts
    /// in a source chat is relayed too. Returns `Ok(())` once the router side
    /// hangs up; a broken update stream is an error.
    pub async fn pump_updates(&self, tx: mpsc::Sender<IncomingMessageEvent>) -> anyhow::Result<()> {
        info!("listening for updates");
        loop {
            let update = self
                .client
                .next_update()
                .await
                .context("telegram update stream failed")?;

            let Update::NewMessage(message) = update else {
                continue;
            };

            let event = self.to_event(&message).await;
            if tx.send(event).await.is_err() {
                debug!("router channel closed, stopping update pump");
                return Ok(());
            }
        }
    }

    async fn to_event(&self, message: &Message) -> IncomingMessageEvent {
        let chat = message.chat();
        self.directory.record(&chat).await;

        let sender = match message.sender() {
            Some(Chat::User(user)) => {
                self.directory.record_sender(&user).await;
                SenderRef::Present(AccountId(user.id()))
            }
            // Anonymous admins and channel posts carry no person.
            Some(_) => SenderRef::Absent,
            None => SenderRef::Absent,
        };

        let text = message.text();
        IncomingMessageEvent {
            message_id: Some(message.id()),
            chat: chat_ref(&chat.pack()),
            sender,
            text: (!text.is_empty()).then(|| text.to_string()),
        }
    }
}
