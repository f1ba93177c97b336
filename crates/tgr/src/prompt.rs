use async_trait::async_trait;
use dialoguer::{Input, Password};

use tgr_core::{errors::Error, ports::HumanInput, Result};

/// Asks the operator on the controlling terminal.
pub struct TerminalPrompt;

impl TerminalPrompt {
    async fn ask(prompt: &'static str, hidden: bool) -> Result<String> {
        tokio::task::spawn_blocking(move || {
            if hidden {
                Password::new().with_prompt(prompt).interact()
            } else {
                Input::<String>::new().with_prompt(prompt).interact_text()
            }
        })
        .await
        .map_err(|e| Error::Auth(format!("prompt task failed: {e}")))?
        .map_err(|e| Error::Auth(format!("could not read answer: {e}")))
    }
}

#[async_trait]
impl HumanInput for TerminalPrompt {
    async fn ask_phone(&self) -> Result<String> {
        Self::ask("Phone number (international format)", false).await
    }

    async fn ask_password(&self) -> Result<String> {
        Self::ask("Two-factor password", true).await
    }

    async fn ask_code(&self) -> Result<String> {
        Self::ask("Login code sent by Telegram", false).await
    }
}
