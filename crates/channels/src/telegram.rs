//! Telegram transport.

use crate::{is_allowed, Channel};
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ChatAction;
use tracing::{debug, error, info};
use twinbot_agent::TurnRunner;
use twinbot_config::Config;

pub const INVALID_TEXT_REPLY: &str = "Please send a valid text message.";

pub struct TelegramChannel {
    token: String,
    allow_from: Vec<String>,
    greeting: String,
    runner: Arc<dyn TurnRunner>,
}

impl TelegramChannel {
    pub fn new(config: &Config, runner: Arc<dyn TurnRunner>) -> Self {
        Self {
            token: config.telegram.token.clone(),
            allow_from: config.telegram.allow_from.clone(),
            greeting: greeting(&config.persona.owner_name),
            runner,
        }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("starting telegram channel");

        let bot = Bot::new(&self.token);
        let runner = self.runner.clone();
        let allow_from = self.allow_from.clone();
        let greeting = self.greeting.clone();

        teloxide::repl(bot, move |msg: Message, bot: Bot| {
            let runner = runner.clone();
            let allow_from = allow_from.clone();
            let greeting = greeting.clone();

            async move {
                let chat_id = msg.chat.id;
                let sender_id = msg.from().map(|u| u.id.to_string()).unwrap_or_default();
                if !is_allowed(&allow_from, &sender_id) {
                    debug!("ignoring message from unauthorized sender {}", sender_id);
                    return Ok(());
                }

                let text = msg.text().map(|t| t.to_string());

                // Each message gets its own task so one slow turn never
                // blocks other chats.
                tokio::spawn(async move {
                    if let Err(e) = handle_message(bot, chat_id, text, runner, greeting).await {
                        error!("telegram send failed: {}", e);
                    }
                });

                Ok(())
            }
        })
        .await;

        Ok(())
    }
}

async fn handle_message(
    bot: Bot,
    chat_id: ChatId,
    text: Option<String>,
    runner: Arc<dyn TurnRunner>,
    greeting: String,
) -> ResponseResult<()> {
    let text = match text {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            bot.send_message(chat_id, INVALID_TEXT_REPLY).await?;
            return Ok(());
        }
    };

    if text.trim() == "/start" {
        bot.send_message(chat_id, greeting).await?;
        return Ok(());
    }

    bot.send_chat_action(chat_id, ChatAction::Typing).await?;

    let reply = runner.run_turn(&text).await;
    bot.send_message(chat_id, reply).await?;

    Ok(())
}

fn greeting(owner_name: &str) -> String {
    format!("Hi! I'm AI {}. Ask me anything.", owner_name)
}
