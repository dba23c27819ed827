use crate::bot::CommandInterpreter;
use teloxide::prelude::*;
use std::sync::Arc;
use log::{error, info};

/// Long-polling Telegram front end: every text message is one command,
/// answered in the chat it came from.
pub struct TelegramBot {
    bot: Bot,
    interpreter: Arc<CommandInterpreter>,
}

impl TelegramBot {
    pub fn new(bot_token: String, interpreter: Arc<CommandInterpreter>) -> Self {
        Self {
            bot: Bot::new(bot_token),
            interpreter,
        }
    }

    /// Runs until the process receives Ctrl-C.
    pub async fn start(self) {
        info!("Starting Telegram polling loop");
        let interpreter = self.interpreter.clone();
        teloxide::repl(self.bot, move |bot: Bot, msg: Message| {
            let interpreter = interpreter.clone();
            async move {
                handle_message(&bot, &interpreter, &msg).await;
                respond(())
            }
        })
        .await;
    }
}

async fn handle_message(bot: &Bot, interpreter: &CommandInterpreter, msg: &Message) {
    let chat_id = msg.chat.id;
    // Stickers, photos and the like read as empty input.
    let text = msg.text().unwrap_or_default();

    let reply = match interpreter.handle(chat_id.0, text).await {
        Ok(reply) => reply,
        Err(e) if e.is_fatal() => {
            error!("Could not persist the ledger, shutting down: {}", e);
            log::logger().flush();
            std::process::exit(1);
        }
        Err(e) => {
            error!("Failed to handle message from {}: {}", chat_id, e);
            return;
        }
    };

    if let Err(e) = bot.send_message(chat_id, reply.text).await {
        error!("Can't send message to chat {}: {}", chat_id, e);
    }
}
