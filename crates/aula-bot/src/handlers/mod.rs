mod callback;
mod message;

use anyhow::Result;

use crate::bot::{BotContext, BotEvent};

pub(crate) async fn handle_event(context: &BotContext, event: BotEvent) -> Result<()> {
    match event {
        BotEvent::Message(message) => message::handle_message(context, message).await,
        BotEvent::Callback(query) => callback::handle_callback(context, query).await,
    }
}
