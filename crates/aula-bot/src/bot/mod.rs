mod context;
mod queue;

pub(crate) use context::BotContext;
pub(crate) use queue::{BotEvent, dispatch_event, new_chat_queues};
