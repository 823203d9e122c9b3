use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, warn};

use crate::bot::context::BotContext;
use crate::handlers;
use crate::telegram::{CallbackQuery, Message, User};

/// One inbound event: a typed message or a keyboard tap.
pub(crate) enum BotEvent {
    Message(Message),
    Callback(CallbackQuery),
}

impl BotEvent {
    /// Chat the event belongs to. Callbacks without an originating
    /// message have no chat to respond in and are dropped earlier.
    fn chat_id(&self) -> Option<i64> {
        match self {
            BotEvent::Message(message) => Some(message.chat.id),
            BotEvent::Callback(query) => query.message.as_ref().map(|message| message.chat.id),
        }
    }

    fn sender(&self) -> Option<&User> {
        match self {
            BotEvent::Message(message) => message.from.as_ref(),
            BotEvent::Callback(query) => Some(&query.from),
        }
    }

    fn is_private(&self) -> bool {
        match self {
            BotEvent::Message(message) => message.chat.is_private(),
            BotEvent::Callback(query) => query
                .message
                .as_ref()
                .is_some_and(|message| message.chat.is_private()),
        }
    }
}

/// Per-chat queues: all events of one chat run sequentially, different
/// chats run concurrently. This is what keeps dialogue turns ordered.
pub(crate) type ChatQueueMap = Arc<Mutex<HashMap<i64, mpsc::UnboundedSender<BotEvent>>>>;

pub(crate) fn new_chat_queues() -> ChatQueueMap {
    Arc::new(Mutex::new(HashMap::new()))
}

/// Routes an event to its chat's worker, creating the worker on first use.
pub(crate) async fn dispatch_event(
    queues: &ChatQueueMap,
    context: &Arc<BotContext>,
    event: BotEvent,
) {
    if !should_process_event(context, &event) {
        return;
    }
    let Some(chat_id) = event.chat_id() else {
        debug!("ignoring callback without originating message");
        return;
    };

    enqueue_event(queues, context, chat_id, event).await;
}

/// Quick check if an event should be processed (DM + allowlist + bot
/// filter). Returns false for events that are silently ignored.
fn should_process_event(context: &BotContext, event: &BotEvent) -> bool {
    if !event.is_private() {
        debug!("ignoring non-DM chat event");
        return false;
    }

    let Some(user) = event.sender() else {
        debug!("ignoring event without sender");
        return false;
    };

    if user.is_bot {
        return false;
    }

    let allowlist = context.allowlist_user_ids();
    if !allowlist.is_empty() && !allowlist.contains(&user.id) {
        warn!(user_id = user.id, "denied non-allowlisted user");
        return false;
    }

    true
}

async fn enqueue_event(
    queues: &ChatQueueMap,
    context: &Arc<BotContext>,
    chat_id: i64,
    event: BotEvent,
) {
    let sender = {
        let mut queues = queues.lock().await;
        if let Some(sender) = queues.get(&chat_id) {
            sender.clone()
        } else {
            let (sender, receiver) = mpsc::unbounded_channel();
            spawn_queue_worker(chat_id, receiver, Arc::clone(context));
            queues.insert(chat_id, sender.clone());
            sender
        }
    };

    if let Err(err) = sender.send(event) {
        // Worker died; respawn it and retry once.
        let event = err.0;
        let (sender, receiver) = mpsc::unbounded_channel();
        spawn_queue_worker(chat_id, receiver, Arc::clone(context));
        {
            let mut queues = queues.lock().await;
            queues.insert(chat_id, sender.clone());
        }
        let _ = sender.send(event);
    }
}

fn spawn_queue_worker(
    chat_id: i64,
    mut receiver: mpsc::UnboundedReceiver<BotEvent>,
    context: Arc<BotContext>,
) {
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            if let Err(err) = handlers::handle_event(context.as_ref(), event).await {
                error!(chat_id, error = %err, "event handling error");
            }
        }
    });
}
