use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use aula_core::announcements::AnnouncementStore;
use aula_core::config::Config;
use aula_core::dialogue::DialogueLimits;
use aula_core::docs::DocumentStore;
use aula_core::providers::anthropic::{CompletionClient, CompletionConfig};
use aula_core::session::SessionStore;

use crate::bot::{BotContext, BotEvent, dispatch_event, new_chat_queues};
use crate::telegram::{TelegramClient, TelegramSettings};

mod bot;
mod commands;
mod handlers;
mod telegram;

const TUTOR_SYSTEM_PROMPT: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/prompts/tutor_system_prompt.md"
));

pub async fn run() -> Result<()> {
    init_tracing();

    let config = Config::load().context("Failed to load aula config")?;
    config.validate()?;
    let settings = TelegramSettings::from_config(&config)?;
    let completion = CompletionClient::new(CompletionConfig::from_config(&config)?);

    let system_prompt = config
        .tutor
        .system_prompt
        .as_deref()
        .map(str::trim)
        .filter(|prompt| !prompt.is_empty())
        .unwrap_or_else(|| TUTOR_SYSTEM_PROMPT.trim())
        .to_string();

    info!(
        model = %config.tutor.model,
        total_weeks = config.course.total_weeks,
        allowlist_users = settings.allowlist_user_ids.len(),
        "starting aula-bot"
    );

    let client = TelegramClient::new(settings.bot_token.clone());
    let context = Arc::new(BotContext::new(
        client.clone(),
        config.course.clone(),
        DocumentStore::from_config(&config.course),
        AnnouncementStore::new(config.course.announcements_path.clone()),
        completion,
        SessionStore::new(),
        DialogueLimits {
            window: config.tutor.window,
            retention: config.tutor.retention,
        },
        system_prompt,
        settings.allowlist_user_ids,
    ));
    let chat_queues = new_chat_queues();

    let mut offset: Option<i64> = None;
    let poll_timeout = Duration::from_secs(30);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("aula-bot started, polling for updates");

    loop {
        let current_offset = offset;
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutting down");
                break;
            }
            updates = client.get_updates(current_offset, poll_timeout) => {
                let updates = match updates {
                    Ok(updates) => updates,
                    Err(err) => {
                        warn!(error = %err, "Telegram polling error");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                };

                for update in updates {
                    offset = Some(update.update_id + 1);
                    if let Some(message) = update.message {
                        dispatch_event(&chat_queues, &context, BotEvent::Message(message)).await;
                    }
                    if let Some(query) = update.callback_query {
                        dispatch_event(&chat_queues, &context, BotEvent::Callback(query)).await;
                    }
                }
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
