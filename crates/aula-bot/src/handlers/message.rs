use anyhow::Result;
use tracing::{debug, error};

use aula_core::dialogue;
use aula_core::session::Mode;
use aula_core::views;

use crate::bot::BotContext;
use crate::commands::{self, BotCommand};
use crate::telegram::{InlineKeyboardMarkup, Message};

pub(crate) async fn handle_message(context: &BotContext, message: Message) -> Result<()> {
    let chat_id = message.chat.id;
    let Some(text) = message.text.as_deref() else {
        debug!(chat_id, "ignoring non-text message");
        return Ok(());
    };

    if let Some(command) = commands::parse_command(text) {
        // Commands always land back in browsing mode.
        context
            .sessions()
            .with_session(chat_id, |session| session.mode = Mode::Browsing)
            .await;

        let view = match command {
            BotCommand::Start => views::welcome(),
            BotCommand::Menu => views::main_menu(),
        };
        return context
            .client()
            .send_message(
                chat_id,
                &view.text,
                None,
                Some(&InlineKeyboardMarkup::from(&view)),
            )
            .await;
    }

    let mode = context
        .sessions()
        .with_session(chat_id, |session| session.mode)
        .await;

    match mode {
        Mode::Browsing => {
            // Typed text never enters the tutor implicitly; nudge back to
            // the menu instead.
            let view = views::main_menu();
            context
                .client()
                .send_message(
                    chat_id,
                    "Usa el menú para navegar, o entra al Tutor Virtual para hacer preguntas:",
                    Some(message.message_id),
                    Some(&InlineKeyboardMarkup::from(&view)),
                )
                .await
        }
        Mode::Tutor => tutor_turn(context, chat_id, message.message_id, text).await,
    }
}

async fn tutor_turn(
    context: &BotContext,
    chat_id: i64,
    message_id: i64,
    text: &str,
) -> Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }

    if let Err(err) = context.client().send_chat_action(chat_id, "typing").await {
        debug!(chat_id, error = %err, "failed to send typing action");
    }

    let result = dialogue::run_turn(
        context.sessions(),
        chat_id,
        context.completion(),
        context.tutor_system_prompt(),
        text,
        context.limits(),
    )
    .await;

    match result {
        Ok(Some(reply)) => {
            context
                .client()
                .send_message(chat_id, &reply, Some(message_id), None)
                .await
        }
        Ok(None) => Ok(()),
        Err(err) => {
            error!(chat_id, kind = %err.kind, error = %err, "completion failed");
            // History is untouched; the user can retry the same question.
            context
                .client()
                .send_message(
                    chat_id,
                    &format!("⚠️ El tutor no está disponible ahora ({err}). Intenta de nuevo."),
                    Some(message_id),
                    None,
                )
                .await
        }
    }
}
