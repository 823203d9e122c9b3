use std::fs;

use anyhow::Result;
use tracing::{debug, error, warn};

use aula_core::catalog::Subject;
use aula_core::nav::{self, Action, Screen, Step};
use aula_core::views::{self, ScreenView};

use crate::bot::BotContext;
use crate::telegram::{CallbackQuery, InlineKeyboardMarkup};

pub(crate) async fn handle_callback(context: &BotContext, query: CallbackQuery) -> Result<()> {
    // Acknowledge first so the client drops its spinner even if the
    // render below fails.
    if let Err(err) = context.client().answer_callback_query(&query.id).await {
        warn!(error = %err, "failed to answer callback query");
    }

    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };
    let Some(message) = query.message.as_ref() else {
        debug!("callback without originating message");
        return Ok(());
    };
    let chat_id = message.chat.id;
    let message_id = message.message_id;

    let Some(action) = Action::parse(data) else {
        warn!(chat_id, token = data, "unrecognized action token");
        return Ok(());
    };

    let total_weeks = context.course().total_weeks;
    let step = context
        .sessions()
        .with_session(chat_id, |session| nav::advance(session, &action, total_weeks))
        .await;

    let step = match step {
        Ok(step) => step,
        Err(err) => {
            warn!(chat_id, error = %err, "rejected navigation action");
            return Ok(());
        }
    };

    match step {
        Step::Render(screen) => {
            let view = view_for(context, screen, &action);
            edit_screen(context, chat_id, message_id, &view).await?;
        }
        Step::SendDocument { week, subject } => {
            send_week_document(context, chat_id, message_id, week, subject).await?;
        }
    }

    Ok(())
}

/// Picks the rendered view for a screen. The chat panel's notice depends
/// on which tutor action produced it.
fn view_for(context: &BotContext, screen: Screen, action: &Action) -> ScreenView {
    match (screen, action) {
        (Screen::ChatPanel, Action::TutorPrompt) => views::chat_panel(views::CHAT_PROMPT),
        (Screen::ChatPanel, Action::TutorReset) => views::chat_panel(views::CHAT_CLEARED),
        _ => views::render(
            &screen,
            context.course(),
            context.docs(),
            context.announcements(),
        ),
    }
}

async fn edit_screen(
    context: &BotContext,
    chat_id: i64,
    message_id: i64,
    view: &ScreenView,
) -> Result<()> {
    context
        .client()
        .edit_message_text(
            chat_id,
            message_id,
            &view.text,
            Some(&InlineKeyboardMarkup::from(view)),
        )
        .await
}

/// Resolves and sends the week document, then swaps the tapped screen for
/// a return control. Absence and send failures become user-visible
/// messages; navigation state is unaffected either way.
async fn send_week_document(
    context: &BotContext,
    chat_id: i64,
    message_id: i64,
    week: u32,
    subject: Subject,
) -> Result<()> {
    let client = context.client();

    match context.docs().resolve(week, subject) {
        Some(path) => {
            if let Err(err) = client.send_chat_action(chat_id, "upload_document").await {
                debug!(chat_id, error = %err, "failed to send chat action");
            }

            let caption = views::document_caption(context.course(), week, subject);
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(subject.base_filename())
                .to_string();

            let send_result = match fs::read(&path) {
                Ok(bytes) => client.send_document(chat_id, &filename, bytes, &caption).await,
                Err(err) => Err(err.into()),
            };

            if let Err(err) = send_result {
                error!(chat_id, week, subject = subject.key(), error = %err, "document send failed");
                client
                    .send_message(
                        chat_id,
                        &format!("⚠️ No se pudo enviar el archivo: {err}"),
                        None,
                        None,
                    )
                    .await?;
            }
        }
        None => {
            // Absent material is informative, not an error.
            debug!(chat_id, week, subject = subject.key(), "document absent");
            client
                .send_message(chat_id, &views::document_missing_text(week, subject), None, None)
                .await?;
        }
    }

    edit_screen(context, chat_id, message_id, &views::after_document(week)).await
}
