use std::collections::HashSet;

use aula_core::announcements::AnnouncementStore;
use aula_core::config::CourseConfig;
use aula_core::dialogue::DialogueLimits;
use aula_core::docs::DocumentStore;
use aula_core::providers::anthropic::CompletionClient;
use aula_core::session::SessionStore;

use crate::telegram::TelegramClient;

pub(crate) struct BotContext {
    client: TelegramClient,
    course: CourseConfig,
    docs: DocumentStore,
    announcements: AnnouncementStore,
    completion: CompletionClient,
    sessions: SessionStore,
    limits: DialogueLimits,
    tutor_system_prompt: String,
    allowlist_user_ids: HashSet<i64>,
}

impl BotContext {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        client: TelegramClient,
        course: CourseConfig,
        docs: DocumentStore,
        announcements: AnnouncementStore,
        completion: CompletionClient,
        sessions: SessionStore,
        limits: DialogueLimits,
        tutor_system_prompt: String,
        allowlist_user_ids: HashSet<i64>,
    ) -> Self {
        Self {
            client,
            course,
            docs,
            announcements,
            completion,
            sessions,
            limits,
            tutor_system_prompt,
            allowlist_user_ids,
        }
    }

    pub(crate) fn client(&self) -> &TelegramClient {
        &self.client
    }

    pub(crate) fn course(&self) -> &CourseConfig {
        &self.course
    }

    pub(crate) fn docs(&self) -> &DocumentStore {
        &self.docs
    }

    pub(crate) fn announcements(&self) -> &AnnouncementStore {
        &self.announcements
    }

    pub(crate) fn completion(&self) -> &CompletionClient {
        &self.completion
    }

    pub(crate) fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub(crate) fn limits(&self) -> DialogueLimits {
        self.limits
    }

    pub(crate) fn tutor_system_prompt(&self) -> &str {
        &self.tutor_system_prompt
    }

    pub(crate) fn allowlist_user_ids(&self) -> &HashSet<i64> {
        &self.allowlist_user_ids
    }
}
