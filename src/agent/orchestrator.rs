use crate::agent::prompt::validate_prompt;
use crate::agent::quota::QuotaGate;
use crate::errors::BotError;
use crate::providers::base::ChatBackend;
use crate::session::{Session, SessionStore};
use crate::utils::media::classify;
use crate::utils::truncate_for_log;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

/// Façade the chat-platform adapter talks to. Validates quota and prompt,
/// finds or lazily creates the user's session, dispatches to the backend, and
/// keeps the session metadata and quota counter in step.
///
/// Quota, session store and backend are owned here; the platform glue never
/// touches them directly.
pub struct Orchestrator {
    backend: Arc<dyn ChatBackend>,
    store: Arc<SessionStore>,
    quota: Arc<QuotaGate>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn ChatBackend>, store: Arc<SessionStore>, quota: Arc<QuotaGate>) -> Self {
        Self {
            backend,
            store,
            quota,
        }
    }

    /// Send a chat-text prompt within the user's conversation, creating the
    /// conversation on first contact.
    pub async fn send_text(&self, user_id: &str, prompt: &str) -> Result<String, BotError> {
        self.quota.check()?;
        validate_prompt(prompt)?;

        let session = match self.store.get(user_id).await {
            Some(session) => session,
            None => {
                self.store
                    .create_if_absent(user_id, self.backend.start_conversation())
                    .await
            }
        };

        // Holding the history lock across the call serializes requests for
        // this user without blocking anyone else's.
        let reply = {
            let mut history = session.history.lock().await;
            match self.backend.send(&mut history, prompt).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!(user_id, error = %e, "backend chat dispatch failed");
                    return Err(BotError::Backend(e.to_string()));
                }
            }
        };

        self.store.touch(user_id, Utc::now()).await;
        self.quota.record();
        info!(
            user_id,
            prompt = %truncate_for_log(prompt, 80),
            reply_len = reply.len(),
            requests_used = self.quota.used(),
            "chat message dispatched"
        );
        Ok(reply)
    }

    /// Single-shot generation from an attachment plus a prompt. Stateless:
    /// no session is read, created or touched, and the attachment's bytes
    /// are released when this function returns, success or failure.
    pub async fn send_with_attachment(
        &self,
        user_id: &str,
        prompt: &str,
        file_name: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<String, BotError> {
        self.quota.check()?;
        validate_prompt(prompt)?;

        let attachment = classify(file_name, content_type, content)?;

        let result = self.backend.generate_once(&attachment, prompt).await;
        drop(attachment);

        match result {
            Ok(reply) => {
                self.quota.record();
                info!(
                    user_id,
                    file_name,
                    content_type,
                    reply_len = reply.len(),
                    "attachment prompt dispatched"
                );
                Ok(reply)
            }
            Err(e) => {
                error!(user_id, file_name, error = %e, "backend generation failed");
                Err(BotError::Backend(e.to_string()))
            }
        }
    }

    /// Drop a single user's conversation (owner command or member departure).
    pub async fn remove_session(&self, user_id: &str) -> Option<Session> {
        self.store.remove(user_id).await
    }

    /// Drop every conversation; returns how many were erased.
    pub async fn remove_all_sessions(&self) -> usize {
        self.store.remove_all().await
    }

    /// Swap the backend model. Authorization is the caller's responsibility.
    pub fn set_backend_model(&self, model: String) {
        info!(model = %model, "backend model changed");
        self.backend.set_model(model);
    }

    pub fn model_name(&self) -> String {
        self.backend.model_name()
    }

    pub fn requests_used(&self) -> u32 {
        self.quota.used()
    }

    pub async fn session_count(&self) -> usize {
        self.store.len().await
    }
}
