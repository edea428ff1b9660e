//! Session engine — binds one session to the flow machine, the reply
//! source, the store, and the notifier.
//!
//! Single logical thread of control per session: every operation runs to
//! completion before the next is accepted, and a `busy` flag drops input
//! that arrives while an external call or typing delay is outstanding.
//! At most one external operation is ever in flight for a session.

use std::sync::Arc;

use crate::config::FlowConfig;
use crate::flow::{ConversationState, Effect, FlowEvent, FlowMachine, Step};
use crate::notify::{LeadNotification, Notifier};
use crate::reply::{APOLOGY, HISTORY_WINDOW, ReplySource};
use crate::session::{Author, ContactInfo, Message, Session};
use crate::store::Database;

/// External collaborators of a session.
#[derive(Clone)]
pub struct EngineDeps {
    /// Message/lead persistence. `None` disables persistence entirely.
    pub store: Option<Arc<dyn Database>>,
    /// Free-text reply source (hosted model or local matcher).
    pub reply: Arc<dyn ReplySource>,
    /// Lead notification dispatch. `None` disables notifications.
    pub notifier: Option<Arc<dyn Notifier>>,
}

/// Drives one visitor session through the guided flow.
pub struct SessionEngine {
    session: Session,
    machine: FlowMachine,
    deps: EngineDeps,
    busy: bool,
}

impl SessionEngine {
    pub fn new(config: FlowConfig, deps: EngineDeps) -> Self {
        Self {
            session: Session::new(),
            machine: FlowMachine::new(config),
            deps,
            busy: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Open the conversation: greeting, then the catalog.
    pub async fn start(&mut self) {
        if self.session.state != ConversationState::Initial {
            return;
        }
        let step = self.machine.start(&mut self.session);
        self.run_step(step, crate::flow::prompts::FALLBACK_GREETING)
            .await;
    }

    pub async fn send_text(&mut self, text: &str) {
        self.handle(FlowEvent::FreeText(text.to_string())).await;
    }

    pub async fn select_service(&mut self, service_id: &str) {
        self.handle(FlowEvent::SelectService(service_id.to_string()))
            .await;
    }

    pub async fn decide(&mut self, yes: bool) {
        self.handle(FlowEvent::Decision(yes)).await;
    }

    pub async fn submit_contact(&mut self, contact: ContactInfo) {
        self.handle(FlowEvent::SubmitContact(contact)).await;
    }

    async fn handle(&mut self, event: FlowEvent) {
        if self.busy {
            tracing::debug!(session = %self.session.id, "Input dropped while busy");
            return;
        }
        self.busy = true;

        let before = self.session.transcript().len();
        let step = self.machine.apply(&mut self.session, event);

        // Persist any user echoes the machine appended
        let echoes: Vec<String> = self.session.transcript()[before..]
            .iter()
            .filter(|m| m.author == Author::User)
            .map(|m| m.text.clone())
            .collect();
        for text in echoes {
            self.persist_message("user", &text).await;
        }

        self.run_step(step, APOLOGY).await;
        self.busy = false;
    }

    /// Run effects, then append the assistant replies (after the typing
    /// delay).
    async fn run_step(&mut self, step: Step, consult_fallback: &str) {
        for effect in &step.effects {
            match effect {
                Effect::ConsultReplySource => {
                    let reply = self.consult(consult_fallback).await;
                    self.push_assistant(&reply).await;
                }
                Effect::SubmitLead => self.submit_lead().await,
            }
        }
        for reply in &step.replies {
            self.push_assistant(reply).await;
        }
    }

    /// Ask the reply source, substituting the fallback on failure.
    async fn consult(&self, fallback: &str) -> String {
        let local_time = chrono::Local::now().format("%H:%M").to_string();
        let service = self.session.selected_service.map(|s| s.name);
        match self
            .deps
            .reply
            .reply(
                self.session.recent_messages(HISTORY_WINDOW),
                &local_time,
                service,
            )
            .await
        {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => fallback.to_string(),
            Err(e) => {
                tracing::warn!(session = %self.session.id, error = %e, "Reply source failed");
                fallback.to_string()
            }
        }
    }

    /// Exactly one persistence call and one notification per submitted lead.
    /// Both failures are logged and swallowed.
    async fn submit_lead(&self) {
        let Some(contact) = self.session.contact.clone() else {
            tracing::warn!(session = %self.session.id, "Lead submit without contact info");
            return;
        };
        let service = self
            .session
            .selected_service
            .map(|s| s.name)
            .unwrap_or("Inconnu");
        let description = self.session.description.as_deref().unwrap_or_default();

        if let Some(store) = &self.deps.store {
            if let Err(e) = store
                .save_lead(&self.session.id, &contact, service, description)
                .await
            {
                tracing::warn!(session = %self.session.id, error = %e, "Failed to persist lead");
            }
        }

        if let Some(notifier) = &self.deps.notifier {
            let notification = LeadNotification::for_lead(&contact, service, description);
            if let Err(e) = notifier.send(&notification).await {
                tracing::warn!(session = %self.session.id, error = %e, "Failed to send lead notification");
            }
        }
    }

    async fn push_assistant(&mut self, text: &str) {
        // Cooperative typing pause; UX pacing only
        let delay = self.machine.config().typing_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.session.push(Message::assistant(text));
        self.persist_message("assistant", text).await;
    }

    async fn persist_message(&self, role: &str, content: &str) {
        if let Some(store) = &self.deps.store {
            if let Err(e) = store.save_message(&self.session.id, role, content).await {
                tracing::warn!(session = %self.session.id, error = %e, "Failed to persist message");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReplyError;
    use async_trait::async_trait;

    struct CannedReply(&'static str);

    #[async_trait]
    impl ReplySource for CannedReply {
        async fn reply(
            &self,
            _history: &[Message],
            _local_time: &str,
            _service: Option<&str>,
        ) -> Result<String, ReplyError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingReply;

    #[async_trait]
    impl ReplySource for FailingReply {
        async fn reply(
            &self,
            _history: &[Message],
            _local_time: &str,
            _service: Option<&str>,
        ) -> Result<String, ReplyError> {
            Err(ReplyError::RequestFailed {
                provider: "test".into(),
                reason: "down".into(),
            })
        }
    }

    fn engine(reply: Arc<dyn ReplySource>) -> SessionEngine {
        SessionEngine::new(
            FlowConfig::classic().instant(),
            EngineDeps {
                store: None,
                reply,
                notifier: None,
            },
        )
    }

    #[tokio::test]
    async fn start_greets_and_opens_the_catalog() {
        let mut e = engine(Arc::new(CannedReply("Bonjour, je suis Ruby.")));
        e.start().await;

        assert_eq!(e.session().state, ConversationState::ServiceSelection);
        let transcript = e.session().transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].author, Author::Assistant);
        assert_eq!(transcript[0].text, "Bonjour, je suis Ruby.");
    }

    #[tokio::test]
    async fn failed_greeting_substitutes_the_fallback() {
        let mut e = engine(Arc::new(FailingReply));
        e.start().await;

        let transcript = e.session().transcript();
        assert!(transcript[0].text.contains("Ruby"));
    }

    #[tokio::test]
    async fn free_text_failure_substitutes_the_apology() {
        let mut e = engine(Arc::new(FailingReply));
        e.start().await;
        e.send_text("Une question libre ?").await;

        let last = e.session().transcript().last().unwrap();
        assert_eq!(last.text, APOLOGY);
        assert_eq!(e.session().state, ConversationState::ServiceSelection);
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let mut e = engine(Arc::new(CannedReply("Bonjour !")));
        e.start().await;
        e.start().await;
        assert_eq!(e.session().transcript().len(), 1);
    }
}
