//! Reply sources for free-text turns.
//!
//! Two interchangeable backends behind one trait:
//! - **Hosted model** (Gemini or OpenAI) via rig-core, carrying the widget's
//!   French persona prompt and a real-time context block.
//! - **Local matcher** — the keyword intent table, no network at all.
//!
//! Both are fallible; callers substitute [`APOLOGY`] on failure so the
//! visitor-facing flow never sees an error.

use std::sync::Arc;

use async_trait::async_trait;
use rig::client::CompletionClient;
use secrecy::{ExposeSecret, SecretString};

use crate::catalog::COMPANY_NAME;
use crate::config::ReplyBackend;
use crate::error::ReplyError;
use crate::intent::IntentMatcher;
use crate::session::{Author, Message};

/// Canned apology substituted when the reply source fails.
pub const APOLOGY: &str =
    "Je rencontre une légère perturbation technique. Veuillez m'excuser et réessayer dans un instant.";

/// Trailing window of transcript messages handed to the model.
pub const HISTORY_WINDOW: usize = 10;

/// The widget persona and formatting rules.
const SYSTEM_PROMPT_BASE: &str = r#"
Identité: Tu es Ruby, l'assistant robotisé intelligent de Nomade Technology.
Langue: Français.

CONSIGNES SPÉCIFIQUES:
- Si un utilisateur demande "où est Oumar" ou pose une question sur Oumar Tidiane, réponds exactement ceci: "Mon administrateur Oumar Tidiane est indisponible pour le moment mais vous pouvez le joindre sur le numéro : +221777867118."

RÈGLES DE FORMATAGE:
- NE JAMAIS UTILISER D'ASTÉRISQUES (* ou **) POUR LE GRAS.
- Utilise uniquement des sauts de ligne pour aérer le texte.
- Utilise des tirets (-) pour les listes.
- Ton ton doit être technologique, poli et efficace.

MESSAGE D'ACCUEIL:
Salue l'utilisateur. Présente-toi comme l'IA de Nomade Technology. Liste brièvement nos expertises : Chatbots IA, E-commerce, Formations, Coaching et Web.
"#;

fn build_system_prompt(local_time: &str, service: Option<&str>) -> String {
    let mut prompt = format!(
        "{SYSTEM_PROMPT_BASE}\nCONTEXTE EN TEMPS RÉEL:\n- Entreprise: {COMPANY_NAME}\n- Heure locale du client: {local_time}\n"
    );
    if let Some(service) = service {
        prompt.push_str(&format!("- Service sélectionné: {service}\n"));
    }
    prompt
}

/// A source of assistant replies for free-text turns.
#[async_trait]
pub trait ReplySource: Send + Sync {
    /// Produce a reply from the recent history, the visitor's local time
    /// string, and the selected service name (if any).
    async fn reply(
        &self,
        history: &[Message],
        local_time: &str,
        service: Option<&str>,
    ) -> Result<String, ReplyError>;
}

// ── Hosted model ────────────────────────────────────────────────────

/// Reply source backed by a rig-core completion model.
pub struct ModelReplySource<M> {
    model: M,
    provider: &'static str,
}

impl<M> ModelReplySource<M> {
    pub fn new(model: M, provider: &'static str) -> Self {
        Self { model, provider }
    }
}

#[async_trait]
impl<M> ReplySource for ModelReplySource<M>
where
    M: rig::completion::CompletionModel + Clone + Send + Sync + 'static,
{
    async fn reply(
        &self,
        history: &[Message],
        local_time: &str,
        service: Option<&str>,
    ) -> Result<String, ReplyError> {
        use rig::completion::Chat;

        let system = build_system_prompt(local_time, service);
        let agent = rig::agent::AgentBuilder::new(self.model.clone())
            .preamble(&system)
            .build();

        let window = &history[history.len().saturating_sub(HISTORY_WINDOW)..];

        // The last user message is the prompt; everything before it is history.
        let last_user = window.iter().rposition(|m| m.author == Author::User);
        let (prompt, prior) = match last_user {
            Some(idx) => (window[idx].text.clone(), &window[..idx]),
            // Opening greeting: the model speaks first
            None => ("Bonjour".to_string(), &window[..0]),
        };

        let chat_history: Vec<rig::completion::Message> = prior
            .iter()
            .map(|m| match m.author {
                Author::User => rig::completion::Message::user(&m.text),
                Author::Assistant => rig::completion::Message::assistant(&m.text),
            })
            .collect();

        let text = agent.chat(prompt.as_str(), chat_history).await.map_err(|e| {
            ReplyError::RequestFailed {
                provider: self.provider.to_string(),
                reason: e.to_string(),
            }
        })?;

        // The persona forbids markdown bold; strip any that slips through.
        Ok(text.replace(['*', '_'], ""))
    }
}

// ── Local matcher ───────────────────────────────────────────────────

/// Reply source backed by the keyword intent matcher. Deterministic and
/// offline — the local-engine variant of the widget.
pub struct LocalReplySource {
    matcher: IntentMatcher,
}

impl LocalReplySource {
    pub fn new(matcher: IntentMatcher) -> Self {
        Self { matcher }
    }
}

#[async_trait]
impl ReplySource for LocalReplySource {
    async fn reply(
        &self,
        history: &[Message],
        _local_time: &str,
        _service: Option<&str>,
    ) -> Result<String, ReplyError> {
        let query = history
            .iter()
            .rev()
            .find(|m| m.author == Author::User)
            .map(|m| m.text.as_str())
            .unwrap_or("bonjour");
        Ok(self.matcher.respond(query))
    }
}

// ── Factory ─────────────────────────────────────────────────────────

/// Create a reply source from configuration.
pub fn create_reply_source(
    backend: ReplyBackend,
    api_key: Option<&SecretString>,
    model: &str,
) -> Result<Arc<dyn ReplySource>, ReplyError> {
    match backend {
        ReplyBackend::Gemini => create_gemini(require_key(api_key, "gemini")?, model),
        ReplyBackend::OpenAi => create_openai(require_key(api_key, "openai")?, model),
        ReplyBackend::Local => {
            tracing::info!("Using local intent matcher (no hosted model)");
            Ok(Arc::new(LocalReplySource::new(IntentMatcher::new())))
        }
    }
}

fn require_key<'a>(
    api_key: Option<&'a SecretString>,
    provider: &str,
) -> Result<&'a SecretString, ReplyError> {
    api_key.ok_or_else(|| ReplyError::RequestFailed {
        provider: provider.to_string(),
        reason: "missing API key".to_string(),
    })
}

fn create_gemini(
    api_key: &SecretString,
    model_name: &str,
) -> Result<Arc<dyn ReplySource>, ReplyError> {
    use rig::providers::gemini;

    let client: rig::client::Client<gemini::client::GeminiExt> =
        gemini::Client::new(api_key.expose_secret()).map_err(|e| ReplyError::RequestFailed {
            provider: "gemini".to_string(),
            reason: format!("Failed to create Gemini client: {}", e),
        })?;

    let model = client.completion_model(model_name);
    tracing::info!("Using Gemini (model: {})", model_name);
    Ok(Arc::new(ModelReplySource::new(model, "gemini")))
}

fn create_openai(
    api_key: &SecretString,
    model_name: &str,
) -> Result<Arc<dyn ReplySource>, ReplyError> {
    use rig::providers::openai;

    let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
        openai::Client::new(api_key.expose_secret()).map_err(|e| ReplyError::RequestFailed {
            provider: "openai".to_string(),
            reason: format!("Failed to create OpenAI client: {}", e),
        })?;

    let model = client.completion_model(model_name);
    tracing::info!("Using OpenAI (model: {})", model_name);
    Ok(Arc::new(ModelReplySource::new(model, "openai")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_carries_real_time_context() {
        let prompt = build_system_prompt("14:32", Some("🤝 Coaching"));
        assert!(prompt.contains("Ruby"));
        assert!(prompt.contains("14:32"));
        assert!(prompt.contains("Coaching"));

        let without_service = build_system_prompt("09:00", None);
        assert!(!without_service.contains("Service sélectionné"));
    }

    #[tokio::test]
    async fn local_source_answers_the_latest_user_message() {
        let source = LocalReplySource::new(IntentMatcher::new());
        let history = vec![
            Message::assistant("Bonjour !"),
            Message::user("Quel est le prix ?"),
        ];
        let reply = source.reply(&history, "10:00", None).await.unwrap();
        assert!(reply.contains("devis"));
    }

    #[tokio::test]
    async fn local_source_greets_on_empty_history() {
        let source = LocalReplySource::new(IntentMatcher::new());
        let reply = source.reply(&[], "10:00", None).await.unwrap();
        assert!(reply.contains("Ruby"));
    }

    #[test]
    fn create_local_source() {
        let source = create_reply_source(ReplyBackend::Local, None, "unused");
        assert!(source.is_ok());
    }

    #[test]
    fn model_backends_require_a_key() {
        let err = create_reply_source(ReplyBackend::Gemini, None, "gemini-2.0-flash");
        assert!(err.is_err());
    }
}
