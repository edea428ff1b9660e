//! Configuration types.
//!
//! The three production variants of the widget differed only in wording,
//! delays, and a few transition tweaks, so they collapse here into one
//! `FlowConfig` with named presets instead of three parallel state machines.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Where the "see the public catalog" branch of the formation choice lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogReturn {
    /// Emit the link, then ask whether anything else is needed.
    AskAnythingElse,
    /// Emit the link, then re-offer validation of the selected service.
    Validation,
}

/// Tunable parameters of the conversation flow.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Minimum description length in characters. Zero disables the check.
    pub min_description_chars: usize,
    /// Insert a yes/no gate between description and the contact form.
    pub confirm_before_contact: bool,
    /// Target state after the visitor picks the public training catalog.
    pub catalog_return: CatalogReturn,
    /// Artificial typing delay before each assistant message. UX pacing
    /// only — no semantic effect.
    pub typing_delay: Duration,
}

impl FlowConfig {
    /// The original flow: 50-char description minimum, no confirm gate.
    pub fn classic() -> Self {
        Self {
            min_description_chars: 50,
            confirm_before_contact: false,
            catalog_return: CatalogReturn::AskAnythingElse,
            typing_delay: Duration::from_secs(4),
        }
    }

    /// Faster pacing and a softer 15-char minimum.
    pub fn express() -> Self {
        Self {
            min_description_chars: 15,
            confirm_before_contact: false,
            catalog_return: CatalogReturn::AskAnythingElse,
            typing_delay: Duration::from_millis(1500),
        }
    }

    /// Unconstrained description, confirm gate on, catalog branch re-offers
    /// validation.
    pub fn concierge() -> Self {
        Self {
            min_description_chars: 0,
            confirm_before_contact: true,
            catalog_return: CatalogReturn::Validation,
            typing_delay: Duration::from_secs(2),
        }
    }

    /// Zero delays, for tests.
    #[doc(hidden)]
    pub fn instant(mut self) -> Self {
        self.typing_delay = Duration::ZERO;
        self
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self::classic()
    }
}

/// Which reply source backs free-text turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyBackend {
    Gemini,
    OpenAi,
    /// Keyword intent matcher, no hosted model.
    Local,
}

/// Application configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub db_path: String,
    pub reply_backend: ReplyBackend,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub flow: FlowConfig,
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// - `RUBY_CHAT_PORT` (default 8080)
    /// - `RUBY_CHAT_DB_PATH` (default `./data/ruby-chat.db`)
    /// - `RUBY_CHAT_REPLY_BACKEND` — `gemini` | `openai` | `local`
    /// - `GEMINI_API_KEY` / `OPENAI_API_KEY` depending on backend
    /// - `RUBY_CHAT_MODEL` (default `gemini-2.0-flash`)
    /// - `RUBY_CHAT_FLOW` — `classic` | `express` | `concierge`
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = std::env::var("RUBY_CHAT_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let db_path = std::env::var("RUBY_CHAT_DB_PATH")
            .unwrap_or_else(|_| "./data/ruby-chat.db".to_string());

        let backend_raw = std::env::var("RUBY_CHAT_REPLY_BACKEND")
            .unwrap_or_else(|_| "gemini".to_string());
        let reply_backend = match backend_raw.as_str() {
            "gemini" => ReplyBackend::Gemini,
            "openai" => ReplyBackend::OpenAi,
            "local" => ReplyBackend::Local,
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "RUBY_CHAT_REPLY_BACKEND".to_string(),
                    message: format!("unknown backend '{other}'"),
                });
            }
        };

        let api_key = match reply_backend {
            ReplyBackend::Gemini => Some(
                std::env::var("GEMINI_API_KEY")
                    .map(SecretString::from)
                    .map_err(|_| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?,
            ),
            ReplyBackend::OpenAi => Some(
                std::env::var("OPENAI_API_KEY")
                    .map(SecretString::from)
                    .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?,
            ),
            ReplyBackend::Local => None,
        };

        let model = std::env::var("RUBY_CHAT_MODEL")
            .unwrap_or_else(|_| "gemini-2.0-flash".to_string());

        let flow_raw = std::env::var("RUBY_CHAT_FLOW").unwrap_or_else(|_| "classic".to_string());
        let flow = match flow_raw.as_str() {
            "classic" => FlowConfig::classic(),
            "express" => FlowConfig::express(),
            "concierge" => FlowConfig::concierge(),
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "RUBY_CHAT_FLOW".to_string(),
                    message: format!("unknown flow preset '{other}'"),
                });
            }
        };

        Ok(Self {
            port,
            db_path,
            reply_backend,
            api_key,
            model,
            flow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_where_the_variants_did() {
        let classic = FlowConfig::classic();
        let express = FlowConfig::express();
        let concierge = FlowConfig::concierge();

        assert_eq!(classic.min_description_chars, 50);
        assert_eq!(express.min_description_chars, 15);
        assert_eq!(concierge.min_description_chars, 0);

        assert!(!classic.confirm_before_contact);
        assert!(concierge.confirm_before_contact);

        assert_eq!(classic.catalog_return, CatalogReturn::AskAnythingElse);
        assert_eq!(concierge.catalog_return, CatalogReturn::Validation);
    }

    #[test]
    fn default_is_classic() {
        let config = FlowConfig::default();
        assert_eq!(config.min_description_chars, 50);
        assert_eq!(config.typing_delay, Duration::from_secs(4));
    }
}
