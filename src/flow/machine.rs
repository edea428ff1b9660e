//! Pure transition logic for the guided conversation.
//!
//! The machine mutates only the session it is handed (state, transcript,
//! lead fields) and reports the assistant replies and side effects the
//! caller must run. It never touches the network or the clock beyond
//! message timestamps, which keeps every transition unit-testable.

use crate::catalog;
use crate::config::{CatalogReturn, FlowConfig};
use crate::session::{ContactInfo, Message, Session};

use super::prompts;
use super::state::ConversationState;

/// A user action fed into the machine.
#[derive(Debug, Clone)]
pub enum FlowEvent {
    /// The visitor picked a service from the catalog.
    SelectService(String),
    /// A binary choice. Meaning depends on the current state (validate,
    /// formation personalized-vs-catalog, confirm contact, anything else).
    Decision(bool),
    /// Free text from the input box.
    FreeText(String),
    /// The structured contact form was submitted.
    SubmitContact(ContactInfo),
}

/// Side effects the engine must run after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Delegate the latest user turn to the reply source.
    ConsultReplySource,
    /// Persist the lead and dispatch the notification.
    SubmitLead,
}

/// Outcome of one applied event.
#[derive(Debug, Default)]
pub struct Step {
    /// Assistant replies to append (after the typing delay).
    pub replies: Vec<String>,
    /// Effects for the engine to run.
    pub effects: Vec<Effect>,
}

impl Step {
    fn reply(text: impl Into<String>) -> Self {
        Self {
            replies: vec![text.into()],
            effects: Vec::new(),
        }
    }

    fn ignored() -> Self {
        Self::default()
    }
}

/// The conversation state machine, parameterized by a flow config.
#[derive(Debug, Clone)]
pub struct FlowMachine {
    config: FlowConfig,
}

impl FlowMachine {
    pub fn new(config: FlowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Open the conversation: greet (via the reply source) and present the
    /// catalog.
    pub fn start(&self, session: &mut Session) -> Step {
        if session.state != ConversationState::Initial {
            return Step::ignored();
        }
        advance(session, ConversationState::ServiceSelection);
        Step {
            replies: Vec::new(),
            effects: vec![Effect::ConsultReplySource],
        }
    }

    /// Apply one event. Invalid input never fails — it re-prompts without a
    /// state change; events that make no sense in the current state are
    /// ignored entirely.
    pub fn apply(&self, session: &mut Session, event: FlowEvent) -> Step {
        use ConversationState::*;

        match (session.state, event) {
            (ServiceSelection, FlowEvent::SelectService(id)) => {
                let Some(service) = catalog::find(&id) else {
                    return Step::ignored();
                };
                session.push(Message::user(service.name));
                session.selected_service = Some(service);
                advance(session, Validation);
                Step::reply(prompts::validation_prompt(service))
            }

            (ServiceSelection, FlowEvent::FreeText(text)) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Step::ignored();
                }
                session.push(Message::user(text));
                Step {
                    replies: Vec::new(),
                    effects: vec![Effect::ConsultReplySource],
                }
            }

            (Validation, FlowEvent::Decision(validated)) => {
                session.push(Message::user(if validated {
                    prompts::ECHO_VALIDATE_YES
                } else {
                    prompts::ECHO_VALIDATE_NO
                }));
                if !validated {
                    advance(session, ServiceSelection);
                    return Step::ignored();
                }
                let Some(service) = session.selected_service else {
                    advance(session, ServiceSelection);
                    return Step::ignored();
                };
                match service.id {
                    "formation" => {
                        advance(session, FormationChoice);
                        Step::reply(prompts::formation_choice_prompt())
                    }
                    "support" => {
                        advance(session, AskAnythingElse);
                        Step::reply(prompts::support_reply(service))
                    }
                    _ => {
                        advance(session, Description);
                        Step::reply(prompts::description_prompt(
                            service,
                            self.config.min_description_chars,
                        ))
                    }
                }
            }

            (FormationChoice, FlowEvent::Decision(personalized)) => {
                session.push(Message::user(if personalized {
                    prompts::ECHO_FORMATION_PERSONALIZED
                } else {
                    prompts::ECHO_FORMATION_CATALOG
                }));
                if personalized {
                    advance(session, Description);
                    return Step::reply(prompts::formation_description_prompt(
                        self.config.min_description_chars,
                    ));
                }
                match self.config.catalog_return {
                    CatalogReturn::AskAnythingElse => {
                        advance(session, AskAnythingElse);
                        Step::reply(prompts::catalog_link_reply())
                    }
                    CatalogReturn::Validation => {
                        advance(session, Validation);
                        let service = session
                            .selected_service
                            .expect("formation choice implies a selected service");
                        Step {
                            replies: vec![
                                prompts::catalog_link_plain(),
                                prompts::validation_prompt(service),
                            ],
                            effects: Vec::new(),
                        }
                    }
                }
            }

            (Description, FlowEvent::FreeText(text)) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Step::ignored();
                }
                session.push(Message::user(text.clone()));
                let min = self.config.min_description_chars;
                if min > 0 && text.chars().count() < min {
                    // Re-prompt, no state change
                    return Step::reply(prompts::too_short_reply(min));
                }
                session.description = Some(text);
                if self.config.confirm_before_contact {
                    advance(session, ConfirmContact);
                    Step::reply(prompts::CONFIRM_CONTACT_PROMPT)
                } else {
                    advance(session, ContactCollection);
                    Step::reply(prompts::CONTACT_INTRO)
                }
            }

            (ConfirmContact, FlowEvent::Decision(wants_contact)) => {
                session.push(Message::user(if wants_contact {
                    prompts::ECHO_CONFIRM_YES
                } else {
                    prompts::ECHO_CONFIRM_NO
                }));
                if wants_contact {
                    advance(session, ContactCollection);
                    Step::reply(prompts::CONTACT_INTRO)
                } else {
                    advance(session, AskAnythingElse);
                    Step::reply(prompts::CONFIRM_CONTACT_DECLINED)
                }
            }

            (ContactCollection, FlowEvent::SubmitContact(contact)) => {
                if !contact.is_complete() {
                    // Empty required field: re-prompt, no state change
                    return Step::reply(prompts::CONTACT_FORM_INCOMPLETE);
                }
                let thank_you =
                    prompts::thank_you_reply(contact.full_name.trim(), contact.phone.trim());
                session.contact = Some(contact);
                advance(session, Completed);
                Step {
                    replies: vec![thank_you],
                    effects: vec![Effect::SubmitLead],
                }
            }

            (AskAnythingElse, FlowEvent::Decision(more)) => {
                session.push(Message::user(if more {
                    prompts::ECHO_MORE_YES
                } else {
                    prompts::ECHO_MORE_NO
                }));
                if more {
                    advance(session, ServiceSelection);
                    Step::ignored()
                } else {
                    advance(session, Completed);
                    Step::reply(prompts::CLOSING)
                }
            }

            // Anything else (free text while buttons are shown, a selection
            // outside the catalog step, input after Completed) has no
            // state-advancing effect.
            _ => Step::ignored(),
        }
    }
}

fn advance(session: &mut Session, next: ConversationState) {
    debug_assert!(
        session.state.can_transition_to(next),
        "invalid transition {} -> {}",
        session.state,
        next
    );
    session.state = next;
}
