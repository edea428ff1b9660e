//! Conversation state machine — tracks which step of the guided flow the
//! visitor is in.

use serde::{Deserialize, Serialize};

/// The steps of the guided conversation.
///
/// Main path: Initial → ServiceSelection → Validation → Description →
/// ContactCollection → Completed, with FormationChoice, ConfirmContact and
/// AskAnythingElse as branch points. AskAnythingElse loops back to
/// ServiceSelection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Initial,
    ServiceSelection,
    Validation,
    FormationChoice,
    Description,
    ConfirmContact,
    ContactCollection,
    AskAnythingElse,
    Completed,
}

/// What kind of input the UI should offer for a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Free text accepted (and, in ServiceSelection, the catalog is shown).
    FreeText,
    /// Binary yes/no choice only.
    Binary,
    /// Structured contact form replaces the textbox.
    ContactForm,
    /// No input — loading or terminal.
    Disabled,
}

impl ConversationState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: ConversationState) -> bool {
        use ConversationState::*;
        matches!(
            (self, target),
            (Initial, ServiceSelection)
                | (ServiceSelection, Validation)
                | (Validation, FormationChoice)
                | (Validation, Description)
                | (Validation, AskAnythingElse)
                | (Validation, ServiceSelection)
                | (FormationChoice, Description)
                | (FormationChoice, AskAnythingElse)
                | (FormationChoice, Validation)
                | (Description, ConfirmContact)
                | (Description, ContactCollection)
                | (ConfirmContact, ContactCollection)
                | (ConfirmContact, AskAnythingElse)
                | (ContactCollection, Completed)
                | (AskAnythingElse, ServiceSelection)
                | (AskAnythingElse, Completed)
        )
    }

    /// Whether this state is terminal (session is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Input affordance for this state.
    pub fn input_mode(&self) -> InputMode {
        match self {
            Self::ServiceSelection | Self::Description => InputMode::FreeText,
            Self::Validation
            | Self::FormationChoice
            | Self::ConfirmContact
            | Self::AskAnythingElse => InputMode::Binary,
            Self::ContactCollection => InputMode::ContactForm,
            Self::Initial | Self::Completed => InputMode::Disabled,
        }
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::Initial
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Initial => "initial",
            Self::ServiceSelection => "service_selection",
            Self::Validation => "validation",
            Self::FormationChoice => "formation_choice",
            Self::Description => "description",
            Self::ConfirmContact => "confirm_contact",
            Self::ContactCollection => "contact_collection",
            Self::AskAnythingElse => "ask_anything_else",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use ConversationState::*;
        let transitions = [
            (Initial, ServiceSelection),
            (ServiceSelection, Validation),
            (Validation, FormationChoice),
            (Validation, Description),
            (Validation, AskAnythingElse),
            (Validation, ServiceSelection),
            (FormationChoice, Description),
            (FormationChoice, AskAnythingElse),
            (FormationChoice, Validation),
            (Description, ContactCollection),
            (Description, ConfirmContact),
            (ConfirmContact, ContactCollection),
            (ConfirmContact, AskAnythingElse),
            (ContactCollection, Completed),
            (AskAnythingElse, ServiceSelection),
            (AskAnythingElse, Completed),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use ConversationState::*;
        // Skip steps
        assert!(!Initial.can_transition_to(Description));
        assert!(!ServiceSelection.can_transition_to(ContactCollection));
        // Go backward where the flow doesn't loop
        assert!(!ContactCollection.can_transition_to(Description));
        // Terminal
        assert!(!Completed.can_transition_to(ServiceSelection));
        // Self-transition (re-prompts don't transition)
        assert!(!Description.can_transition_to(Description));
    }

    #[test]
    fn only_completed_is_terminal() {
        use ConversationState::*;
        assert!(Completed.is_terminal());
        for state in [
            Initial,
            ServiceSelection,
            Validation,
            FormationChoice,
            Description,
            ConfirmContact,
            ContactCollection,
            AskAnythingElse,
        ] {
            assert!(!state.is_terminal());
        }
    }

    #[test]
    fn input_modes() {
        use ConversationState::*;
        assert_eq!(Description.input_mode(), InputMode::FreeText);
        assert_eq!(ServiceSelection.input_mode(), InputMode::FreeText);
        assert_eq!(Validation.input_mode(), InputMode::Binary);
        assert_eq!(AskAnythingElse.input_mode(), InputMode::Binary);
        assert_eq!(ContactCollection.input_mode(), InputMode::ContactForm);
        assert_eq!(Completed.input_mode(), InputMode::Disabled);
    }

    #[test]
    fn display_matches_serde() {
        use ConversationState::*;
        for state in [
            Initial,
            ServiceSelection,
            Validation,
            FormationChoice,
            Description,
            ConfirmContact,
            ContactCollection,
            AskAnythingElse,
            Completed,
        ] {
            let display = format!("{state}");
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }
}
