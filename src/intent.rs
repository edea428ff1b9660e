//! Local intent matcher — keyword-scored canned responses.
//!
//! Used by the local-engine variant instead of a hosted-model call. The
//! table is scanned in declaration order; each intent scores one point per
//! keyword contained in the lower-cased query and competes on
//! `score + priority`. Ties go to the first-declared intent.

use crate::catalog::{CONTACT_PHONE, SITE_URL};

/// A canned response, literal or branching on the query.
pub enum Response {
    Text(&'static str),
    Dynamic(fn(&str) -> String),
}

/// One keyword-triggered rule.
pub struct Intent {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub priority: i32,
    pub response: Response,
}

/// Reply when nothing matched but the visitor clearly typed a question.
const HANDOFF: &str = "Je ne suis pas certaine de pouvoir répondre précisément à cette demande. Je vous mets en relation avec un conseiller : vous pouvez nous joindre au +221777867118.";

/// Reply for very short unmatched input.
const CLARIFY: &str = "Pourriez-vous préciser votre demande ? Vous pouvez aussi sélectionner un service dans la liste ci-dessus.";

/// Queries longer than this fall back to the human handoff instead of a
/// clarification request.
const HANDOFF_MIN_CHARS: usize = 12;

fn pricing_response(query: &str) -> String {
    if query.contains("formation") {
        format!(
            "Nos formations en ligne démarrent à des tarifs accessibles et tout le catalogue est consultable sur {SITE_URL}. Pour un accompagnement personnalisé, le tarif dépend de vos objectifs — décrivez-nous votre besoin et nous vous enverrons un devis."
        )
    } else {
        "Chaque projet est chiffré sur mesure après une courte description de votre besoin. Sélectionnez le service qui vous intéresse et nous vous préparerons un devis gratuit.".to_string()
    }
}

fn default_intents() -> Vec<Intent> {
    vec![
        Intent {
            name: "admin_contact",
            keywords: &["oumar", "administrateur", "admin", "responsable"],
            priority: 3,
            response: Response::Dynamic(|_| {
                format!(
                    "Mon administrateur Oumar Tidiane est indisponible pour le moment mais vous pouvez le joindre sur le numéro : {CONTACT_PHONE}."
                )
            }),
        },
        Intent {
            name: "pricing",
            keywords: &["prix", "tarif", "coût", "cout", "combien", "devis"],
            priority: 2,
            response: Response::Dynamic(pricing_response),
        },
        Intent {
            name: "human",
            keywords: &["humain", "conseiller", "personne", "parler à quelqu'un"],
            priority: 2,
            response: Response::Text(
                "Bien sûr ! Un membre de l'équipe Nomade Technology peut vous rappeler : laissez vos coordonnées via le formulaire, ou appelez le +221777867118.",
            ),
        },
        Intent {
            name: "greeting",
            keywords: &["bonjour", "salut", "bonsoir", "hello", "coucou"],
            priority: 1,
            response: Response::Text(
                "Bonjour ! Je suis Ruby, l'assistante de Nomade Technology. Nos expertises : Chatbots IA, E-commerce, Formations, Coaching et Développement web. Sélectionnez un service pour commencer.",
            ),
        },
        Intent {
            name: "services",
            keywords: &["service", "offre", "proposez", "faites-vous", "expertise"],
            priority: 1,
            response: Response::Text(
                "Nous proposons : conception de chatbots IA, boutiques e-commerce, formations en ligne, coaching et développement web. Choisissez un service dans la liste pour en savoir plus.",
            ),
        },
        Intent {
            name: "thanks",
            keywords: &["merci", "parfait", "super"],
            priority: 0,
            response: Response::Text(
                "Avec plaisir ! N'hésitez pas si vous avez une autre question.",
            ),
        },
    ]
}

/// Deterministic, stateless keyword matcher.
pub struct IntentMatcher {
    intents: Vec<Intent>,
}

impl IntentMatcher {
    pub fn new() -> Self {
        Self {
            intents: default_intents(),
        }
    }

    /// Custom table, first-declared wins ties.
    pub fn with_intents(intents: Vec<Intent>) -> Self {
        Self { intents }
    }

    /// Produce a response for the latest user utterance.
    pub fn respond(&self, query: &str) -> String {
        let query = query.trim().to_lowercase();

        let mut best: Option<(&Intent, i32)> = None;
        for intent in &self.intents {
            let score = intent
                .keywords
                .iter()
                .filter(|k| query.contains(**k))
                .count() as i32;
            if score == 0 {
                continue;
            }
            let total = score + intent.priority;
            // Strictly-greater keeps the first-declared intent on ties
            if best.map_or(true, |(_, b)| total > b) {
                best = Some((intent, total));
            }
        }

        match best {
            Some((intent, _)) => match &intent.response {
                Response::Text(text) => (*text).to_string(),
                Response::Dynamic(f) => f(&query),
            },
            None if query.chars().count() > HANDOFF_MIN_CHARS => HANDOFF.to_string(),
            None => CLARIFY.to_string(),
        }
    }
}

impl Default for IntentMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_match_picks_the_right_intent() {
        let matcher = IntentMatcher::new();
        let reply = matcher.respond("Bonjour !");
        assert!(reply.contains("Ruby"));
    }

    #[test]
    fn score_plus_priority_decides_between_intents() {
        let a = Intent {
            name: "a",
            keywords: &["alpha", "beta"],
            priority: 0,
            response: Response::Text("response-a"),
        };
        let b = Intent {
            name: "b",
            keywords: &["gamma"],
            priority: 5,
            response: Response::Text("response-b"),
        };
        let matcher = IntentMatcher::with_intents(vec![a, b]);

        // Only A's keywords present: 2 + 0 beats nothing else
        assert_eq!(matcher.respond("alpha beta"), "response-a");
        // Both present: B wins on 1 + 5 > 2 + 0
        assert_eq!(matcher.respond("alpha beta gamma"), "response-b");
    }

    #[test]
    fn ties_resolve_to_first_declared() {
        let a = Intent {
            name: "a",
            keywords: &["mot"],
            priority: 1,
            response: Response::Text("first"),
        };
        let b = Intent {
            name: "b",
            keywords: &["mot"],
            priority: 1,
            response: Response::Text("second"),
        };
        let matcher = IntentMatcher::with_intents(vec![a, b]);
        assert_eq!(matcher.respond("un mot"), "first");
    }

    #[test]
    fn pricing_branches_on_formation() {
        let matcher = IntentMatcher::new();
        let training = matcher.respond("Quel est le prix de la formation ?");
        let general = matcher.respond("Quel est le prix ?");
        assert!(training.contains(SITE_URL));
        assert!(!general.contains(SITE_URL));
        assert!(general.contains("devis"));
    }

    #[test]
    fn admin_question_returns_phone_number() {
        let matcher = IntentMatcher::new();
        let reply = matcher.respond("Où est Oumar ?");
        assert!(reply.contains(CONTACT_PHONE));
    }

    #[test]
    fn unmatched_long_query_hands_off_to_a_human() {
        let matcher = IntentMatcher::new();
        let reply = matcher.respond("Pouvez-vous développer un jeu vidéo multijoueur ?");
        assert!(reply.contains("conseiller"));
    }

    #[test]
    fn unmatched_short_query_asks_for_clarification() {
        let matcher = IntentMatcher::new();
        let reply = matcher.respond("euh ?");
        assert!(reply.contains("préciser"));
    }

    #[test]
    fn matching_is_case_insensitive_and_trimmed() {
        let matcher = IntentMatcher::new();
        assert_eq!(matcher.respond("  BONJOUR  "), matcher.respond("bonjour"));
    }
}
