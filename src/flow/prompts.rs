//! Assistant-authored copy for the guided flow.
//!
//! All wording lives here so the machine stays pure transition logic. The
//! text is the production French copy of the widget.

use crate::catalog::{Service, SITE_URL};

/// Greeting used when the reply source has nothing better (or failed).
pub const FALLBACK_GREETING: &str =
    "Bonjour ! Je suis Ruby, votre assistant IA.\n\nComment puis-je vous aider ?";

pub fn validation_prompt(service: &Service) -> String {
    format!(
        "Vous avez sélectionné : {}.\n\nValidez-vous votre choix ?",
        service.name
    )
}

pub fn description_prompt(service: &Service, min_chars: usize) -> String {
    let constraint = if min_chars > 0 {
        format!(" (minimum {min_chars} caractères)")
    } else {
        String::new()
    };
    if service.id == "chatbot" {
        format!(
            "Excellent ! Pourriez-vous me décrire quel genre de chatbot vous imaginez pour votre entreprise ?{constraint}"
        )
    } else {
        format!(
            "Parfait ! Dites-m'en un peu plus sur votre besoin ou votre projet{constraint} :"
        )
    }
}

pub fn formation_choice_prompt() -> String {
    format!(
        "Souhaitez-vous consulter nos formations prêtes à l'achat sur {SITE_URL} ou préférez-vous un accompagnement personnalisé ?"
    )
}

pub fn formation_description_prompt(min_chars: usize) -> String {
    let constraint = if min_chars > 0 {
        format!("\n\nMerci de rédiger une description exacte de vos attentes ({min_chars} caractères minimum).")
    } else {
        "\n\nMerci de rédiger une description exacte de vos attentes.".to_string()
    };
    format!("Parfait ! Quel type de formation recherchez-vous ? (Marketing, E-commerce, IA, etc.){constraint}")
}

pub fn catalog_link_plain() -> String {
    format!("C'est entendu. Vous trouverez tout notre catalogue ici : {SITE_URL}")
}

pub fn catalog_link_reply() -> String {
    format!(
        "C'est entendu. Vous trouverez tout notre catalogue ici : {SITE_URL}\n\nAvez-vous besoin d'autre chose ?"
    )
}

pub fn support_reply(service: &Service) -> String {
    format!(
        "{}\n\nPuis-je vous renseigner sur un autre service ?",
        service.description
    )
}

pub fn too_short_reply(min_chars: usize) -> String {
    format!(
        "Votre description est un peu courte (minimum {min_chars} caractères). Pourriez-vous me donner plus de détails sur vos attentes ?"
    )
}

pub const CONTACT_INTRO: &str =
    "C'est noté. Pour finaliser votre demande d'accompagnement, j'ai besoin de vos coordonnées.";

pub const CONFIRM_CONTACT_PROMPT: &str =
    "C'est noté. Souhaitez-vous nous laisser vos coordonnées pour être recontacté ?";

pub const CONFIRM_CONTACT_DECLINED: &str =
    "D'accord, aucun souci. Puis-je vous renseigner sur un autre service ?";

pub const CONTACT_FORM_INCOMPLETE: &str =
    "Tous les champs sont requis (nom complet, téléphone, email). Pourriez-vous compléter le formulaire ?";

pub fn thank_you_reply(full_name: &str, phone: &str) -> String {
    format!(
        "Merci {full_name} ! Votre demande est bien enregistrée. Nous allons l'analyser et revenir vers vous très rapidement au {phone}."
    )
}

pub const CLOSING: &str =
    "Merci pour votre confiance. L'équipe de Nomade Technology vous souhaite une excellente journée !";

// User-side echoes for the binary choices.

pub const ECHO_VALIDATE_YES: &str = "Oui, je valide";
pub const ECHO_VALIDATE_NO: &str = "Non, je souhaite changer";
pub const ECHO_FORMATION_PERSONALIZED: &str = "Je veux une formation personnalisée";
pub const ECHO_FORMATION_CATALOG: &str = "Je vais voir sur le site";
pub const ECHO_CONFIRM_YES: &str = "Oui, volontiers";
pub const ECHO_CONFIRM_NO: &str = "Non merci";
pub const ECHO_MORE_YES: &str = "Oui, j'ai une autre demande";
pub const ECHO_MORE_NO: &str = "Non, merci Ruby";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn description_prompt_is_service_aware() {
        let chatbot = catalog::find("chatbot").unwrap();
        let devweb = catalog::find("devweb").unwrap();
        assert!(description_prompt(chatbot, 50).contains("chatbot"));
        assert!(description_prompt(devweb, 50).contains("50 caractères"));
        assert!(!description_prompt(devweb, 0).contains("caractères"));
    }

    #[test]
    fn catalog_branch_carries_the_site_link() {
        assert!(formation_choice_prompt().contains(SITE_URL));
        assert!(catalog_link_reply().contains(SITE_URL));
    }

    #[test]
    fn thank_you_names_the_visitor() {
        let reply = thank_you_reply("Awa Diop", "+221770000000");
        assert!(reply.contains("Awa Diop"));
        assert!(reply.contains("+221770000000"));
    }
}
