//! Static service catalog.
//!
//! Six fixed entries defined at startup, read-only for the lifetime of the
//! process. The copy is the production French wording served by the widget.

/// Company identity shown in assistant copy and notifications.
pub const COMPANY_NAME: &str = "Nomade Technology";
/// Admin contact phone, surfaced by the support service and the local matcher.
pub const CONTACT_PHONE: &str = "+221777867118";
/// Public site carrying the training catalog.
pub const SITE_URL: &str = "www.nomadetech.digital";
/// Fallback reply-to address for notifications.
pub const ADMIN_EMAIL: &str = "o.tidianendiaye@gmail.com";

/// A catalog entry the visitor can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Service {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// The full catalog, in display order.
pub static SERVICES: &[Service] = &[
    Service {
        id: "chatbot",
        name: "🤖 Conception de Chatbot IA",
        description: "Nous concevons des agents conversationnels intelligents basés sur les dernières avancées en Intelligence Artificielle. Nos chatbots automatisent votre service client, qualifient vos prospects et améliorent l'engagement sur vos plateformes 24h/24. C'est la solution idéale pour moderniser votre entreprise.",
    },
    Service {
        id: "ecommerce",
        name: "🛒 Boutique e-commerce",
        description: "Nomade Technology accompagne les entrepreneurs et entreprises dans la création et la gestion de boutiques en ligne performantes. Nous prenons en charge toutes les étapes clés : configuration, paiement et optimisation client.",
    },
    Service {
        id: "formation",
        name: "🎓 Formations en ligne",
        description: "Nous proposons des formations de pointe pour maîtriser le marketing digital, le e-commerce et les nouvelles technologies.",
    },
    Service {
        id: "coaching",
        name: "🤝 Coaching",
        description: "Un service de coaching personnalisé pour aider les entrepreneurs et professionnels à structurer leurs projets numériques et clarifier leurs objectifs.",
    },
    Service {
        id: "devweb",
        name: "💻 Développement web",
        description: "Nous réalisons des sites web et applications sur mesure : sites vitrines, plateformes e-commerce et outils métiers performants.",
    },
    Service {
        id: "support",
        name: "📞 Support / Informations",
        description: "Contactez l'administrateur directement au +221777867118 pour toute information complémentaire.",
    },
];

/// Look up a service by id.
pub fn find(id: &str) -> Option<&'static Service> {
    SERVICES.iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_six_services() {
        assert_eq!(SERVICES.len(), 6);
    }

    #[test]
    fn ids_are_unique() {
        for (i, a) in SERVICES.iter().enumerate() {
            for b in &SERVICES[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn find_known_and_unknown() {
        assert_eq!(find("formation").unwrap().name, "🎓 Formations en ligne");
        assert!(find("support").is_some());
        assert!(find("astrology").is_none());
    }

    #[test]
    fn support_description_carries_contact_phone() {
        let support = find("support").unwrap();
        assert!(support.description.contains(CONTACT_PHONE));
    }
}
