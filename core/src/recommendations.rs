//! Static recommendation content, looked up by `(sector, maturity level)`.
//!
//! Coverage of all four maturity levels per sector is a structural guarantee:
//! the per-sector table is a struct with one field per level, so an
//! incomplete table cannot be authored.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;
use utoipa::ToSchema;

use crate::diagnostic::MaturityLevel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SectorRecommendation {
    pub title: String,
    pub actions: Vec<String>,
    pub impact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roi: Option<String>,
}

/// One recommendation per maturity level. All four are mandatory.
#[derive(Debug)]
struct MaturityRecommendations {
    debutant: SectorRecommendation,
    intermediaire: SectorRecommendation,
    avance: SectorRecommendation,
    expert: SectorRecommendation,
}

impl MaturityRecommendations {
    fn for_level(&self, level: MaturityLevel) -> &SectorRecommendation {
        match level {
            MaturityLevel::Debutant => &self.debutant,
            MaturityLevel::Intermediaire => &self.intermediaire,
            MaturityLevel::Avance => &self.avance,
            MaturityLevel::Expert => &self.expert,
        }
    }
}

fn rec(title: &str, actions: &[&str], impact: &str) -> SectorRecommendation {
    SectorRecommendation {
        title: title.to_string(),
        actions: actions.iter().map(|a| a.to_string()).collect(),
        impact: impact.to_string(),
        roi: None,
    }
}

fn transport_recommendations() -> MaturityRecommendations {
    MaturityRecommendations {
        debutant: rec(
            "Votre priorité absolue : Centraliser vos données de flotte",
            &[
                "Centraliser toutes vos données dans une base unique (véhicules, maintenance, coûts, trajets)",
                "Créer un dashboard simple de suivi de votre flotte",
                "Automatiser l'import des nouvelles données (carburant, maintenance, km)",
            ],
            "Gain de temps : 8-12h/semaine | Visibilité immédiate sur vos coûts réels | Détection rapide des anomalies",
        ),
        intermediaire: rec(
            "Vous avez les bases. Passez à l'optimisation data-driven",
            &[
                "Analyser vos coûts en profondeur (par véhicule, par km, par trajet)",
                "Automatiser vos reportings mensuels et hebdomadaires",
                "Détecter les opportunités d'optimisation (véhicules sous-utilisés, surconsommation)",
            ],
            "ROI : 10-15% de réduction des coûts opérationnels | Pilotage basé sur la data | Réactivité plus rapide sur les dérives",
        ),
        avance: rec(
            "Excellent niveau. Passez à l'IA prédictive et automatisation avancée",
            &[
                "Mettre en place la prédiction de maintenance (anticiper les pannes)",
                "Déployer l'optimisation automatique des routes et tournées",
                "Activer la détection d'anomalies en temps réel (coûts, consommation)",
                "Automatiser complètement les workflows de gestion de flotte",
            ],
            "Réduction significative des pannes non prévues | 5-10% d'économies supplémentaires | Automatisation des tâches répétitives",
        ),
        expert: rec(
            "Vous êtes au top. Explorez l'innovation continue",
            &[
                "Benchmarking sectoriel (comparer vos KPIs aux standards du marché)",
                "Innovation IA avancée (jumeaux numériques, simulations de scénarios)",
                "Écosystème data étendu (intégration partenaires, supply chain, clients)",
            ],
            "Innovation continue et amélioration constante | Avantage concurrentiel durable | Optimisation maximale des opérations",
        ),
    }
}

fn retail_recommendations() -> MaturityRecommendations {
    MaturityRecommendations {
        debutant: rec(
            "Votre priorité absolue : Centraliser vos données commerciales",
            &[
                "Centraliser ventes, stocks, et clients dans une base unique",
                "Créer un dashboard simple de suivi commercial",
                "Automatiser l'import des données de caisse/ventes",
            ],
            "Gain de temps : 10-15h/semaine | Visibilité immédiate sur vos performances réelles | Détection rapide des ruptures de stock",
        ),
        intermediaire: rec(
            "Vous avez les bases. Passez à l'optimisation commerciale data-driven",
            &[
                "Analyser vos marges par produit et par point de vente",
                "Automatiser vos reportings commerciaux",
                "Détecter les opportunités (produits stars, zones performantes)",
            ],
            "ROI : 10-15% d'amélioration de la marge | Pilotage commercial basé sur la data | Réactivité immédiate sur les tendances",
        ),
        avance: rec(
            "Excellent niveau. Passez à l'IA prédictive et personnalisation",
            &[
                "Prévision de la demande pour optimiser les stocks",
                "Pricing dynamique basé sur la demande",
                "Personnalisation de l'expérience client",
                "Automatisation complète des workflows commerciaux",
            ],
            "Réduction de 20-30% des ruptures de stock | 5-10% d'amélioration du CA | Personnalisation à l'échelle",
        ),
        expert: rec(
            "Vous êtes au top. Explorez l'innovation continue",
            &[
                "Benchmarking sectoriel retail",
                "IA avancée (computer vision, prédiction comportement)",
                "Écosystème data étendu (fournisseurs, marketplace)",
            ],
            "Innovation continue et avantage concurrentiel | Expérience client différenciante | Optimisation maximale",
        ),
    }
}

fn energy_recommendations() -> MaturityRecommendations {
    MaturityRecommendations {
        debutant: rec(
            "Votre priorité absolue : Centraliser vos données opérationnelles",
            &[
                "Centraliser production, maintenance, et incidents dans une base unique",
                "Créer un dashboard simple de suivi opérationnel",
                "Automatiser la remontée d'informations terrain",
            ],
            "Gain de temps : 8-12h/semaine | Visibilité immédiate sur les incidents et la performance | Détection rapide des anomalies",
        ),
        intermediaire: rec(
            "Vous avez les bases. Passez à l'optimisation opérationnelle data-driven",
            &[
                "Analyser vos coûts et pertes par site/équipement",
                "Automatiser vos reportings réglementaires et opérationnels",
                "Détecter les équipements à risque et optimisations possibles",
            ],
            "ROI : 10-15% de réduction des coûts opérationnels | Pilotage basé sur la data | Réduction des temps d'intervention",
        ),
        avance: rec(
            "Excellent niveau. Passez à l'IA prédictive et optimisation réseau",
            &[
                "Maintenance prédictive pour anticiper les pannes",
                "Optimisation de la production/distribution en temps réel",
                "Détection d'anomalies et fraudes automatique",
                "Prévision de la demande pour ajuster la production",
            ],
            "Réduction de 25-35% des pannes non prévues | 5-10% d'optimisation de la performance | Amélioration de la qualité de service",
        ),
        expert: rec(
            "Vous êtes au top. Explorez l'innovation continue",
            &[
                "Smart grid et IoT avancé",
                "Jumeaux numériques des infrastructures",
                "IA avancée pour optimisation globale du réseau",
            ],
            "Innovation continue et différenciation | Excellence opérationnelle | Leadership technologique",
        ),
    }
}

fn generic_recommendations() -> MaturityRecommendations {
    MaturityRecommendations {
        debutant: rec(
            "Votre priorité : Structurer et centraliser vos données",
            &[
                "Identifier et centraliser vos sources de données clés",
                "Mettre en place un premier tableau de bord de suivi",
                "Définir vos KPIs prioritaires",
            ],
            "Gain de temps : 5-10h/semaine | Visibilité sur votre activité | Détection rapide des anomalies",
        ),
        intermediaire: rec(
            "Vous avez les bases. Passez à l'optimisation",
            &[
                "Automatiser vos reportings et tableaux de bord",
                "Analyser vos données en profondeur pour identifier les leviers",
                "Former vos équipes à la culture data",
            ],
            "ROI : 10-15% d'amélioration de la performance opérationnelle | Pilotage basé sur la data | Réactivité plus rapide sur les dérives",
        ),
        avance: rec(
            "Excellent niveau. Passez à l'IA et l'automatisation avancée",
            &[
                "Déployer des modèles prédictifs sur vos cas d'usage clés",
                "Automatiser les processus répétitifs avec l'IA",
                "Mettre en place la détection d'anomalies en temps réel",
            ],
            "Réduction significative des incidents non prévus | Gains de productivité mesurables | Automatisation des tâches répétitives",
        ),
        expert: rec(
            "Vous êtes au top. Explorez l'innovation",
            &[
                "Benchmarking sectoriel avancé",
                "Innovation IA (modèles avancés, automatisation complète)",
                "Écosystème data étendu avec vos partenaires",
            ],
            "Innovation continue et amélioration constante | Avantage concurrentiel durable | Optimisation maximale des opérations",
        ),
    }
}

fn sector_tables() -> &'static HashMap<&'static str, MaturityRecommendations> {
    static TABLES: OnceLock<HashMap<&'static str, MaturityRecommendations>> = OnceLock::new();
    TABLES.get_or_init(|| {
        HashMap::from([
            ("transport", transport_recommendations()),
            ("retail", retail_recommendations()),
            ("energy", energy_recommendations()),
        ])
    })
}

fn generic_table() -> &'static MaturityRecommendations {
    static GENERIC: OnceLock<MaturityRecommendations> = OnceLock::new();
    GENERIC.get_or_init(generic_recommendations)
}

/// Recommendation for a sector and maturity level. Sectors without dedicated
/// content fall back to the generic table, mirroring the question catalog
/// fallback rule.
pub fn recommendations_for(sector: &str, level: MaturityLevel) -> &'static SectorRecommendation {
    sector_tables()
        .get(sector)
        .unwrap_or_else(|| generic_table())
        .for_level(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sector_covers_every_level() {
        for sector in ["transport", "retail", "energy", "autre"] {
            for level in MaturityLevel::ALL {
                let recommendation = recommendations_for(sector, level);
                assert!(!recommendation.title.is_empty());
                assert!(!recommendation.actions.is_empty());
                assert!(!recommendation.impact.is_empty());
            }
        }
    }

    #[test]
    fn unknown_sector_falls_back_to_generic() {
        let fallback = recommendations_for("aerospace", MaturityLevel::Debutant);
        let generic = recommendations_for("autre", MaturityLevel::Debutant);
        assert_eq!(fallback, generic);
        assert_eq!(fallback.title, "Votre priorité : Structurer et centraliser vos données");
    }

    #[test]
    fn dedicated_sectors_have_distinct_content() {
        let transport = recommendations_for("transport", MaturityLevel::Avance);
        let retail = recommendations_for("retail", MaturityLevel::Avance);
        assert_ne!(transport, retail);
        assert!(transport.actions.iter().any(|a| a.contains("maintenance")));
    }
}
