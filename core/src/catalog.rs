//! Static question catalogs, grouped by sector and wizard step.
//!
//! Catalogs are hand-authored configuration compiled into the binary and
//! materialized once on first access. They are never mutated at runtime.
//! A sector either has a dedicated catalog or falls back to the generic one
//! in full; the two are never merged for a single sector.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::diagnostic::Dimension;

/// How a question is answered, and which scoring algorithm applies.
///
/// A tagged variant rather than a struct with optional mode fields: a
/// count-mode question cannot exist without its exclusive value, and a
/// single-choice question cannot accidentally be scored as a sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Exactly one option may be selected; the answer score is that
    /// option's score.
    SingleChoice,
    /// Any subset of options; score is the clamped sum of option scores.
    MultiChoiceSum,
    /// Any subset with one designated exclusive option ("none of these").
    /// Score is a step function of how many non-exclusive options are
    /// selected.
    MultiChoiceCount { exclusive: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct QuestionOption {
    pub label: String,
    pub value: String,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Question {
    pub id: String,
    /// Wizard screen this question belongs to.
    pub step: u8,
    pub dimension: Dimension,
    /// Absent on generic (fallback) questions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    pub text: String,
    pub kind: QuestionKind,
    pub options: Vec<QuestionOption>,
    pub max_score: i32,
    pub order_index: i32,
}

/// Configuration defects detected by [`validate_catalog`]. These are fatal at
/// startup; scoring assumes a valid catalog and never re-checks.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("dimension weights sum to {0}, expected 1.0")]
    WeightSum(f64),
    #[error("question {question}: duplicate option value '{value}'")]
    DuplicateOptionValue { question: String, value: String },
    #[error("question {question}: exclusive value '{value}' is not among its options")]
    MissingExclusiveOption { question: String, value: String },
    #[error("question {question}: max_score must be positive")]
    NonPositiveMaxScore { question: String },
    #[error("question {question}: option '{value}' scores {score}, above max_score {max_score}")]
    OptionAboveMax {
        question: String,
        value: String,
        score: i32,
        max_score: i32,
    },
}

fn single(
    id: &str,
    step: u8,
    dimension: Dimension,
    sector: Option<&str>,
    text: &str,
    order_index: i32,
    options: &[(&str, &str, i32)],
) -> Question {
    Question {
        id: id.to_string(),
        step,
        dimension,
        sector: sector.map(str::to_string),
        text: text.to_string(),
        kind: QuestionKind::SingleChoice,
        options: options
            .iter()
            .map(|(label, value, score)| QuestionOption {
                label: label.to_string(),
                value: value.to_string(),
                score: *score,
            })
            .collect(),
        max_score: 100,
        order_index,
    }
}

fn count(
    id: &str,
    step: u8,
    dimension: Dimension,
    sector: Option<&str>,
    text: &str,
    order_index: i32,
    options: &[(&str, &str, i32)],
    exclusive: &str,
) -> Question {
    Question {
        kind: QuestionKind::MultiChoiceCount {
            exclusive: exclusive.to_string(),
        },
        ..single(id, step, dimension, sector, text, order_index, options)
    }
}

// --- Transport & Logistique ---

fn transport_questions() -> Vec<Question> {
    let s = Some("transport");
    vec![
        single(
            "tl_q1",
            2,
            Dimension::Data,
            s,
            "Où sont stockées vos données de flotte (véhicules, maintenance, carburant, trajets) ?",
            1,
            &[
                ("Aucune centralisation claire", "none", 0),
                ("Papier, emails, carnets de bord", "paper", 15),
                ("Excel / Google Sheets (plusieurs fichiers)", "spreadsheets", 40),
                ("Logiciel de base + Excel en complément", "software_excel", 60),
                ("Système centralisé (TMS, ERP)", "centralized", 90),
            ],
        ),
        single(
            "tl_q2",
            2,
            Dimension::Data,
            s,
            "Comment planifiez-vous et suivez-vous les maintenances de vos véhicules ?",
            2,
            &[
                ("Maintenance réactive (on répare quand ça casse)", "reactive", 0),
                ("Carnet papier ou mémoire", "paper", 20),
                ("Planning manuel dans Excel/agenda", "manual_planning", 50),
                ("Système automatisé avec alertes (basé sur km/temps)", "automated", 100),
            ],
        ),
        single(
            "tl_q3",
            2,
            Dimension::Data,
            s,
            "Vos équipes peuvent-elles accéder facilement aux données dont elles ont besoin ?",
            3,
            &[
                ("Non, très difficile d'obtenir l'info", "no", 0),
                ("Partiellement, données dispersées", "partial", 25),
                ("Oui, mais nécessite de demander ou compiler", "compile", 50),
                ("Oui, données accessibles en temps réel (mobile/web)", "realtime", 100),
            ],
        ),
        single(
            "tl_q4",
            2,
            Dimension::Data,
            s,
            "Pouvez-vous retrouver l'historique complet d'un véhicule (maintenance, coûts, incidents, trajets) ?",
            4,
            &[
                ("Non, très difficile ou impossible", "no", 0),
                ("Partiellement, il manque souvent des infos", "partial", 20),
                ("Oui, mais en cherchant dans plusieurs fichiers", "multiple_files", 40),
                ("Oui, immédiatement dans un système", "instant", 100),
            ],
        ),
        single(
            "tl_q5",
            3,
            Dimension::Pilotage,
            s,
            "Suivez-vous vos coûts par véhicule et/ou par trajet ?",
            1,
            &[
                ("Non, pas de suivi détaillé des coûts", "no", 0),
                ("Estimation approximative", "estimate", 30),
                ("Oui, mais calcul manuel mensuel", "manual_monthly", 60),
                ("Oui, calcul automatique et suivi en temps réel", "auto_realtime", 100),
            ],
        ),
        single(
            "tl_q6",
            3,
            Dimension::Pilotage,
            s,
            "Comment créez-vous vos reportings d'activité (flotte, coûts, performance) ?",
            2,
            &[
                ("Pas de reporting structuré", "none", 0),
                ("Rapports basiques occasionnels", "basic", 20),
                ("Compilation manuelle Excel (prend plusieurs heures)", "manual_excel", 40),
                ("Dashboard automatisé mis à jour en temps réel", "auto_dashboard", 100),
            ],
        ),
        single(
            "tl_q7",
            3,
            Dimension::Pilotage,
            s,
            "Suivez-vous des KPIs opérationnels (taux de disponibilité, coût au km, délais de livraison, etc.) ?",
            3,
            &[
                ("Non, pas de KPIs définis", "no", 0),
                ("Quelques indicateurs basiques", "basic", 25),
                ("Oui, mais calcul manuel et irrégulier", "manual_irregular", 50),
                ("Oui, KPIs suivis régulièrement et pilotés", "regular_tracked", 100),
            ],
        ),
        single(
            "tl_q8",
            3,
            Dimension::Pilotage,
            s,
            "Comment prenez-vous vos décisions opérationnelles (achat véhicule, choix prestataire, optimisation routes) ?",
            4,
            &[
                ("Décisions rapides sans analyse approfondie", "no_analysis", 10),
                ("Principalement expérience et intuition", "experience", 30),
                ("Mix data + expérience terrain", "mixed", 70),
                ("Analyses data systématiques (data-driven)", "data_driven", 100),
            ],
        ),
        single(
            "tl_q9",
            4,
            Dimension::Automation,
            s,
            "Avez-vous des processus automatisés dans votre gestion de flotte ?",
            1,
            &[
                ("Non, tout est manuel", "none", 0),
                ("Intéressé mais pas encore mis en place", "interested", 30),
                ("Quelques automatisations basiques (ex : alertes email)", "basic", 60),
                ("Oui, plusieurs workflows automatisés", "multiple", 100),
            ],
        ),
        count(
            "tl_q10",
            4,
            Dimension::Automation,
            s,
            "Seriez-vous intéressé par des solutions d'IA pour :",
            2,
            &[
                ("Prédiction de maintenance (anticiper les pannes)", "predictive_maintenance", 1),
                ("Optimisation des routes et trajets", "route_optimization", 1),
                ("Détection d'anomalies (coûts inhabituels, consommation excessive)", "anomaly_detection", 1),
                ("Automatisation des reportings mensuels", "auto_reporting", 1),
                ("Analyse prédictive (coûts futurs, besoins en véhicules)", "predictive_analytics", 1),
                ("Pas encore pertinent pour nous", "not_relevant", 0),
            ],
            "not_relevant",
        ),
    ]
}

// --- Commerce & Distribution ---

fn retail_questions() -> Vec<Question> {
    let s = Some("retail");
    vec![
        single(
            "rt_q1",
            2,
            Dimension::Data,
            s,
            "Où sont stockées vos données de ventes et de stocks ?",
            1,
            &[
                ("Aucune centralisation claire", "none", 0),
                ("Papier, cahiers, registres", "paper", 15),
                ("Excel / Sheets par point de vente", "spreadsheets", 40),
                ("Logiciel de caisse + Excel en complément", "pos_excel", 60),
                ("ERP / CRM centralisé", "centralized", 90),
            ],
        ),
        single(
            "rt_q2",
            2,
            Dimension::Data,
            s,
            "Comment gérez-vous vos stocks multi-sites ?",
            2,
            &[
                ("Pas de suivi cross-sites", "none", 0),
                ("Chaque site gère indépendamment", "independent", 20),
                ("Consolidation manuelle périodique", "manual", 50),
                ("Visibilité temps réel centralisée sur tous les sites", "realtime", 100),
            ],
        ),
        single(
            "rt_q3",
            2,
            Dimension::Data,
            s,
            "Vos équipes peuvent-elles accéder aux données dont elles ont besoin ?",
            3,
            &[
                ("Non, très difficile d'obtenir l'info", "no", 0),
                ("Partiellement, données dispersées", "partial", 25),
                ("Oui, mais nécessite de demander ou compiler", "compile", 50),
                ("Oui, données accessibles en temps réel (mobile/web)", "realtime", 100),
            ],
        ),
        single(
            "rt_q4",
            2,
            Dimension::Data,
            s,
            "Pouvez-vous retrouver l'historique complet des ventes par produit/client/magasin ?",
            4,
            &[
                ("Non, très difficile ou impossible", "no", 0),
                ("Partiellement, il manque souvent des infos", "partial", 20),
                ("Oui, mais en cherchant dans plusieurs fichiers", "multiple_files", 40),
                ("Oui, immédiatement dans un système", "instant", 100),
            ],
        ),
        single(
            "rt_q5",
            3,
            Dimension::Pilotage,
            s,
            "Suivez-vous la marge par produit et par point de vente ?",
            1,
            &[
                ("Non, pas de suivi détaillé des marges", "no", 0),
                ("Estimation approximative", "estimate", 30),
                ("Oui, mais calcul manuel mensuel", "manual_monthly", 60),
                ("Oui, calcul automatique et suivi en temps réel", "auto_realtime", 100),
            ],
        ),
        single(
            "rt_q6",
            3,
            Dimension::Pilotage,
            s,
            "Comment analysez-vous les performances de vos points de vente ?",
            2,
            &[
                ("Pas d'analyse structurée", "none", 0),
                ("Analyse basique occasionnelle", "basic", 20),
                ("Rapports manuels mensuels", "manual_monthly", 40),
                ("Dashboard automatisé avec KPIs en temps réel", "auto_dashboard", 100),
            ],
        ),
        single(
            "rt_q7",
            3,
            Dimension::Pilotage,
            s,
            "Suivez-vous des KPIs commerciaux (taux de conversion, panier moyen, rotation stocks, etc.) ?",
            3,
            &[
                ("Non, pas de KPIs définis", "no", 0),
                ("Quelques indicateurs basiques", "basic", 25),
                ("Oui, mais calcul manuel et irrégulier", "manual_irregular", 50),
                ("Oui, KPIs suivis régulièrement et pilotés", "regular_tracked", 100),
            ],
        ),
        single(
            "rt_q8",
            3,
            Dimension::Pilotage,
            s,
            "Comment prenez-vous vos décisions commerciales (assortiment, prix, promotions) ?",
            4,
            &[
                ("Décisions rapides sans analyse approfondie", "no_analysis", 10),
                ("Principalement expérience et feeling", "experience", 30),
                ("Mix data + intuition terrain", "mixed", 70),
                ("Analyses data systématiques (data-driven)", "data_driven", 100),
            ],
        ),
        single(
            "rt_q9",
            4,
            Dimension::Automation,
            s,
            "Avez-vous des processus automatisés dans votre gestion commerciale ?",
            1,
            &[
                ("Non, tout est manuel", "none", 0),
                ("Intéressé mais pas encore mis en place", "interested", 30),
                ("Quelques automatisations basiques (ex : alertes stock)", "basic", 60),
                ("Oui, plusieurs workflows automatisés", "multiple", 100),
            ],
        ),
        count(
            "rt_q10",
            4,
            Dimension::Automation,
            s,
            "Seriez-vous intéressé par des solutions d'IA pour :",
            2,
            &[
                ("Prévision de la demande", "demand_forecast", 1),
                ("Optimisation des prix dynamiques", "dynamic_pricing", 1),
                ("Détection ruptures de stock", "stockout_detection", 1),
                ("Analyse comportement clients", "customer_behavior", 1),
                ("Recommandations produits personnalisées", "product_reco", 1),
                ("Pas encore pertinent pour nous", "not_relevant", 0),
            ],
            "not_relevant",
        ),
    ]
}

// --- Énergie & Utilities ---

fn energy_questions() -> Vec<Question> {
    let s = Some("energy");
    vec![
        single(
            "en_q1",
            2,
            Dimension::Data,
            s,
            "Où sont stockées vos données opérationnelles (production, distribution, consommation) ?",
            1,
            &[
                ("Aucune centralisation claire", "none", 0),
                ("Papier, registres manuels", "paper", 15),
                ("Excel / Sheets multiples", "spreadsheets", 40),
                ("Logiciel métier + Excel en complément", "software_excel", 60),
                ("Système centralisé (SCADA, ERP)", "centralized", 90),
            ],
        ),
        single(
            "en_q2",
            2,
            Dimension::Data,
            s,
            "Comment suivez-vous vos équipements et infrastructures ?",
            2,
            &[
                ("Maintenance réactive uniquement", "reactive", 0),
                ("Suivi papier ou mémoire", "paper", 20),
                ("Planning manuel et fiches d'intervention", "manual", 50),
                ("Système GMAO avec historique complet", "gmao", 100),
            ],
        ),
        single(
            "en_q3",
            2,
            Dimension::Data,
            s,
            "Vos équipes terrain peuvent-elles accéder aux données dont elles ont besoin ?",
            3,
            &[
                ("Non, très difficile d'obtenir l'info", "no", 0),
                ("Partiellement, données dispersées", "partial", 25),
                ("Oui, mais nécessite de retourner au bureau", "office", 50),
                ("Oui, données accessibles en temps réel (mobile/tablette)", "realtime", 100),
            ],
        ),
        single(
            "en_q4",
            2,
            Dimension::Data,
            s,
            "Pouvez-vous retrouver l'historique complet d'un équipement (maintenance, incidents, performance) ?",
            4,
            &[
                ("Non, très difficile ou impossible", "no", 0),
                ("Partiellement, il manque souvent des infos", "partial", 20),
                ("Oui, mais en cherchant dans plusieurs sources", "multiple_sources", 40),
                ("Oui, immédiatement dans un système", "instant", 100),
            ],
        ),
        single(
            "en_q5",
            3,
            Dimension::Pilotage,
            s,
            "Suivez-vous vos coûts par site/équipement et vos pertes techniques ?",
            1,
            &[
                ("Non, pas de suivi détaillé", "no", 0),
                ("Estimation approximative", "estimate", 30),
                ("Oui, mais calcul manuel mensuel", "manual_monthly", 60),
                ("Oui, calcul automatique et suivi en temps réel", "auto_realtime", 100),
            ],
        ),
        single(
            "en_q6",
            3,
            Dimension::Pilotage,
            s,
            "Comment créez-vous vos reportings opérationnels (production, incidents, maintenance) ?",
            2,
            &[
                ("Pas de reporting structuré", "none", 0),
                ("Rapports basiques occasionnels", "basic", 20),
                ("Compilation manuelle (prend plusieurs heures)", "manual", 40),
                ("Dashboard automatisé mis à jour en temps réel", "auto_dashboard", 100),
            ],
        ),
        single(
            "en_q7",
            3,
            Dimension::Pilotage,
            s,
            "Suivez-vous des KPIs opérationnels (disponibilité, MTBF, taux d'incidents, rendement) ?",
            3,
            &[
                ("Non, pas de KPIs définis", "no", 0),
                ("Quelques indicateurs basiques", "basic", 25),
                ("Oui, mais calcul manuel et irrégulier", "manual_irregular", 50),
                ("Oui, KPIs suivis régulièrement et pilotés", "regular_tracked", 100),
            ],
        ),
        single(
            "en_q8",
            3,
            Dimension::Pilotage,
            s,
            "Comment prenez-vous vos décisions (maintenance, investissement, optimisation réseau) ?",
            4,
            &[
                ("Décisions rapides sans analyse approfondie", "no_analysis", 10),
                ("Principalement expérience et intuition", "experience", 30),
                ("Mix data + expérience terrain", "mixed", 70),
                ("Analyses data systématiques (data-driven)", "data_driven", 100),
            ],
        ),
        single(
            "en_q9",
            4,
            Dimension::Automation,
            s,
            "Avez-vous des processus automatisés dans votre gestion opérationnelle ?",
            1,
            &[
                ("Non, tout est manuel", "none", 0),
                ("Intéressé mais pas encore mis en place", "interested", 30),
                ("Quelques automatisations basiques (ex : alertes)", "basic", 60),
                ("Oui, plusieurs workflows automatisés", "multiple", 100),
            ],
        ),
        count(
            "en_q10",
            4,
            Dimension::Automation,
            s,
            "Seriez-vous intéressé par des solutions d'IA pour :",
            2,
            &[
                ("Maintenance prédictive des équipements", "predictive_maintenance", 1),
                ("Optimisation de la production/distribution", "production_optimization", 1),
                ("Détection d'anomalies et fraudes", "anomaly_fraud", 1),
                ("Prévision de la demande énergétique", "demand_forecast", 1),
                ("Optimisation de la performance réseau", "network_optimization", 1),
                ("Pas encore pertinent pour nous", "not_relevant", 0),
            ],
            "not_relevant",
        ),
    ]
}

// --- Generic fallback ---

fn generic_questions() -> Vec<Question> {
    vec![
        single(
            "gen_q1",
            2,
            Dimension::Data,
            None,
            "Quelles sont vos principales sources de données aujourd'hui ?",
            1,
            &[
                ("Aucune source structurée", "none", 0),
                ("Papier, emails", "paper", 15),
                ("Fichiers Excel / Google Sheets", "spreadsheets", 40),
                ("ERP ou logiciel métier", "erp", 65),
                ("Plusieurs systèmes connectés / Data warehouse", "connected", 90),
            ],
        ),
        single(
            "gen_q2",
            2,
            Dimension::Data,
            None,
            "Vos données sont-elles centralisées dans un référentiel unique ?",
            2,
            &[
                ("Non, les données sont dispersées", "dispersed", 0),
                ("Partiellement centralisées", "partial", 40),
                ("Oui, référentiel central", "centralized", 90),
            ],
        ),
        single(
            "gen_q3",
            2,
            Dimension::Data,
            None,
            "Vos équipes peuvent-elles accéder facilement aux données dont elles ont besoin ?",
            3,
            &[
                ("Non, très difficile d'obtenir l'info", "no", 0),
                ("Partiellement, données dispersées", "partial", 25),
                ("Oui, mais nécessite de demander ou compiler", "compile", 50),
                ("Oui, données accessibles en temps réel", "realtime", 100),
            ],
        ),
        single(
            "gen_q4",
            2,
            Dimension::Data,
            None,
            "Comment évaluez-vous la qualité de vos données ?",
            4,
            &[
                ("Mauvaise - beaucoup d'erreurs", "poor", 0),
                ("Passable - quelques problèmes", "fair", 25),
                ("Correcte - généralement fiable", "good", 50),
                ("Bonne - validation en place", "very_good", 75),
                ("Excellente - gouvernance stricte", "excellent", 100),
            ],
        ),
        single(
            "gen_q5",
            3,
            Dimension::Pilotage,
            None,
            "Disposez-vous de tableaux de bord pour suivre vos KPIs ?",
            1,
            &[
                ("Non", "no", 0),
                ("Oui, dans Excel/Sheets", "spreadsheet", 30),
                ("Oui, outil BI (Power BI, Tableau)", "bi_tool", 70),
                ("Dashboards temps réel", "realtime", 100),
            ],
        ),
        single(
            "gen_q6",
            3,
            Dimension::Pilotage,
            None,
            "Vos rapports sont-ils automatisés ?",
            2,
            &[
                ("Non, tout est manuel", "manual", 0),
                ("Rapports basiques occasionnels", "basic", 20),
                ("Partiellement automatisés", "partial", 50),
                ("Entièrement automatisés", "automated", 100),
            ],
        ),
        single(
            "gen_q7",
            3,
            Dimension::Pilotage,
            None,
            "Suivez-vous des KPIs opérationnels régulièrement ?",
            3,
            &[
                ("Non, pas de KPIs définis", "no", 0),
                ("Quelques indicateurs basiques", "basic", 25),
                ("Oui, mais calcul manuel et irrégulier", "manual", 50),
                ("Oui, KPIs suivis régulièrement et pilotés", "tracked", 100),
            ],
        ),
        single(
            "gen_q8",
            3,
            Dimension::Pilotage,
            None,
            "Comment prenez-vous vos décisions stratégiques ?",
            4,
            &[
                ("Décisions rapides sans analyse approfondie", "no_analysis", 10),
                ("Principalement expérience et intuition", "experience", 30),
                ("Mix data + expérience", "mixed", 70),
                ("Culture data-driven", "data_driven", 100),
            ],
        ),
        single(
            "gen_q9",
            4,
            Dimension::Automation,
            None,
            "Avez-vous des processus automatisés ?",
            1,
            &[
                ("Non, tout est manuel", "none", 0),
                ("Intéressé mais pas encore mis en place", "interested", 30),
                ("Quelques automatisations basiques", "basic", 60),
                ("Plusieurs workflows automatisés", "multiple", 100),
            ],
        ),
        count(
            "gen_q10",
            4,
            Dimension::Automation,
            None,
            "Quels cas d'usage IA vous intéressent ?",
            2,
            &[
                ("Prédiction et forecasting", "prediction", 1),
                ("Automatisation de tâches répétitives", "task_automation", 1),
                ("Analyse de documents", "document_ai", 1),
                ("Détection d'anomalies", "anomaly_detection", 1),
                ("Reporting automatisé", "auto_reporting", 1),
                ("Pas encore pertinent pour nous", "not_relevant", 0),
            ],
            "not_relevant",
        ),
    ]
}

fn sector_catalogs() -> &'static HashMap<&'static str, Vec<Question>> {
    static CATALOGS: OnceLock<HashMap<&'static str, Vec<Question>>> = OnceLock::new();
    CATALOGS.get_or_init(|| {
        HashMap::from([
            ("transport", transport_questions()),
            ("retail", retail_questions()),
            ("energy", energy_questions()),
        ])
    })
}

fn generic_catalog() -> &'static [Question] {
    static GENERIC: OnceLock<Vec<Question>> = OnceLock::new();
    GENERIC.get_or_init(generic_questions)
}

/// All questions for a sector, in authored order. An unknown sector silently
/// resolves to the generic catalog: that is the fallback rule, not an error.
pub fn questions_for_sector(sector: &str) -> &'static [Question] {
    sector_catalogs()
        .get(sector)
        .map(Vec::as_slice)
        .unwrap_or_else(|| generic_catalog())
}

/// The subset of a sector's questions shown on one wizard step.
pub fn questions_for_step(step: u8, sector: &str) -> Vec<&'static Question> {
    questions_for_sector(sector)
        .iter()
        .filter(|q| q.step == step)
        .collect()
}

pub fn has_sector_questions(sector: &str) -> bool {
    sector_catalogs().contains_key(sector)
}

/// Look up one question by id within a sector's resolved catalog.
pub fn question_by_id(sector: &str, question_id: &str) -> Option<&'static Question> {
    questions_for_sector(sector)
        .iter()
        .find(|q| q.id == question_id)
}

/// Startup-time configuration check over every catalog (sector and generic).
///
/// Scoring relies on these invariants and does not re-validate per request.
pub fn validate_catalog() -> Result<(), CatalogError> {
    let weight_sum: f64 = Dimension::ALL.iter().map(|d| d.weight()).sum();
    if (weight_sum - 1.0).abs() > 1e-9 {
        return Err(CatalogError::WeightSum(weight_sum));
    }

    let all = sector_catalogs()
        .values()
        .flatten()
        .chain(generic_catalog().iter());

    for question in all {
        if question.max_score <= 0 {
            return Err(CatalogError::NonPositiveMaxScore {
                question: question.id.clone(),
            });
        }

        let mut seen = Vec::with_capacity(question.options.len());
        for option in &question.options {
            if seen.contains(&option.value.as_str()) {
                return Err(CatalogError::DuplicateOptionValue {
                    question: question.id.clone(),
                    value: option.value.clone(),
                });
            }
            seen.push(option.value.as_str());

            // Count-mode options score 1/0 and are never summed; only the
            // summed modes must stay within max_score.
            if !matches!(question.kind, QuestionKind::MultiChoiceCount { .. })
                && option.score > question.max_score
            {
                return Err(CatalogError::OptionAboveMax {
                    question: question.id.clone(),
                    value: option.value.clone(),
                    score: option.score,
                    max_score: question.max_score,
                });
            }
        }

        if let QuestionKind::MultiChoiceCount { exclusive } = &question.kind {
            if !question.options.iter().any(|o| &o.value == exclusive) {
                return Err(CatalogError::MissingExclusiveOption {
                    question: question.id.clone(),
                    value: exclusive.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_catalogs_are_valid() {
        validate_catalog().unwrap();
    }

    #[test]
    fn dedicated_sectors_have_ten_questions() {
        for sector in ["transport", "retail", "energy"] {
            assert_eq!(questions_for_sector(sector).len(), 10, "sector {sector}");
            assert!(has_sector_questions(sector));
        }
    }

    #[test]
    fn unknown_sector_falls_back_to_generic_exactly() {
        let fallback = questions_for_sector("aerospace");
        let generic = questions_for_sector("");
        assert_eq!(fallback.len(), 10);
        assert_eq!(fallback, generic);
        // Generic questions carry no sector tag; nothing sector-specific leaks in.
        assert!(fallback.iter().all(|q| q.sector.is_none()));
        assert!(!has_sector_questions("aerospace"));
    }

    #[test]
    fn step_filter_returns_only_that_step() {
        let step2 = questions_for_step(2, "transport");
        assert_eq!(step2.len(), 4);
        assert!(step2.iter().all(|q| q.step == 2 && q.dimension == Dimension::Data));

        let step4 = questions_for_step(4, "transport");
        assert_eq!(step4.len(), 2);

        assert!(questions_for_step(9, "transport").is_empty());
    }

    #[test]
    fn count_mode_questions_declare_their_exclusive_option() {
        for sector in ["transport", "retail", "energy", "autre"] {
            let q10 = questions_for_sector(sector)
                .iter()
                .find(|q| matches!(q.kind, QuestionKind::MultiChoiceCount { .. }))
                .expect("each catalog has one count-mode question");
            match &q10.kind {
                QuestionKind::MultiChoiceCount { exclusive } => {
                    assert_eq!(exclusive, "not_relevant");
                    assert!(q10.options.iter().any(|o| o.value == *exclusive));
                }
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn question_lookup_by_id() {
        assert!(question_by_id("transport", "tl_q1").is_some());
        assert!(question_by_id("transport", "rt_q1").is_none());
        // Unknown sector resolves ids against the generic catalog.
        assert!(question_by_id("aerospace", "gen_q1").is_some());
    }
}
