use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The three maturity dimensions the overall score is blended from.
///
/// Weights are fixed configuration, not user input. They must sum to 1.0;
/// `catalog::validate_catalog` checks this at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Data,
    Pilotage,
    Automation,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Data, Dimension::Pilotage, Dimension::Automation];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Data => "data",
            Dimension::Pilotage => "pilotage",
            Dimension::Automation => "automation",
        }
    }

    /// Display label shown on the results page and in exports.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Data => "État des données",
            Dimension::Pilotage => "Pilotage & Performance",
            Dimension::Automation => "Automatisation & IA",
        }
    }

    /// Weight of this dimension in the overall percentage.
    pub fn weight(self) -> f64 {
        match self {
            Dimension::Data => 0.40,
            Dimension::Pilotage => 0.40,
            Dimension::Automation => 0.20,
        }
    }
}

/// Ordinal maturity classification derived purely from the overall percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaturityLevel {
    Debutant,
    Intermediaire,
    Avance,
    Expert,
}

impl MaturityLevel {
    pub const ALL: [MaturityLevel; 4] = [
        MaturityLevel::Debutant,
        MaturityLevel::Intermediaire,
        MaturityLevel::Avance,
        MaturityLevel::Expert,
    ];

    /// Threshold classification. Boundaries are inclusive on the lower band:
    /// 30 is still `debutant`, 60 still `intermediaire`, 85 still `avance`.
    pub fn classify(percentage: i32) -> Self {
        if percentage <= 30 {
            MaturityLevel::Debutant
        } else if percentage <= 60 {
            MaturityLevel::Intermediaire
        } else if percentage <= 85 {
            MaturityLevel::Avance
        } else {
            MaturityLevel::Expert
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MaturityLevel::Debutant => "debutant",
            MaturityLevel::Intermediaire => "intermediaire",
            MaturityLevel::Avance => "avance",
            MaturityLevel::Expert => "expert",
        }
    }

    /// Accented display label.
    pub fn display_label(self) -> &'static str {
        match self {
            MaturityLevel::Debutant => "Débutant",
            MaturityLevel::Intermediaire => "Intermédiaire",
            MaturityLevel::Avance => "Avancé",
            MaturityLevel::Expert => "Expert",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        MaturityLevel::ALL.into_iter().find(|l| l.as_str() == s)
    }
}

/// A recorded answer to one question.
///
/// For multi-choice questions `value` is the comma-joined set of selected
/// option values. `score` is whatever the scoring mode produced for the
/// current selection, always within `[0, question.max_score]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Answer {
    pub question_id: String,
    pub value: String,
    pub score: i32,
}

/// Per-dimension score breakdown. Recomputed in full on every scoring pass,
/// never patched incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub label: String,
    /// Raw sum of answered-question scores in this dimension.
    pub score: i32,
    /// Sum of `max_score` over ALL catalog questions of this dimension,
    /// answered or not. Unanswered questions penalize the percentage.
    pub max_score: i32,
    /// `round(score / max_score * 100)`, 0 when the dimension has no questions.
    pub percentage: i32,
    pub weight: f64,
}

/// Outcome of a scoring pass. `percentage` is the weighted average of the
/// dimension percentages, NOT `total_score / max_possible_score`; the raw
/// sums are reported for transparency only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnosticResult {
    /// Assigned by the storage backend after submission; absent before.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub total_score: i32,
    pub max_possible_score: i32,
    pub percentage: i32,
    pub maturity_level: MaturityLevel,
    pub dimension_scores: Vec<DimensionScore>,
    pub sector: String,
}

/// Company profile captured on the first wizard step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Organization {
    pub name: String,
    pub sector: String,
    pub country: String,
    pub size: String,
}

/// Contact details captured on the final wizard step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Respondent {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: String,
    pub consent_given: bool,
}

/// `(value, label)` pairs for the profile form selects.
pub const SECTORS: &[(&str, &str)] = &[
    ("transport", "Transport & Logistique"),
    ("retail", "Commerce & Distribution"),
    ("energy", "Énergie & Mines"),
    ("autre", "Autre"),
];

pub const COMPANY_SIZES: &[(&str, &str)] = &[
    ("1-10", "1 à 10 employés"),
    ("11-50", "11 à 50 employés"),
    ("51-250", "51 à 250 employés"),
    ("250+", "Plus de 250 employés"),
];

pub const ROLES: &[(&str, &str)] = &[
    ("ceo", "Dirigeant / Gérant"),
    ("ops", "Opérations"),
    ("it", "IT / DSI"),
    ("finance", "Finance / DAF"),
    ("other", "Autre"),
];

pub const COUNTRIES: &[(&str, &str)] = &[
    ("guinée", "Guinée"),
    ("france", "France"),
    ("other", "Autre"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        let sum: f64 = Dimension::ALL.iter().map(|d| d.weight()).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn classify_lower_band_boundaries_are_inclusive() {
        assert_eq!(MaturityLevel::classify(30), MaturityLevel::Debutant);
        assert_eq!(MaturityLevel::classify(31), MaturityLevel::Intermediaire);
        assert_eq!(MaturityLevel::classify(60), MaturityLevel::Intermediaire);
        assert_eq!(MaturityLevel::classify(61), MaturityLevel::Avance);
        assert_eq!(MaturityLevel::classify(85), MaturityLevel::Avance);
        assert_eq!(MaturityLevel::classify(86), MaturityLevel::Expert);
    }

    #[test]
    fn classify_extremes() {
        assert_eq!(MaturityLevel::classify(0), MaturityLevel::Debutant);
        assert_eq!(MaturityLevel::classify(100), MaturityLevel::Expert);
    }

    #[test]
    fn maturity_level_round_trips_through_str() {
        for level in MaturityLevel::ALL {
            assert_eq!(MaturityLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(MaturityLevel::parse("guru"), None);
    }
}
