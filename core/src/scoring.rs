//! Scoring engine: per-question answer scoring, dimension aggregation, and
//! the weighted overall percentage.
//!
//! Everything here is a pure function of `(catalog, answers)`. Missing or
//! malformed answers never raise: an unanswered question contributes 0 to
//! its dimension's raw sum while its `max_score` still counts toward the
//! denominator, so incompleteness lowers the percentage instead of being
//! excluded from it.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{self, Question, QuestionKind};
use crate::diagnostic::{Answer, Dimension, DimensionScore, DiagnosticResult, MaturityLevel};

/// Step function for count-mode questions. The breakpoints are deliberate
/// design constants: breadth of interest is rewarded non-linearly, and an
/// explicit "not relevant" still scores 10 because the respondent engaged
/// with the question.
fn count_score(count: usize) -> i32 {
    if count >= 4 {
        100
    } else if count >= 2 {
        70
    } else if count == 1 {
        40
    } else {
        10
    }
}

fn split_values(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn option_score(question: &Question, value: &str) -> i32 {
    question
        .options
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.score)
        .unwrap_or(0)
}

/// Score a raw answer value against its question. `raw_value` is the selected
/// option value (single choice) or the comma-joined selection set
/// (multi choice). The score is recomputed from scratch; it is a function of
/// the selection set alone, never of the toggle history.
pub fn score_answer(question: &Question, raw_value: &str) -> Answer {
    let score = match &question.kind {
        QuestionKind::SingleChoice => option_score(question, raw_value),
        QuestionKind::MultiChoiceSum => {
            let values = split_values(raw_value);
            let unique: BTreeSet<&str> = values.iter().map(String::as_str).collect();
            let sum: i32 = unique.iter().map(|&v| option_score(question, v)).sum();
            sum.min(question.max_score)
        }
        QuestionKind::MultiChoiceCount { exclusive } => {
            let values = split_values(raw_value);
            let unique: BTreeSet<&str> = values.iter().map(String::as_str).collect();
            let count = unique
                .iter()
                .filter(|&&v| v != exclusive.as_str())
                .filter(|&&v| question.options.iter().any(|o| o.value == v))
                .count();
            count_score(count)
        }
    };

    Answer {
        question_id: question.id.clone(),
        value: raw_value.to_string(),
        score,
    }
}

/// Select a single-choice option. Unknown values score 0 rather than failing.
pub fn answer_single_choice(question: &Question, option_value: &str) -> Answer {
    Answer {
        question_id: question.id.clone(),
        value: option_value.to_string(),
        score: option_score(question, option_value),
    }
}

/// Apply one checkbox toggle to a multi-choice answer and return the new
/// answer. `current_value` is the previous comma-joined selection (empty
/// string when unanswered).
///
/// Count-mode exclusivity rules, applied before scoring:
/// - checking the exclusive option clears everything else;
/// - checking any other option drops the exclusive option first;
/// - unchecking simply removes the value.
///
/// Called on a single-choice question, the toggle degrades to selecting the
/// option (a radio group replaces rather than accumulates).
pub fn toggle_multi_choice(
    question: &Question,
    current_value: &str,
    option_value: &str,
    checked: bool,
) -> Answer {
    let mut selected = split_values(current_value);

    match &question.kind {
        QuestionKind::SingleChoice => return answer_single_choice(question, option_value),
        QuestionKind::MultiChoiceCount { exclusive } => {
            if checked && option_value == exclusive {
                selected = vec![exclusive.clone()];
            } else if checked {
                selected.retain(|v| v != exclusive);
                if !selected.iter().any(|v| v == option_value) {
                    selected.push(option_value.to_string());
                }
            } else {
                selected.retain(|v| v != option_value);
            }
        }
        QuestionKind::MultiChoiceSum => {
            if checked {
                if !selected.iter().any(|v| v == option_value) {
                    selected.push(option_value.to_string());
                }
            } else {
                selected.retain(|v| v != option_value);
            }
        }
    }

    score_answer(question, &selected.join(","))
}

/// Derive scored answers from raw submitted values. Only questions present in
/// the sector's resolved catalog are scored; unknown question ids are dropped.
pub fn score_submission(
    sector: &str,
    raw_answers: &BTreeMap<String, String>,
) -> BTreeMap<String, Answer> {
    let mut answers = BTreeMap::new();
    for question in catalog::questions_for_sector(sector) {
        if let Some(raw_value) = raw_answers.get(&question.id) {
            answers.insert(question.id.clone(), score_answer(question, raw_value));
        }
    }
    answers
}

fn rounded_percentage(raw: i32, max: i32) -> i32 {
    if max > 0 {
        ((raw as f64 / max as f64) * 100.0).round() as i32
    } else {
        0
    }
}

/// Full scoring pass: dimension scores, weighted overall percentage, and
/// maturity classification. Pure and idempotent: the same `(sector, answers)`
/// always produces an identical result.
pub fn compute_result(sector: &str, answers: &BTreeMap<String, Answer>) -> DiagnosticResult {
    let questions = catalog::questions_for_sector(sector);

    let mut dimension_scores = Vec::with_capacity(Dimension::ALL.len());
    for dimension in Dimension::ALL {
        let mut raw = 0;
        let mut max = 0;
        for question in questions.iter().filter(|q| q.dimension == dimension) {
            max += question.max_score;
            if let Some(answer) = answers.get(&question.id) {
                raw += answer.score;
            }
        }

        dimension_scores.push(DimensionScore {
            dimension,
            label: dimension.label().to_string(),
            score: raw,
            max_score: max,
            percentage: rounded_percentage(raw, max),
            weight: dimension.weight(),
        });
    }

    // The overall percentage blends dimension percentages by weight. It is
    // intentionally NOT total_score / max_possible_score; with fixed weights
    // and unequal question counts per dimension the two disagree.
    let percentage = dimension_scores
        .iter()
        .map(|d| d.percentage as f64 * d.weight)
        .sum::<f64>()
        .round() as i32;

    let total_score = dimension_scores.iter().map(|d| d.score).sum();
    let max_possible_score = dimension_scores.iter().map(|d| d.max_score).sum();

    DiagnosticResult {
        id: None,
        total_score,
        max_possible_score,
        percentage,
        maturity_level: MaturityLevel::classify(percentage),
        dimension_scores,
        sector: sector.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{question_by_id, QuestionOption};

    fn sum_question(option_scores: &[(&str, i32)], max_score: i32) -> Question {
        Question {
            id: "sum_q".to_string(),
            step: 2,
            dimension: Dimension::Data,
            sector: None,
            text: "Synthetic sum-mode question".to_string(),
            kind: QuestionKind::MultiChoiceSum,
            options: option_scores
                .iter()
                .map(|(value, score)| QuestionOption {
                    label: value.to_string(),
                    value: value.to_string(),
                    score: *score,
                })
                .collect(),
            max_score,
            order_index: 1,
        }
    }

    fn count_question() -> &'static Question {
        question_by_id("transport", "tl_q10").unwrap()
    }

    #[test]
    fn single_choice_score_is_the_option_score() {
        let q = question_by_id("transport", "tl_q1").unwrap();
        for option in &q.options {
            let answer = answer_single_choice(q, &option.value);
            assert_eq!(answer.score, option.score);
            assert_eq!(answer.value, option.value);
        }
    }

    #[test]
    fn single_choice_unknown_value_scores_zero() {
        let q = question_by_id("transport", "tl_q1").unwrap();
        assert_eq!(answer_single_choice(q, "warp_drive").score, 0);
    }

    #[test]
    fn sum_mode_clamps_to_max_score() {
        let q = sum_question(&[("a", 40), ("b", 50), ("c", 60)], 100);
        assert_eq!(score_answer(&q, "a").score, 40);
        assert_eq!(score_answer(&q, "a,b").score, 90);
        assert_eq!(score_answer(&q, "a,b,c").score, 100);
    }

    #[test]
    fn sum_mode_is_monotonic_as_options_are_added() {
        let q = sum_question(&[("a", 10), ("b", 0), ("c", 30), ("d", 70)], 100);
        let mut answer = score_answer(&q, "");
        let mut value = String::new();
        for option in ["a", "b", "c", "d"] {
            let next = toggle_multi_choice(&q, &value, option, true);
            assert!(next.score >= answer.score, "adding {option} decreased score");
            value = next.value.clone();
            answer = next;
        }
    }

    #[test]
    fn sum_mode_recomputes_after_deselection() {
        let q = sum_question(&[("a", 40), ("b", 50)], 100);
        let selected = toggle_multi_choice(&q, "a", "b", true);
        assert_eq!(selected.score, 90);
        let deselected = toggle_multi_choice(&q, &selected.value, "a", false);
        assert_eq!(deselected.value, "b");
        assert_eq!(deselected.score, 50);
    }

    #[test]
    fn count_mode_step_table() {
        let q = count_question();
        assert_eq!(score_answer(q, "").score, 10);
        assert_eq!(score_answer(q, "predictive_maintenance").score, 40);
        assert_eq!(score_answer(q, "predictive_maintenance,route_optimization").score, 70);
        assert_eq!(
            score_answer(q, "predictive_maintenance,route_optimization,anomaly_detection").score,
            70
        );
        assert_eq!(
            score_answer(
                q,
                "predictive_maintenance,route_optimization,anomaly_detection,auto_reporting"
            )
            .score,
            100
        );
    }

    #[test]
    fn count_mode_exclusive_value_never_counts() {
        let q = count_question();
        assert_eq!(score_answer(q, "not_relevant").score, 10);
        // Even a malformed pre-joined value mixing both is counted without
        // the exclusive member.
        assert_eq!(score_answer(q, "not_relevant,predictive_maintenance").score, 40);
    }

    #[test]
    fn count_mode_selecting_exclusive_clears_others() {
        let q = count_question();
        let mut answer = toggle_multi_choice(q, "", "predictive_maintenance", true);
        answer = toggle_multi_choice(q, &answer.value, "route_optimization", true);
        answer = toggle_multi_choice(q, &answer.value, "anomaly_detection", true);
        assert_eq!(answer.score, 70);

        let cleared = toggle_multi_choice(q, &answer.value, "not_relevant", true);
        assert_eq!(cleared.value, "not_relevant");
        assert_eq!(cleared.score, 10);
    }

    #[test]
    fn count_mode_selecting_regular_option_drops_exclusive() {
        let q = count_question();
        let answer = toggle_multi_choice(q, "not_relevant", "route_optimization", true);
        assert_eq!(answer.value, "route_optimization");
        assert_eq!(answer.score, 40);
    }

    #[test]
    fn count_mode_deselection_just_removes() {
        let q = count_question();
        let answer = toggle_multi_choice(
            q,
            "predictive_maintenance,route_optimization",
            "route_optimization",
            false,
        );
        assert_eq!(answer.value, "predictive_maintenance");
        assert_eq!(answer.score, 40);
    }

    fn lowest_options(sector: &str, dimension: Dimension) -> BTreeMap<String, String> {
        catalog::questions_for_sector(sector)
            .iter()
            .filter(|q| q.dimension == dimension)
            .map(|q| {
                let lowest = q.options.iter().min_by_key(|o| o.score).unwrap();
                (q.id.clone(), lowest.value.clone())
            })
            .collect()
    }

    fn highest_single_options(sector: &str, dimension: Dimension) -> BTreeMap<String, String> {
        catalog::questions_for_sector(sector)
            .iter()
            .filter(|q| q.dimension == dimension && matches!(q.kind, QuestionKind::SingleChoice))
            .map(|q| {
                let highest = q.options.iter().max_by_key(|o| o.score).unwrap();
                (q.id.clone(), highest.value.clone())
            })
            .collect()
    }

    #[test]
    fn transport_mixed_extremes_scores_sixty_intermediaire() {
        // data floor + pilotage/automation ceiling -> 0*0.4 + 100*0.4 + 100*0.2 = 60.
        let mut raw = lowest_options("transport", Dimension::Data);
        raw.extend(highest_single_options("transport", Dimension::Pilotage));
        raw.extend(highest_single_options("transport", Dimension::Automation));
        // Four interests max out the count-mode question too.
        raw.insert(
            "tl_q10".to_string(),
            "predictive_maintenance,route_optimization,anomaly_detection,auto_reporting".to_string(),
        );

        let answers = score_submission("transport", &raw);
        let result = compute_result("transport", &answers);

        let data = &result.dimension_scores[0];
        assert_eq!(data.dimension, Dimension::Data);
        // Every transport data question has a zero-score floor option.
        assert_eq!(data.score, 0);
        assert_eq!(data.percentage, 0);

        assert_eq!(result.dimension_scores[1].percentage, 100);
        assert_eq!(result.dimension_scores[2].percentage, 100);
        assert_eq!(result.percentage, 60);
        assert_eq!(result.maturity_level, MaturityLevel::Intermediaire);
    }

    #[test]
    fn unanswered_questions_penalize_the_denominator() {
        // Answer only tl_q1 at its best option; the other three data
        // questions still count 100 each toward the max.
        let raw = BTreeMap::from([("tl_q1".to_string(), "centralized".to_string())]);
        let answers = score_submission("transport", &raw);
        let result = compute_result("transport", &answers);

        let data = &result.dimension_scores[0];
        assert_eq!(data.score, 90);
        assert_eq!(data.max_score, 400);
        assert_eq!(data.percentage, 23);
    }

    #[test]
    fn empty_answer_set_scores_zero_debutant() {
        let result = compute_result("transport", &BTreeMap::new());
        assert_eq!(result.total_score, 0);
        assert_eq!(result.percentage, 0);
        assert_eq!(result.maturity_level, MaturityLevel::Debutant);
        assert_eq!(result.max_possible_score, 1000);
    }

    #[test]
    fn scoring_is_idempotent() {
        let mut raw = lowest_options("retail", Dimension::Data);
        raw.extend(highest_single_options("retail", Dimension::Pilotage));
        raw.insert("rt_q10".to_string(), "demand_forecast,dynamic_pricing".to_string());

        let answers = score_submission("retail", &raw);
        let first = compute_result("retail", &answers);
        let second = compute_result("retail", &answers);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn unknown_question_ids_are_dropped() {
        let raw = BTreeMap::from([
            ("tl_q1".to_string(), "centralized".to_string()),
            ("rt_q1".to_string(), "centralized".to_string()),
        ]);
        let answers = score_submission("transport", &raw);
        assert_eq!(answers.len(), 1);
        assert!(answers.contains_key("tl_q1"));
    }

    #[test]
    fn answer_scores_stay_within_bounds() {
        for sector in ["transport", "retail", "energy", "unknown"] {
            for question in catalog::questions_for_sector(sector) {
                let everything: Vec<String> =
                    question.options.iter().map(|o| o.value.clone()).collect();
                let answer = score_answer(question, &everything.join(","));
                assert!(answer.score >= 0);
                assert!(answer.score <= question.max_score, "question {}", question.id);
            }
        }
    }
}
