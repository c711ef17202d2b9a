//! Donor eligibility screening.

use serde::{Deserialize, Serialize};

use crate::config::EligibilityConfig;

/// A yes/no questionnaire answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    /// Yes.
    Yes,
    /// No.
    No,
}

impl Answer {
    fn is_yes(answer: Option<Self>) -> bool {
        answer == Some(Self::Yes)
    }
}

/// The eligibility questionnaire. An unanswered question never disqualifies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Questionnaire {
    /// Age in years.
    pub age: Option<u32>,
    /// Weight in kilograms.
    pub weight: Option<f64>,
    /// Donated blood in the last 3 months.
    pub recent_donation: Option<Answer>,
    /// Ill in the last 2 weeks.
    pub recent_illness: Option<Answer>,
    /// Has a chronic condition.
    pub chronic_conditions: Option<Answer>,
}

/// Outcome of a screening. `eligible` is true iff `reasons` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    /// Whether every rule passed.
    pub eligible: bool,
    /// One message per failed rule, in rule order.
    pub reasons: Vec<String>,
}

/// Age and weight thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityCriteria {
    /// Youngest eligible age.
    pub min_age: u32,
    /// Oldest eligible age.
    pub max_age: u32,
    /// Lightest eligible weight in kilograms.
    pub min_weight_kg: f64,
}

impl Default for EligibilityCriteria {
    fn default() -> Self {
        Self::from(&EligibilityConfig::default())
    }
}

impl From<&EligibilityConfig> for EligibilityCriteria {
    fn from(config: &EligibilityConfig) -> Self {
        Self {
            min_age: config.min_age,
            max_age: config.max_age,
            min_weight_kg: config.min_weight_kg,
        }
    }
}

/// Screen a questionnaire with the standard thresholds (18-65 years, 50 kg).
#[must_use]
pub fn check_eligibility(input: &Questionnaire) -> Eligibility {
    check_eligibility_with(input, &EligibilityCriteria::default())
}

/// Screen a questionnaire against `criteria`.
///
/// All five rules are evaluated, so several reasons can be reported at once.
#[must_use]
pub fn check_eligibility_with(input: &Questionnaire, criteria: &EligibilityCriteria) -> Eligibility {
    let mut reasons = Vec::new();

    if let Some(age) = input.age {
        if age < criteria.min_age || age > criteria.max_age {
            reasons.push(format!(
                "Age must be between {}-{} years",
                criteria.min_age, criteria.max_age
            ));
        }
    }

    if let Some(weight) = input.weight {
        if weight < criteria.min_weight_kg {
            reasons.push(format!(
                "Weight must be at least {} kg",
                criteria.min_weight_kg
            ));
        }
    }

    if Answer::is_yes(input.recent_donation) {
        reasons.push("Must wait 3 months between donations".to_string());
    }

    if Answer::is_yes(input.recent_illness) {
        reasons.push("Must be free from illness for at least 2 weeks".to_string());
    }

    if Answer::is_yes(input.chronic_conditions) {
        reasons.push("Chronic conditions may affect eligibility".to_string());
    }

    Eligibility {
        eligible: reasons.is_empty(),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questionnaire(age: u32, weight: f64, donation: Answer) -> Questionnaire {
        Questionnaire {
            age: Some(age),
            weight: Some(weight),
            recent_donation: Some(donation),
            recent_illness: Some(Answer::No),
            chronic_conditions: Some(Answer::No),
        }
    }

    #[test]
    fn test_underage() {
        let result = check_eligibility(&questionnaire(17, 60.0, Answer::No));
        assert_eq!(
            result,
            Eligibility {
                eligible: false,
                reasons: vec!["Age must be between 18-65 years".to_string()],
            }
        );
    }

    #[test]
    fn test_rules_are_not_short_circuited() {
        let result = check_eligibility(&questionnaire(30, 40.0, Answer::Yes));
        assert!(!result.eligible);
        assert_eq!(
            result.reasons,
            vec![
                "Weight must be at least 50 kg".to_string(),
                "Must wait 3 months between donations".to_string(),
            ]
        );
    }

    #[test]
    fn test_eligible() {
        let result = check_eligibility(&questionnaire(30, 60.0, Answer::No));
        assert_eq!(
            result,
            Eligibility {
                eligible: true,
                reasons: vec![],
            }
        );
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        assert!(check_eligibility(&questionnaire(18, 50.0, Answer::No)).eligible);
        assert!(check_eligibility(&questionnaire(65, 50.0, Answer::No)).eligible);
        assert!(!check_eligibility(&questionnaire(66, 50.0, Answer::No)).eligible);
        assert!(!check_eligibility(&questionnaire(30, 49.9, Answer::No)).eligible);
    }

    #[test]
    fn test_all_reasons_in_order() {
        let input = Questionnaire {
            age: Some(70),
            weight: Some(45.0),
            recent_donation: Some(Answer::Yes),
            recent_illness: Some(Answer::Yes),
            chronic_conditions: Some(Answer::Yes),
        };
        let result = check_eligibility(&input);
        assert_eq!(
            result.reasons,
            vec![
                "Age must be between 18-65 years",
                "Weight must be at least 50 kg",
                "Must wait 3 months between donations",
                "Must be free from illness for at least 2 weeks",
                "Chronic conditions may affect eligibility",
            ]
        );
    }

    #[test]
    fn test_absent_fields_do_not_fail() {
        let result = check_eligibility(&Questionnaire::default());
        assert!(result.eligible);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_custom_criteria_in_messages() {
        let criteria = EligibilityCriteria {
            min_age: 17,
            max_age: 70,
            min_weight_kg: 45.5,
        };
        let result = check_eligibility_with(&questionnaire(16, 45.0, Answer::No), &criteria);
        assert_eq!(
            result.reasons,
            vec![
                "Age must be between 17-70 years".to_string(),
                "Weight must be at least 45.5 kg".to_string(),
            ]
        );
    }

    #[test]
    fn test_questionnaire_from_json() {
        let json = r#"{"age":30,"weight":60,"recentDonation":"no","recentIllness":"no","chronicConditions":"yes"}"#;
        let input: Questionnaire = serde_json::from_str(json).unwrap();
        let result = check_eligibility(&input);
        assert_eq!(
            result.reasons,
            vec!["Chronic conditions may affect eligibility".to_string()]
        );
    }
}
