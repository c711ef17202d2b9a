//! Rule tables for the site's forms.

use super::form::{FieldRule, RuleTable};

/// Names accepted by [`by_name`].
pub const FORM_NAMES: &[&str] = &["donor", "recipient", "request", "contact"];

fn table(entries: impl IntoIterator<Item = (&'static str, FieldRule)>) -> RuleTable {
    entries
        .into_iter()
        .map(|(field, rule)| (field.to_string(), rule))
        .collect()
}

/// Donor registration form.
#[must_use]
pub fn donor_registration() -> RuleTable {
    table([
        ("name", FieldRule::new("Name").required().min_length(2)),
        ("age", FieldRule::new("Age").required().min(18).max(65)),
        ("bloodType", FieldRule::new("Blood type").required()),
        ("phone", FieldRule::new("Phone").required().phone()),
        ("email", FieldRule::new("Email").required().email()),
        ("address", FieldRule::new("Address").required().min_length(5)),
    ])
}

/// Recipient (acceptor) registration form.
#[must_use]
pub fn recipient_registration() -> RuleTable {
    table([
        ("name", FieldRule::new("Name").required().min_length(2)),
        ("age", FieldRule::new("Age").required().min(1).max(120)),
        ("bloodTypeNeeded", FieldRule::new("Blood type needed").required()),
        ("phone", FieldRule::new("Phone").required().phone()),
        ("email", FieldRule::new("Email").required().email()),
        ("condition", FieldRule::new("Medical condition").required()),
        ("urgency", FieldRule::new("Urgency").required()),
    ])
}

/// Blood request form.
#[must_use]
pub fn blood_request() -> RuleTable {
    table([
        ("patientName", FieldRule::new("Patient name").required().min_length(2)),
        ("bloodType", FieldRule::new("Blood type").required()),
        (
            "unitsRequired",
            FieldRule::new("Units required").required().min(1).max(20),
        ),
        ("hospital", FieldRule::new("Hospital").required()),
        ("contactName", FieldRule::new("Contact name").required().min_length(2)),
        ("phone", FieldRule::new("Phone").required().phone()),
        ("email", FieldRule::new("Email").required().email()),
    ])
}

/// Contact form.
#[must_use]
pub fn contact() -> RuleTable {
    table([
        ("name", FieldRule::new("Name").required().min_length(2)),
        ("email", FieldRule::new("Email").required().email()),
        ("phone", FieldRule::new("Phone").phone()),
        ("subject", FieldRule::new("Subject").required()),
        ("message", FieldRule::new("Message").required().min_length(10)),
    ])
}

/// Look up a form's rule table by name (see [`FORM_NAMES`]).
#[must_use]
pub fn by_name(name: &str) -> Option<RuleTable> {
    match name {
        "donor" => Some(donor_registration()),
        "recipient" => Some(recipient_registration()),
        "request" => Some(blood_request()),
        "contact" => Some(contact()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FormData;
    use crate::validation::validate_form;

    #[test]
    fn test_every_named_form_resolves() {
        for name in FORM_NAMES {
            let rules = by_name(name).unwrap();
            assert!(!rules.is_empty(), "{name} has no rules");
            assert!(rules.values().all(|r| !r.label.is_empty()));
        }
        assert!(by_name("survey").is_none());
    }

    #[test]
    fn test_empty_donor_form_reports_required_fields() {
        let errors = validate_form(&FormData::new(), &donor_registration());
        assert_eq!(errors.len(), 6);
        assert_eq!(errors["bloodType"], "Blood type is required");
    }

    #[test]
    fn test_contact_phone_is_optional() {
        let form = FormData::from([
            ("name".to_string(), "Asha Rao".to_string()),
            ("email".to_string(), "asha@example.com".to_string()),
            ("subject".to_string(), "Blood camp".to_string()),
            ("message".to_string(), "When is the next camp near me?".to_string()),
        ]);
        assert!(validate_form(&form, &contact()).is_empty());
    }

    #[test]
    fn test_request_units_bounds() {
        let rules = blood_request();
        let rule = &rules["unitsRequired"];
        assert_eq!(
            rule.check(Some("25")),
            Some("Units required must not exceed 20".to_string())
        );
        assert!(rule.check(Some("2")).is_none());
    }
}
