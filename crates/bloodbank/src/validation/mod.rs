//! Validation and eligibility rules.
//!
//! Everything here is a pure function of its inputs:
//!
//! - **Form validation**: a rule table maps each field to checks (required,
//!   minimum length, email, phone, numeric bounds); the result maps each
//!   rejected field to a message.
//!
//! - **Eligibility screening**: five independent donor rules (age, weight,
//!   recent donation, recent illness, chronic conditions), all evaluated so
//!   every failing reason is reported.
//!
//! # Example
//!
//! ```
//! use bloodbank::model::FormData;
//! use bloodbank::validation::{check_eligibility, validate_form, Answer, FieldRule, Questionnaire, RuleTable};
//!
//! let rules = RuleTable::from([("email".to_string(), FieldRule::new("Email").email())]);
//! let input = FormData::from([("email".to_string(), "bad".to_string())]);
//! let errors = validate_form(&input, &rules);
//! assert_eq!(errors["email"], "Please enter a valid email address");
//!
//! let screening = check_eligibility(&Questionnaire {
//!     age: Some(17),
//!     weight: Some(60.0),
//!     recent_donation: Some(Answer::No),
//!     ..Questionnaire::default()
//! });
//! assert!(!screening.eligible);
//! ```

mod eligibility;
mod form;
pub mod patterns;
pub mod rules;

pub use eligibility::{
    check_eligibility, check_eligibility_with, Answer, Eligibility, EligibilityCriteria,
    Questionnaire,
};
pub use form::{validate_form, FieldRule, RuleTable, ValidationErrors};
