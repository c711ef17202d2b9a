//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands and the
//! conversions from parsed arguments to domain drafts.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::{
    BloodRequestDraft, BloodType, ContactDraft, DonorDraft, RecipientDraft, Theme, Urgency,
};
use crate::validation::{Answer, Questionnaire};

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Urgency argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UrgencyArg {
    /// Needed immediately
    High,
    /// Needed soon
    Medium,
    /// Scheduled need
    Low,
}

impl From<UrgencyArg> for Urgency {
    fn from(arg: UrgencyArg) -> Self {
        match arg {
            UrgencyArg::High => Self::High,
            UrgencyArg::Medium => Self::Medium,
            UrgencyArg::Low => Self::Low,
        }
    }
}

/// Yes/no questionnaire answer argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnswerArg {
    /// Yes
    Yes,
    /// No
    No,
}

impl From<AnswerArg> for Answer {
    fn from(arg: AnswerArg) -> Self {
        match arg {
            AnswerArg::Yes => Self::Yes,
            AnswerArg::No => Self::No,
        }
    }
}

/// Theme argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    /// Light theme
    Light,
    /// Dark theme
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Self::Light,
            ThemeArg::Dark => Self::Dark,
        }
    }
}

/// Which form's rule table to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormKind {
    /// Donor registration
    Donor,
    /// Recipient registration
    Recipient,
    /// Blood request
    Request,
    /// Contact message
    Contact,
}

impl FormKind {
    /// Name understood by [`crate::validation::rules::by_name`].
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donor => "donor",
            Self::Recipient => "recipient",
            Self::Request => "request",
            Self::Contact => "contact",
        }
    }
}

/// Health questions asked before donating.
#[derive(Debug, Clone, Args)]
pub struct QuestionnaireArgs {
    /// Weight in kilograms
    #[arg(long)]
    pub weight: Option<f64>,

    /// Donated blood in the last 3 months
    #[arg(long, value_enum)]
    pub recent_donation: Option<AnswerArg>,

    /// Ill in the last 2 weeks
    #[arg(long, value_enum)]
    pub recent_illness: Option<AnswerArg>,

    /// Has a chronic condition
    #[arg(long, value_enum)]
    pub chronic_conditions: Option<AnswerArg>,
}

impl QuestionnaireArgs {
    /// Build a questionnaire for a person of the given age.
    #[must_use]
    pub fn to_questionnaire(&self, age: Option<u32>) -> Questionnaire {
        Questionnaire {
            age,
            weight: self.weight,
            recent_donation: self.recent_donation.map(Answer::from),
            recent_illness: self.recent_illness.map(Answer::from),
            chronic_conditions: self.chronic_conditions.map(Answer::from),
        }
    }
}

/// Donor directory commands.
#[derive(Debug, Subcommand)]
pub enum DonorCommand {
    /// List all donors
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Search donors by name and blood type
    Search(SearchArgs),

    /// Show one donor
    Find {
        /// Donor id
        id: String,
    },

    /// Register a donor after screening
    Register(RegisterDonorArgs),
}

/// Recipient directory commands.
#[derive(Debug, Subcommand)]
pub enum RecipientCommand {
    /// List all recipients
    List {
        /// Order most urgent first
        #[arg(long)]
        by_urgency: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Search recipients by name and needed blood type
    Search(SearchArgs),

    /// Show one recipient
    Find {
        /// Recipient id
        id: String,
    },

    /// Register a recipient
    Register(RegisterRecipientArgs),
}

/// Directory search arguments.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Name substring (case-insensitive); with --quick, matches name, blood type or location
    pub query: Option<String>,

    /// Only entries with this blood type (e.g. "O+", "AB-")
    #[arg(short, long)]
    pub blood_type: Option<String>,

    /// Match the query against name, blood type and location
    #[arg(long, conflicts_with = "blood_type")]
    pub quick: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Donor registration arguments.
#[derive(Debug, Args)]
pub struct RegisterDonorArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// Age in years
    #[arg(long)]
    pub age: u32,

    /// Blood type (e.g. "A+")
    #[arg(long)]
    pub blood_type: String,

    /// Contact phone
    #[arg(long)]
    pub phone: String,

    /// Contact email
    #[arg(long)]
    pub email: String,

    /// Postal address
    #[arg(long)]
    pub address: String,

    /// Eligibility answers
    #[command(flatten)]
    pub health: QuestionnaireArgs,
}

impl RegisterDonorArgs {
    /// Split into the donor draft and the eligibility questionnaire.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBloodType` for an unknown blood-type token.
    pub fn into_parts(self) -> crate::Result<(DonorDraft, Questionnaire)> {
        let questionnaire = self.health.to_questionnaire(Some(self.age));
        let draft = DonorDraft {
            name: self.name,
            age: self.age,
            blood_type: self.blood_type.parse::<BloodType>()?,
            phone: self.phone,
            email: self.email,
            address: self.address,
        };
        Ok((draft, questionnaire))
    }
}

/// Recipient registration arguments.
#[derive(Debug, Args)]
pub struct RegisterRecipientArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// Age in years
    #[arg(long)]
    pub age: u32,

    /// Blood type needed (e.g. "B+")
    #[arg(long)]
    pub blood_type: String,

    /// Contact phone
    #[arg(long)]
    pub phone: String,

    /// Contact email
    #[arg(long)]
    pub email: String,

    /// Medical condition
    #[arg(long)]
    pub condition: String,

    /// Urgency of the need
    #[arg(long, value_enum)]
    pub urgency: UrgencyArg,

    /// Treating hospital
    #[arg(long)]
    pub hospital: Option<String>,
}

impl TryFrom<RegisterRecipientArgs> for RecipientDraft {
    type Error = crate::Error;

    fn try_from(args: RegisterRecipientArgs) -> crate::Result<Self> {
        Ok(Self {
            name: args.name,
            age: args.age,
            blood_type_needed: args.blood_type.parse()?,
            phone: args.phone,
            email: args.email,
            condition: args.condition,
            urgency: args.urgency.into(),
            hospital: args.hospital,
        })
    }
}

/// Blood request commands.
#[derive(Debug, Subcommand)]
pub enum RequestCommand {
    /// List all blood requests
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// File a blood request
    Submit(SubmitRequestArgs),
}

/// Blood request arguments.
#[derive(Debug, Args)]
pub struct SubmitRequestArgs {
    /// Patient who needs the blood
    #[arg(long)]
    pub patient: String,

    /// Blood type requested
    #[arg(long)]
    pub blood_type: String,

    /// Units required
    #[arg(long)]
    pub units: u32,

    /// Hospital where the units are needed
    #[arg(long)]
    pub hospital: String,

    /// Person filing the request
    #[arg(long)]
    pub contact_name: String,

    /// Contact phone
    #[arg(long)]
    pub phone: String,

    /// Contact email
    #[arg(long)]
    pub email: String,

    /// Urgency of the request
    #[arg(long, value_enum)]
    pub urgency: Option<UrgencyArg>,

    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl TryFrom<SubmitRequestArgs> for BloodRequestDraft {
    type Error = crate::Error;

    fn try_from(args: SubmitRequestArgs) -> crate::Result<Self> {
        Ok(Self {
            patient_name: args.patient,
            blood_type: args.blood_type.parse()?,
            units_required: args.units,
            hospital: args.hospital,
            contact_name: args.contact_name,
            phone: args.phone,
            email: args.email,
            urgency: args.urgency.map(Urgency::from),
            notes: args.notes,
        })
    }
}

/// Contact form commands.
#[derive(Debug, Subcommand)]
pub enum ContactCommand {
    /// Send a contact message
    Submit(ContactArgs),
}

/// Contact message arguments.
#[derive(Debug, Args)]
pub struct ContactArgs {
    /// Your name
    #[arg(long)]
    pub name: String,

    /// Your email
    #[arg(long)]
    pub email: String,

    /// Your phone
    #[arg(long)]
    pub phone: Option<String>,

    /// Subject
    #[arg(long)]
    pub subject: String,

    /// Message body
    #[arg(long)]
    pub message: String,
}

impl From<ContactArgs> for ContactDraft {
    fn from(args: ContactArgs) -> Self {
        Self {
            name: args.name,
            email: args.email,
            phone: args.phone,
            subject: args.subject,
            message: args.message,
        }
    }
}

/// Inventory commands.
#[derive(Debug, Subcommand)]
pub enum InventoryCommand {
    /// Show units and stock level for every blood type
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show units for one blood type
    Get {
        /// Blood type token (e.g. "O-")
        blood_type: String,
    },

    /// Add or remove units (never below zero)
    Adjust {
        /// Blood type token (e.g. "O-")
        blood_type: String,

        /// Units to add; negative to remove
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
}

/// Eligibility commands.
#[derive(Debug, Subcommand)]
pub enum EligibilityCommand {
    /// Screen a prospective donor
    Check {
        /// Age in years
        #[arg(long)]
        age: Option<u32>,

        /// Health answers
        #[command(flatten)]
        health: QuestionnaireArgs,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Form validation arguments.
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Which form's rules to apply
    #[arg(value_enum)]
    pub form: FormKind,

    /// Field values as key=value (e.g. email=a@b.com)
    #[arg(value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
}

fn parse_field(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

/// Theme commands.
#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    /// Show the stored theme
    Show,

    /// Store a theme
    Set {
        /// Theme to store
        #[arg(value_enum)]
        theme: ThemeArg,
    },

    /// Switch between light and dark
    Toggle,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("email=a@b.com").unwrap(),
            ("email".to_string(), "a@b.com".to_string())
        );
        assert_eq!(
            parse_field("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_field("name=").unwrap(),
            ("name".to_string(), String::new())
        );
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }

    #[test]
    fn test_questionnaire_args() {
        let args = QuestionnaireArgs {
            weight: Some(55.0),
            recent_donation: Some(AnswerArg::Yes),
            recent_illness: None,
            chronic_conditions: Some(AnswerArg::No),
        };
        let q = args.to_questionnaire(Some(30));
        assert_eq!(q.age, Some(30));
        assert_eq!(q.recent_donation, Some(Answer::Yes));
        assert_eq!(q.recent_illness, None);
    }

    #[test]
    fn test_register_donor_args_rejects_bad_blood_type() {
        let args = RegisterDonorArgs {
            name: "Asha".to_string(),
            age: 25,
            blood_type: "X".to_string(),
            phone: "+919000000000".to_string(),
            email: "asha@example.com".to_string(),
            address: "Pune".to_string(),
            health: QuestionnaireArgs {
                weight: None,
                recent_donation: None,
                recent_illness: None,
                chronic_conditions: None,
            },
        };
        assert!(matches!(
            args.into_parts().unwrap_err(),
            crate::Error::InvalidBloodType(_)
        ));
    }

    #[test]
    fn test_form_kind_names_resolve() {
        for kind in FormKind::value_variants() {
            assert!(crate::validation::rules::by_name(kind.as_str()).is_some());
        }
    }
}
