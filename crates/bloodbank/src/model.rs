//! Core record types for bloodbank.
//!
//! This module defines the flat records kept in each collection, the drafts
//! callers submit to create them, and the small enumerations (blood type,
//! urgency, request status) they are tagged with.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A form payload: field name to raw submitted text.
pub type FormData = BTreeMap<String, String>;

/// One of the eight ABO/Rh blood-type labels.
///
/// Declaration order is the canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodType {
    /// A positive.
    #[serde(rename = "A+")]
    APositive,
    /// A negative.
    #[serde(rename = "A-", alias = "A−")]
    ANegative,
    /// B positive.
    #[serde(rename = "B+")]
    BPositive,
    /// B negative.
    #[serde(rename = "B-", alias = "B−")]
    BNegative,
    /// AB positive.
    #[serde(rename = "AB+")]
    AbPositive,
    /// AB negative.
    #[serde(rename = "AB-", alias = "AB−")]
    AbNegative,
    /// O positive.
    #[serde(rename = "O+")]
    OPositive,
    /// O negative.
    #[serde(rename = "O-", alias = "O−")]
    ONegative,
}

impl BloodType {
    /// All blood types in canonical order.
    pub const ALL: [BloodType; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::AbPositive,
        Self::AbNegative,
        Self::OPositive,
        Self::ONegative,
    ];

    /// The persisted token for this type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }
}

impl std::fmt::Display for BloodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = Error;

    /// Parses a token such as `AB+`. Case-insensitive; accepts `−` (U+2212) for `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('\u{2212}', "-").to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| Error::invalid_blood_type(s))
    }
}

/// How urgently a recipient needs blood.
///
/// Ordered most urgent first, so an ascending sort puts `High` at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Urgency {
    /// Needed immediately.
    #[serde(alias = "high")]
    High,
    /// Needed soon.
    #[serde(alias = "medium")]
    Medium,
    /// Scheduled need.
    #[serde(alias = "low")]
    Low,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => f.pad("High"),
            Self::Medium => f.pad("Medium"),
            Self::Low => f.pad("Low"),
        }
    }
}

impl FromStr for Urgency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(Error::unknown_value("urgency", s)),
        }
    }
}

/// Status of a blood request ticket.
///
/// Requests are created `Pending`; no transition between statuses is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Newly submitted.
    Pending,
    /// Being worked on.
    Active,
    /// Blood delivered.
    Fulfilled,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.pad("pending"),
            Self::Active => f.pad("active"),
            Self::Fulfilled => f.pad("fulfilled"),
        }
    }
}

/// The persisted UI theme token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme.
    #[default]
    Light,
    /// Dark theme.
    Dark,
}

impl Theme {
    /// The raw token stored under the `theme` key.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(Error::unknown_value("theme", s)),
        }
    }
}

/// A collection element persisted as part of a JSON array under [`Record::KEY`].
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Storage key of the collection.
    const KEY: &'static str;

    /// Caller-supplied fields, without id or timestamp.
    type Draft;

    /// Build the stored record from a draft, an assigned id and the creation instant.
    fn from_draft(draft: Self::Draft, id: String, created_at: DateTime<Utc>) -> Self;

    /// The assigned id.
    fn id(&self) -> &str;

    /// The creation instant.
    fn created_at(&self) -> DateTime<Utc>;
}

/// A record listed in a searchable directory (donors, recipients).
pub trait DirectoryEntry: Record {
    /// Display name, matched by name search.
    fn name(&self) -> &str;

    /// The blood type this entry is filtered on.
    fn blood_type(&self) -> BloodType;

    /// Free-text location, matched by quick search.
    fn location(&self) -> Option<&str>;
}

/// A registered blood donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    /// Assigned at creation.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Donor's blood type.
    pub blood_type: BloodType,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Postal address.
    pub address: String,
    /// When the donor was registered.
    pub registration_date: DateTime<Utc>,
}

/// Fields submitted to register a donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorDraft {
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Donor's blood type.
    pub blood_type: BloodType,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Postal address.
    pub address: String,
}

impl DonorDraft {
    /// Render as the form payload checked by [`crate::validation::rules::donor_registration`].
    #[must_use]
    pub fn to_form(&self) -> FormData {
        FormData::from([
            ("name".to_string(), self.name.clone()),
            ("age".to_string(), self.age.to_string()),
            ("bloodType".to_string(), self.blood_type.to_string()),
            ("phone".to_string(), self.phone.clone()),
            ("email".to_string(), self.email.clone()),
            ("address".to_string(), self.address.clone()),
        ])
    }
}

impl Record for Donor {
    const KEY: &'static str = "donors";
    type Draft = DonorDraft;

    fn from_draft(draft: DonorDraft, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            age: draft.age,
            blood_type: draft.blood_type,
            phone: draft.phone,
            email: draft.email,
            address: draft.address,
            registration_date: created_at,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.registration_date
    }
}

impl DirectoryEntry for Donor {
    fn name(&self) -> &str {
        &self.name
    }

    fn blood_type(&self) -> BloodType {
        self.blood_type
    }

    fn location(&self) -> Option<&str> {
        Some(&self.address)
    }
}

/// A person recorded as needing blood (an "acceptor").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    /// Assigned at creation.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// The blood type required.
    pub blood_type_needed: BloodType,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Medical reason for the need.
    pub condition: String,
    /// How urgent the need is.
    pub urgency: Urgency,
    /// Treating hospital, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital: Option<String>,
    /// When the recipient was registered.
    pub registration_date: DateTime<Utc>,
}

/// Fields submitted to register a recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientDraft {
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// The blood type required.
    pub blood_type_needed: BloodType,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Medical reason for the need.
    pub condition: String,
    /// How urgent the need is.
    pub urgency: Urgency,
    /// Treating hospital, when known.
    #[serde(default)]
    pub hospital: Option<String>,
}

impl RecipientDraft {
    /// Render as the form payload checked by [`crate::validation::rules::recipient_registration`].
    #[must_use]
    pub fn to_form(&self) -> FormData {
        let mut form = FormData::from([
            ("name".to_string(), self.name.clone()),
            ("age".to_string(), self.age.to_string()),
            ("bloodTypeNeeded".to_string(), self.blood_type_needed.to_string()),
            ("phone".to_string(), self.phone.clone()),
            ("email".to_string(), self.email.clone()),
            ("condition".to_string(), self.condition.clone()),
            ("urgency".to_string(), self.urgency.to_string()),
        ]);
        if let Some(hospital) = &self.hospital {
            form.insert("hospital".to_string(), hospital.clone());
        }
        form
    }
}

impl Record for Recipient {
    const KEY: &'static str = "acceptors";
    type Draft = RecipientDraft;

    fn from_draft(draft: RecipientDraft, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            age: draft.age,
            blood_type_needed: draft.blood_type_needed,
            phone: draft.phone,
            email: draft.email,
            condition: draft.condition,
            urgency: draft.urgency,
            hospital: draft.hospital,
            registration_date: created_at,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.registration_date
    }
}

impl DirectoryEntry for Recipient {
    fn name(&self) -> &str {
        &self.name
    }

    fn blood_type(&self) -> BloodType {
        self.blood_type_needed
    }

    fn location(&self) -> Option<&str> {
        self.hospital.as_deref()
    }
}

/// A request ticket for blood units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    /// Assigned at creation.
    pub id: String,
    /// Patient who needs the blood.
    pub patient_name: String,
    /// Blood type requested.
    pub blood_type: BloodType,
    /// Number of units requested.
    pub units_required: u32,
    /// Hospital where the units are needed.
    pub hospital: String,
    /// Person filing the request.
    pub contact_name: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Requester's stated urgency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    /// Free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Ticket status.
    pub status: RequestStatus,
    /// When the request was filed.
    pub request_date: DateTime<Utc>,
}

/// Fields submitted to file a blood request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequestDraft {
    /// Patient who needs the blood.
    pub patient_name: String,
    /// Blood type requested.
    pub blood_type: BloodType,
    /// Number of units requested.
    pub units_required: u32,
    /// Hospital where the units are needed.
    pub hospital: String,
    /// Person filing the request.
    pub contact_name: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Requester's stated urgency.
    #[serde(default)]
    pub urgency: Option<Urgency>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl BloodRequestDraft {
    /// Render as the form payload checked by [`crate::validation::rules::blood_request`].
    #[must_use]
    pub fn to_form(&self) -> FormData {
        let mut form = FormData::from([
            ("patientName".to_string(), self.patient_name.clone()),
            ("bloodType".to_string(), self.blood_type.to_string()),
            ("unitsRequired".to_string(), self.units_required.to_string()),
            ("hospital".to_string(), self.hospital.clone()),
            ("contactName".to_string(), self.contact_name.clone()),
            ("phone".to_string(), self.phone.clone()),
            ("email".to_string(), self.email.clone()),
        ]);
        if let Some(urgency) = self.urgency {
            form.insert("urgency".to_string(), urgency.to_string());
        }
        if let Some(notes) = &self.notes {
            form.insert("notes".to_string(), notes.clone());
        }
        form
    }
}

impl Record for BloodRequest {
    const KEY: &'static str = "bloodRequests";
    type Draft = BloodRequestDraft;

    fn from_draft(draft: BloodRequestDraft, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            patient_name: draft.patient_name,
            blood_type: draft.blood_type,
            units_required: draft.units_required,
            hospital: draft.hospital,
            contact_name: draft.contact_name,
            phone: draft.phone,
            email: draft.email,
            urgency: draft.urgency,
            notes: draft.notes,
            status: RequestStatus::Pending,
            request_date: created_at,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.request_date
    }
}

/// A contact-form message. Written for audit, never read back by the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    /// Assigned at creation.
    pub id: String,
    /// Sender's name.
    pub name: String,
    /// Sender's email.
    pub email: String,
    /// Sender's phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Message subject.
    pub subject: String,
    /// Message body.
    pub message: String,
    /// When the message was submitted.
    pub submission_date: DateTime<Utc>,
}

/// Fields submitted through the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDraft {
    /// Sender's name.
    pub name: String,
    /// Sender's email.
    pub email: String,
    /// Sender's phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Message subject.
    pub subject: String,
    /// Message body.
    pub message: String,
}

impl ContactDraft {
    /// Render as the form payload checked by [`crate::validation::rules::contact`].
    #[must_use]
    pub fn to_form(&self) -> FormData {
        let mut form = FormData::from([
            ("name".to_string(), self.name.clone()),
            ("email".to_string(), self.email.clone()),
            ("subject".to_string(), self.subject.clone()),
            ("message".to_string(), self.message.clone()),
        ]);
        if let Some(phone) = &self.phone {
            form.insert("phone".to_string(), phone.clone());
        }
        form
    }
}

impl Record for ContactSubmission {
    const KEY: &'static str = "contactSubmissions";
    type Draft = ContactDraft;

    fn from_draft(draft: ContactDraft, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            subject: draft.subject,
            message: draft.message,
            submission_date: created_at,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.submission_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_donor_draft() -> DonorDraft {
        DonorDraft {
            name: "Garvita Jain".to_string(),
            age: 19,
            blood_type: BloodType::APositive,
            phone: "+919876543210".to_string(),
            email: "garvita.jain@email.com".to_string(),
            address: "123 Medical Street, Healthcare City".to_string(),
        }
    }

    #[test]
    fn test_blood_type_tokens() {
        let tokens: Vec<&str> = BloodType::ALL.iter().map(BloodType::as_str).collect();
        assert_eq!(tokens, ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"]);
    }

    #[test]
    fn test_blood_type_parse() {
        assert_eq!("AB+".parse::<BloodType>().unwrap(), BloodType::AbPositive);
        assert_eq!(" o- ".parse::<BloodType>().unwrap(), BloodType::ONegative);
        assert_eq!("B\u{2212}".parse::<BloodType>().unwrap(), BloodType::BNegative);
    }

    #[test]
    fn test_blood_type_parse_rejects_unknown() {
        let err = "C+".parse::<BloodType>().unwrap_err();
        assert!(matches!(err, Error::InvalidBloodType(ref t) if t == "C+"));
        assert!("".parse::<BloodType>().is_err());
        assert!("A".parse::<BloodType>().is_err());
    }

    #[test]
    fn test_blood_type_serde_uses_tokens() {
        let json = serde_json::to_string(&BloodType::AbNegative).unwrap();
        assert_eq!(json, "\"AB-\"");
        let parsed: BloodType = serde_json::from_str("\"O\u{2212}\"").unwrap();
        assert_eq!(parsed, BloodType::ONegative);
    }

    #[test]
    fn test_urgency_sorts_most_urgent_first() {
        let mut levels = vec![Urgency::Low, Urgency::High, Urgency::Medium];
        levels.sort();
        assert_eq!(levels, [Urgency::High, Urgency::Medium, Urgency::Low]);
    }

    #[test]
    fn test_urgency_accepts_lowercase() {
        let parsed: Urgency = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(parsed, Urgency::High);
        assert_eq!("Medium".parse::<Urgency>().unwrap(), Urgency::Medium);

        let err = "soon".parse::<Urgency>().unwrap_err();
        assert!(err.is_user_input());
        assert_eq!(err.to_string(), "unknown urgency: \"soon\"");
    }

    #[test]
    fn test_request_status_serde() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::Fulfilled).unwrap(),
            "\"fulfilled\""
        );
        assert_eq!(RequestStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn test_donor_json_uses_camel_case() {
        let donor = Donor::from_draft(test_donor_draft(), "1".to_string(), Utc::now());
        let value = serde_json::to_value(&donor).unwrap();
        assert_eq!(value["bloodType"], "A+");
        assert!(value.get("registrationDate").is_some());
        assert!(value.get("blood_type").is_none());
    }

    #[test]
    fn test_from_draft_sets_id_and_timestamp() {
        let now = Utc::now();
        let donor = Donor::from_draft(test_donor_draft(), "42".to_string(), now);
        assert_eq!(donor.id(), "42");
        assert_eq!(donor.created_at(), now);
        assert_eq!(donor.name, "Garvita Jain");
    }

    #[test]
    fn test_blood_request_starts_pending() {
        let draft = BloodRequestDraft {
            patient_name: "Amit Kumar".to_string(),
            blood_type: BloodType::OPositive,
            units_required: 2,
            hospital: "Metro Medical Center".to_string(),
            contact_name: "Ravi Kumar".to_string(),
            phone: "+919812345678".to_string(),
            email: "ravi@example.com".to_string(),
            urgency: None,
            notes: None,
        };
        let request = BloodRequest::from_draft(draft, "7".to_string(), Utc::now());
        assert_eq!(request.status, RequestStatus::Pending);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["status"], "pending");
        assert!(value.get("notes").is_none());
    }

    #[test]
    fn test_recipient_location_is_hospital() {
        let draft = RecipientDraft {
            name: "Bhawana Sen".to_string(),
            age: 25,
            blood_type_needed: BloodType::BPositive,
            phone: "+919876543212".to_string(),
            email: "bhawana.sen@email.com".to_string(),
            condition: "Surgery requirement".to_string(),
            urgency: Urgency::High,
            hospital: Some("City General Hospital".to_string()),
        };
        let recipient = Recipient::from_draft(draft, "1".to_string(), Utc::now());
        assert_eq!(recipient.location(), Some("City General Hospital"));
        assert_eq!(recipient.blood_type(), BloodType::BPositive);
    }

    #[test]
    fn test_draft_to_form_keys() {
        let form = test_donor_draft().to_form();
        assert_eq!(form["bloodType"], "A+");
        assert_eq!(form["age"], "19");

        let contact = ContactDraft {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
            subject: "Camp".to_string(),
            message: "When is the next camp?".to_string(),
        };
        assert!(!contact.to_form().contains_key("phone"));
    }
}
