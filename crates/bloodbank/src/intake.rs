//! Intake workflows: validate, screen, then persist.
//!
//! Each workflow checks a draft against its form's rule table and only
//! writes to the [`RecordStore`] when the draft passes. The store and the
//! validators stay independent of each other; this module is the only place
//! they meet.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{
    BloodRequest, BloodRequestDraft, ContactDraft, ContactSubmission, Donor, DonorDraft, FormData,
    Recipient, RecipientDraft,
};
use crate::records::RecordStore;
use crate::storage::KeyValueStore;
use crate::validation::{
    check_eligibility_with, rules, validate_form, EligibilityCriteria, Questionnaire, RuleTable,
};

fn ensure_valid(form: &FormData, rules: &RuleTable) -> Result<()> {
    let errors = validate_form(form, rules);
    if errors.is_empty() {
        Ok(())
    } else {
        debug!(fields = ?errors.keys().collect::<Vec<_>>(), "Form rejected");
        Err(Error::ValidationFailed(errors))
    }
}

/// Register a donor who passes form validation and eligibility screening.
///
/// The donor is screened at the age given on the draft; any age on the
/// questionnaire is ignored.
///
/// # Errors
///
/// Returns `ValidationFailed` with field messages, `Ineligible` with the
/// screening reasons, or a storage error from the write.
pub fn register_donor<S: KeyValueStore>(
    store: &mut RecordStore<S>,
    draft: DonorDraft,
    questionnaire: &Questionnaire,
    criteria: &EligibilityCriteria,
) -> Result<Donor> {
    ensure_valid(&draft.to_form(), &rules::donor_registration())?;

    let questionnaire = Questionnaire {
        age: Some(draft.age),
        ..questionnaire.clone()
    };
    let screening = check_eligibility_with(&questionnaire, criteria);
    if !screening.eligible {
        debug!(reasons = ?screening.reasons, "Donor screened out");
        return Err(Error::Ineligible(screening.reasons));
    }

    let donor: Donor = store.add(draft)?;
    info!(id = %donor.id, blood_type = %donor.blood_type, "Registered donor");
    Ok(donor)
}

/// Register a recipient who passes form validation.
///
/// # Errors
///
/// Returns `ValidationFailed` or a storage error.
pub fn register_recipient<S: KeyValueStore>(
    store: &mut RecordStore<S>,
    draft: RecipientDraft,
) -> Result<Recipient> {
    ensure_valid(&draft.to_form(), &rules::recipient_registration())?;

    let recipient: Recipient = store.add(draft)?;
    info!(id = %recipient.id, urgency = %recipient.urgency, "Registered recipient");
    Ok(recipient)
}

/// File a blood request. New requests start `pending`.
///
/// # Errors
///
/// Returns `ValidationFailed` or a storage error.
pub fn submit_blood_request<S: KeyValueStore>(
    store: &mut RecordStore<S>,
    draft: BloodRequestDraft,
) -> Result<BloodRequest> {
    ensure_valid(&draft.to_form(), &rules::blood_request())?;

    let request: BloodRequest = store.add(draft)?;
    info!(id = %request.id, units = request.units_required, "Filed blood request");
    Ok(request)
}

/// Record a contact-form message.
///
/// # Errors
///
/// Returns `ValidationFailed` or a storage error.
pub fn submit_contact<S: KeyValueStore>(
    store: &mut RecordStore<S>,
    draft: ContactDraft,
) -> Result<ContactSubmission> {
    ensure_valid(&draft.to_form(), &rules::contact())?;

    let submission: ContactSubmission = store.add(draft)?;
    info!(id = %submission.id, "Recorded contact submission");
    Ok(submission)
}
