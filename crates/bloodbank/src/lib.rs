//! `bloodbank` - Record keeping for a blood-donation service
//!
//! This library provides the domain model, form validation, donor
//! eligibility screening and a JSON-over-key-value record store for donors,
//! recipients, blood requests, contact messages and blood inventory.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod intake;
pub mod logging;
pub mod model;
pub mod records;
pub mod storage;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{
    BloodRequest, BloodRequestDraft, BloodType, ContactDraft, ContactSubmission, Donor,
    DonorDraft, Recipient, RecipientDraft, RequestStatus, Theme, Urgency,
};
pub use records::{Inventory, RecordStore, StockLevel, StoreStats};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
