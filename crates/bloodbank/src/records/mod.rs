//! Record store for bloodbank.
//!
//! [`RecordStore`] owns a [`KeyValueStore`] and keeps every collection as a
//! JSON array under its [`Record::KEY`]. Each write reads the whole array,
//! appends, and writes it back; collections are append-only.
//!
//! The store performs no validation. Run drafts through
//! [`crate::validation`] (or use [`crate::intake`]) before calling
//! [`RecordStore::add`].

mod inventory;
mod seed;

pub use inventory::{Inventory, StockLevel, StockThresholds};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Config, MalformedPolicy};
use crate::error::{Error, Result};
use crate::model::{
    BloodRequest, BloodType, ContactSubmission, DirectoryEntry, Donor, Record, Recipient,
    RequestStatus, Theme,
};
use crate::storage::{open_backend, KeyValueStore};

/// Storage key of the theme token.
pub const THEME_KEY: &str = "theme";

/// Domain record store over a key-value backend.
#[derive(Debug)]
pub struct RecordStore<S: KeyValueStore> {
    backend: S,
    on_malformed: MalformedPolicy,
    thresholds: StockThresholds,
    seed_enabled: bool,
}

/// Counts shown on the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Registered donors.
    pub donors: usize,
    /// Registered recipients.
    pub recipients: usize,
    /// Units in stock across all blood types.
    pub total_units: u64,
    /// Requests still pending.
    pub pending_requests: usize,
    /// Requests being worked on.
    pub active_requests: usize,
    /// Requests fulfilled.
    pub fulfilled_requests: usize,
    /// Contact messages received.
    pub contact_submissions: usize,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Wrap a backend with default policies (malformed values read as empty,
    /// default stock thresholds, seeding enabled).
    #[must_use]
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            on_malformed: MalformedPolicy::default(),
            thresholds: StockThresholds::default(),
            seed_enabled: true,
        }
    }

    /// Wrap a backend with the policies from `config`.
    #[must_use]
    pub fn with_config(backend: S, config: &Config) -> Self {
        Self::new(backend)
            .with_malformed_policy(config.storage.on_malformed)
            .with_stock_thresholds(StockThresholds::from(&config.inventory))
            .with_seeding(config.seed.enabled)
    }

    /// Set how unparsable persisted values are handled.
    #[must_use]
    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.on_malformed = policy;
        self
    }

    /// Set the stock-level thresholds.
    #[must_use]
    pub fn with_stock_thresholds(mut self, thresholds: StockThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Enable or disable seeding in [`RecordStore::initialize`].
    #[must_use]
    pub fn with_seeding(mut self, enabled: bool) -> Self {
        self.seed_enabled = enabled;
        self
    }

    /// The underlying backend.
    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Consume the store and return the backend.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.backend
    }

    /// Read and parse the value under `key` for display.
    ///
    /// An absent key or a JSON `null` yields `T::default()`. An unparsable
    /// value follows the configured malformed policy.
    fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        self.read_json_with(key, self.on_malformed)
    }

    /// Read the value under `key` ahead of a write back to the same key.
    ///
    /// Always strict: an unparsable value is returned as
    /// `MalformedPersistedData` so the write never replaces data it could
    /// not read.
    fn read_json_for_update<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        self.read_json_with(key, MalformedPolicy::Error)
    }

    fn read_json_with<T: DeserializeOwned + Default>(
        &self,
        key: &str,
        policy: MalformedPolicy,
    ) -> Result<T> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(T::default());
        };

        match serde_json::from_str::<Option<T>>(&raw) {
            Ok(value) => Ok(value.unwrap_or_default()),
            Err(source) => match policy {
                MalformedPolicy::Empty => {
                    warn!(key, error = %source, "Malformed persisted value, reading as empty");
                    Ok(T::default())
                }
                MalformedPolicy::Error => Err(Error::MalformedPersistedData {
                    key: key.to_string(),
                    source,
                }),
            },
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, &raw)
    }

    /// Append a new record built from `draft`, assigning its id and creation time.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the backend refuses the write,
    /// `MalformedPersistedData` if the stored collection cannot be parsed
    /// (under either policy; the stored value is left untouched), or
    /// `IdSpaceExhausted` if no larger id can be assigned.
    pub fn add<R: Record>(&mut self, draft: R::Draft) -> Result<R> {
        self.add_at(draft, Utc::now())
    }

    fn add_at<R: Record>(&mut self, draft: R::Draft, now: DateTime<Utc>) -> Result<R> {
        let mut records: Vec<R> = self.read_json_for_update(R::KEY)?;
        let id = next_id(&records, now)?;
        let record = R::from_draft(draft, id, now);
        records.push(record.clone());
        self.write_json(R::KEY, &records)?;
        debug!(key = R::KEY, id = record.id(), total = records.len(), "Added record");
        Ok(record)
    }

    /// All records of a collection, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read, or
    /// `MalformedPersistedData` under the strict policy.
    pub fn list<R: Record>(&self) -> Result<Vec<R>> {
        self.read_json(R::KEY)
    }

    /// Number of records in a collection.
    ///
    /// # Errors
    ///
    /// Same as [`RecordStore::list`].
    pub fn count<R: Record>(&self) -> Result<usize> {
        Ok(self.list::<R>()?.len())
    }

    /// Look up a record by id.
    ///
    /// # Errors
    ///
    /// Same as [`RecordStore::list`].
    pub fn find<R: Record>(&self, id: &str) -> Result<Option<R>> {
        Ok(self.list::<R>()?.into_iter().find(|r| r.id() == id))
    }

    /// Filter a directory by name substring and blood type.
    ///
    /// The name match is case-insensitive. An empty or absent query and an
    /// absent blood type each match everything. Insertion order is kept.
    ///
    /// # Errors
    ///
    /// Same as [`RecordStore::list`].
    pub fn search<R: DirectoryEntry>(
        &self,
        query: Option<&str>,
        blood_type: Option<BloodType>,
    ) -> Result<Vec<R>> {
        let needle = query.map(str::to_lowercase).unwrap_or_default();
        Ok(self
            .list::<R>()?
            .into_iter()
            .filter(|r| needle.is_empty() || r.name().to_lowercase().contains(&needle))
            .filter(|r| blood_type.map_or(true, |bt| r.blood_type() == bt))
            .collect())
    }

    /// Free-text filter over name, blood-type token and location.
    ///
    /// # Errors
    ///
    /// Same as [`RecordStore::list`].
    pub fn quick_search<R: DirectoryEntry>(&self, term: &str) -> Result<Vec<R>> {
        let needle = term.trim().to_lowercase();
        Ok(self
            .list::<R>()?
            .into_iter()
            .filter(|r| {
                needle.is_empty()
                    || r.name().to_lowercase().contains(&needle)
                    || r.blood_type().as_str().to_lowercase().contains(&needle)
                    || r
                        .location()
                        .is_some_and(|loc| loc.to_lowercase().contains(&needle))
            })
            .collect())
    }

    /// Recipients ordered most urgent first, stable within a level.
    ///
    /// # Errors
    ///
    /// Same as [`RecordStore::list`].
    pub fn recipients_by_urgency(&self) -> Result<Vec<Recipient>> {
        let mut recipients = self.list::<Recipient>()?;
        recipients.sort_by_key(|r| r.urgency);
        Ok(recipients)
    }

    /// The stored theme; `Light` when absent or unrecognised.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn theme(&self) -> Result<Theme> {
        Ok(self
            .backend
            .get(THEME_KEY)?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default())
    }

    /// Persist the theme token.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the backend refuses the write.
    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.backend.set(THEME_KEY, theme.as_str())
    }

    /// Flip between light and dark, returning the new theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let next = self.theme()?.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    /// Summary counts across all collections.
    ///
    /// # Errors
    ///
    /// Same as [`RecordStore::list`].
    pub fn stats(&self) -> Result<StoreStats> {
        let requests = self.list::<BloodRequest>()?;
        let with_status =
            |status: RequestStatus| requests.iter().filter(|r| r.status == status).count();

        Ok(StoreStats {
            donors: self.count::<Donor>()?,
            recipients: self.count::<Recipient>()?,
            total_units: self.inventory()?.total_units(),
            pending_requests: with_status(RequestStatus::Pending),
            active_requests: with_status(RequestStatus::Active),
            fulfilled_requests: with_status(RequestStatus::Fulfilled),
            contact_submissions: self.count::<ContactSubmission>()?,
        })
    }
}

impl RecordStore<Box<dyn KeyValueStore>> {
    /// Open the configured backend and wrap it with the configured policies.
    ///
    /// Does not seed; call [`RecordStore::initialize`] once at startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened.
    pub fn open(config: &Config) -> Result<Self> {
        let backend = open_backend(config)?;
        Ok(Self::with_config(backend, config))
    }
}

/// Next id for a collection: the creation instant in Unix milliseconds,
/// bumped past the largest numeric id already present.
fn next_id<R: Record>(existing: &[R], now: DateTime<Utc>) -> Result<String> {
    let stamp = now.timestamp_millis();
    let largest = existing.iter().filter_map(|r| r.id().parse::<i64>().ok()).max();
    match largest {
        Some(max) if max >= stamp => max
            .checked_add(1)
            .map(|id| id.to_string())
            .ok_or_else(|| Error::IdSpaceExhausted {
                key: R::KEY.to_string(),
            }),
        _ => Ok(stamp.to_string()),
    }
}
